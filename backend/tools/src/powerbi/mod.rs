//! Power BI REST access.
//!
//! Mirrors the `executeQueries` contract: one DAX string in, the rows of the
//! first result table out.

pub mod client;
pub mod credential;
pub mod result;

pub use client::PowerBiClient;
pub use credential::ClientSecretCredential;
pub use result::QueryResult;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BiError {
    #[error("authentication with the identity provider failed: {0}")]
    Auth(String),

    #[error("query rejected by Power BI ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Power BI request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected Power BI response: {0}")]
    Malformed(String),
}

/// Something that can run a DAX query against a dataset.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn execute(&self, dataset_id: &str, query: &str) -> Result<QueryResult, BiError>;
}
