//! insightbot HTTP gateway
//!
//! JSON API over the session controller: open a session with an entry token,
//! switch datasets, and ask questions.

pub mod error;
pub mod health_api;
pub mod server;
pub mod session_registry;
pub mod sessions_api;

pub use error::ApiError;
pub use server::{router, start_server, GatewayState};
pub use session_registry::SessionRegistry;
