//! Access-token checks for sessions opened by a host application.

pub mod token;

pub use token::{AccessToken, Claim, TokenError, TokenValidator};
