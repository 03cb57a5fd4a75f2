//! Signed, time-limited access tokens.
//!
//! A host application signs the current unix timestamp with a shared secret
//! and passes `token` + `timestamp` as URL parameters. Validation is pure; the
//! caller records the outcome in its session so it runs once per session.

use chrono::Utc;
use hmac::digest::{CtOutput, Output};
use hmac::{Hmac, Mac};
use insightbot_config::{AuthConfig, SignatureScheme};
use insightbot_core::InsightError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("token expired (issued {age_secs}s ago, limit {max_skew_secs}s)")]
    Expired { age_secs: i64, max_skew_secs: u64 },
}

impl From<TokenError> for InsightError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => InsightError::AuthInvalid,
            TokenError::Expired { age_secs, max_skew_secs } => {
                InsightError::AuthExpired { age_secs, max_skew_secs }
            }
        }
    }
}

/// The assertion carried by a valid token: just its issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub issued_at: i64,
}

/// URL parameters a host application sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub timestamp: String,
}

impl AccessToken {
    pub fn query_string(&self) -> String {
        format!("token={}&timestamp={}", self.token, self.timestamp)
    }
}

#[derive(Clone)]
pub struct TokenValidator {
    secret: String,
    max_skew_secs: u64,
    scheme: SignatureScheme,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("max_skew_secs", &self.max_skew_secs)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    pub fn new(secret: impl Into<String>, config: &AuthConfig) -> Self {
        Self {
            secret: secret.into(),
            max_skew_secs: config.max_skew_secs,
            scheme: config.scheme,
        }
    }

    /// Expected signature for a timestamp string, hex encoded.
    pub fn sign(&self, issued_at: &str) -> String {
        match self.scheme {
            SignatureScheme::Sha256Concat => hex::encode(self.digest(issued_at)),
            SignatureScheme::HmacSha256 => hex::encode(self.hmac(issued_at).finalize().into_bytes()),
        }
    }

    /// Issue a token for `issued_at` (unix seconds).
    pub fn mint(&self, issued_at: i64) -> AccessToken {
        let timestamp = issued_at.to_string();
        AccessToken {
            token: self.sign(&timestamp),
            timestamp,
        }
    }

    pub fn validate(&self, token: &str, issued_at: &str) -> Result<Claim, TokenError> {
        self.validate_at(token, issued_at, Utc::now().timestamp())
    }

    /// Validate against an explicit clock reading.
    ///
    /// The signature is checked over the timestamp exactly as received. A valid
    /// token is reusable until it ages out; future timestamps are not rejected.
    pub fn validate_at(&self, token: &str, issued_at: &str, now: i64) -> Result<Claim, TokenError> {
        if !self.signature_matches(token, issued_at) {
            debug!("token signature mismatch");
            return Err(TokenError::Invalid);
        }

        let issued: i64 = issued_at.trim().parse().map_err(|_| TokenError::Invalid)?;
        let age_secs = now.saturating_sub(issued);
        if age_secs >= 0 && age_secs as u64 >= self.max_skew_secs {
            return Err(TokenError::Expired {
                age_secs,
                max_skew_secs: self.max_skew_secs,
            });
        }

        Ok(Claim { issued_at: issued })
    }

    /// Both schemes compare digests in constant time. Only the length of a
    /// malformed token can end the check early, and that length is public.
    fn signature_matches(&self, token: &str, issued_at: &str) -> bool {
        let Some(provided) = decode_signature(token) else {
            return false;
        };
        match self.scheme {
            SignatureScheme::Sha256Concat => {
                if provided.len() != <Sha256 as Digest>::output_size() {
                    return false;
                }
                let expected = CtOutput::<Sha256>::new(self.digest(issued_at));
                expected == CtOutput::new(Output::<Sha256>::clone_from_slice(&provided))
            }
            SignatureScheme::HmacSha256 => self.hmac(issued_at).verify_slice(&provided).is_ok(),
        }
    }

    fn digest(&self, issued_at: &str) -> Output<Sha256> {
        let mut hasher = Sha256::new();
        hasher.update(issued_at.as_bytes());
        hasher.update(self.secret.as_bytes());
        hasher.finalize()
    }

    fn hmac(&self, message: &str) -> HmacSha256 {
        // HMAC accepts keys of any length.
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("hmac key length is unrestricted"));
        mac.update(message.as_bytes());
        mac
    }
}

/// Signatures are issued as lowercase hex; anything else never matches.
fn decode_signature(token: &str) -> Option<Vec<u8>> {
    if token.bytes().any(|b| b.is_ascii_uppercase()) {
        return None;
    }
    hex::decode(token).ok()
}
