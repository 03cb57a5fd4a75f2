//! `insightbot mint-token`: produce entry parameters the way a host
//! application would.

use anyhow::{bail, Result};
use insightbot_config::secrets::SHARED_SECRET_VAR;
use insightbot_config::AppConfig;
use insightbot_security::TokenValidator;

pub fn run(config: &AppConfig, at: Option<i64>) -> Result<()> {
    let secret = match std::env::var(SHARED_SECRET_VAR) {
        Ok(s) if !s.trim().is_empty() => s,
        _ => bail!("{SHARED_SECRET_VAR} is not set"),
    };
    let issued_at = at.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let token = TokenValidator::new(secret, &config.auth).mint(issued_at);
    println!("{}", token.query_string());
    Ok(())
}
