use anyhow::{Context, Result};
use std::env;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Shared HS256 secret with the identity provider that issues tokens.
    pub jwt_secret: String,
    pub access_token_expiration_minutes: u64,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_expiration_minutes: env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        })
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            access_token_expiration_minutes: 60,
        }
    }
}
