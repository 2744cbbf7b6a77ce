use std::env;

use anyhow::{bail, Context, Result};

use crate::auth::{JwtConfig, DEFAULT_TOKEN_EXPIRY_HOURS};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Process configuration, read once at start-up.
///
/// | Env Var            | Default   |
/// |--------------------|-----------|
/// | `HOST`             | `0.0.0.0` |
/// | `PORT`             | `5000`    |
/// | `DATABASE_URL`     | unset: in-memory store |
/// | `JWT_SECRET`       | required  |
/// | `JWT_EXPIRY_HOURS` | `24`      |
/// | `BODY_LIMIT_BYTES` | 10 MiB    |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub body_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_or("PORT", DEFAULT_PORT)?;
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());

        let secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
        if secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        let jwt = JwtConfig {
            secret,
            expiry_hours: parse_or("JWT_EXPIRY_HOURS", DEFAULT_TOKEN_EXPIRY_HOURS)?,
        };
        let body_limit = parse_or("BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT)?;

        Ok(Self {
            host,
            port,
            database_url,
            jwt,
            body_limit,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value {raw:?}")),
        Err(_) => Ok(default),
    }
}
