use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Largest accepted CV upload, in megabytes.
    pub max_upload_mb: usize,
    /// Sessions idle for longer than this are discarded.
    pub session_ttl_minutes: i64,
    pub max_job_description_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8000,
            rust_log: "info".to_string(),
            max_upload_mb: 10,
            session_ttl_minutes: 120,
            max_job_description_chars: 20_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_mb: env_or("MAX_UPLOAD_MB", defaults.max_upload_mb)?,
            session_ttl_minutes: env_or("SESSION_TTL_MINUTES", defaults.session_ttl_minutes)?,
            max_job_description_chars: env_or(
                "MAX_JOB_DESCRIPTION_CHARS",
                defaults.max_job_description_chars,
            )?,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
