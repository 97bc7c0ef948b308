//! Runtime configuration, read from the environment (`.env` is loaded first by `main`).

use std::env;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_ADMIN_PIN: &str = "1234";
pub const DEFAULT_WHATSAPP_NUMBER: &str = "5583994189808";
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres URL. Without it the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub port: u16,
    pub admin_pin: String,
    pub session_max_age_secs: u64,
    /// Marks the admin cookie `Secure`.
    pub production: bool,
    pub whatsapp_number: String,
    pub nats_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid value `{value}` for {key}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match var(key) {
        Some(value) => value.parse().map_err(|_| ConfigError { key, value }),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: var("DATABASE_URL"),
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            port: parsed("PORT", DEFAULT_PORT)?,
            admin_pin: var("ADMIN_PIN").unwrap_or_else(|| DEFAULT_ADMIN_PIN.to_string()),
            session_max_age_secs: parsed("ADMIN_SESSION_MAX_AGE", DEFAULT_SESSION_MAX_AGE_SECS)?,
            production: var("APP_ENV").is_some_and(|e| e.eq_ignore_ascii_case("production")),
            whatsapp_number: var("WHATSAPP_NUMBER").unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string()),
            nats_url: var("NATS_URL"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            port: DEFAULT_PORT,
            admin_pin: DEFAULT_ADMIN_PIN.to_string(),
            session_max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
            production: false,
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            nats_url: None,
        }
    }
}
