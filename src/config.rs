//! Service configuration, read from the environment (and `.env` when present).

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub store_name: String,
    pub store_base_url: String,
    /// WhatsApp number orders are handed off to.
    pub store_whatsapp: String,
    pub currency: String,
    /// Most analytics sessions kept in memory at once.
    pub analytics_max_sessions: u64,
    /// Seconds of inactivity after which an analytics session is dropped.
    pub analytics_session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let parse_or = |key: &str, default: u64| -> Result<u64> {
            match get(key) {
                Some(raw) => raw.parse().with_context(|| format!("invalid {key}: {raw}")),
                None => Ok(default),
            }
        };
        let port = match get("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("invalid PORT: {raw}"))?,
            None => 8083,
        };
        Ok(Self {
            database_url: get("DATABASE_URL").context("DATABASE_URL must be set")?,
            port,
            nats_url: get("NATS_URL").filter(|url| !url.is_empty()),
            store_name: get("STORE_NAME").unwrap_or_else(|| "Decor Storefront".to_string()),
            store_base_url: get("STORE_BASE_URL").unwrap_or_else(|| "http://localhost:8083".to_string()),
            store_whatsapp: get("STORE_WHATSAPP").context("STORE_WHATSAPP must be set")?,
            currency: get("STORE_CURRENCY").unwrap_or_else(|| "USD".to_string()),
            analytics_max_sessions: parse_or("ANALYTICS_MAX_SESSIONS", 100_000)?,
            analytics_session_idle_secs: parse_or("ANALYTICS_SESSION_IDLE_SECS", 30 * 60)?,
        })
    }
}
