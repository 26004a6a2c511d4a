//! Process configuration, read once at startup.

use std::net::SocketAddr;

use anyhow::{Context, Result, anyhow};
use chrono::Duration;

use dealership_auth::TokenConfig;
use dealership_observability::LogFormat;
use dealership_sales::TransitionPolicy;

const DEFAULT_SECRET: &str = "dev-secret";
const DEFAULT_TTL_MINUTES: i64 = 30;
/// One year.
const MAX_TTL_MINUTES: i64 = 366 * 24 * 60;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BCRYPT_COST: u32 = 12;

/// Immutable settings threaded into every component that needs them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token: TokenConfig,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub deal_policy: TransitionPolicy,
    pub log_format: LogFormat,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEFAULT_SECRET.to_string()
            }
        };

        let ttl_minutes: i64 = parse_or(&lookup, "ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_TTL_MINUTES)?;
        if !(1..=MAX_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(anyhow!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {MAX_TTL_MINUTES}"
            ));
        }

        let bind_addr: SocketAddr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:8000")?;

        let deal_policy = match lookup("DEAL_STATUS_POLICY") {
            Some(raw) => raw
                .parse::<TransitionPolicy>()
                .map_err(|e| anyhow!("DEAL_STATUS_POLICY: {e}"))?,
            None => TransitionPolicy::default(),
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| anyhow!("LOG_FORMAT: {e}"))?,
            None => LogFormat::default(),
        };

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(anyhow!("BCRYPT_COST must be between 4 and 31"));
        }

        Ok(Self {
            token: TokenConfig::new(secret, Duration::minutes(ttl_minutes)),
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            bind_addr,
            deal_policy,
            log_format,
            bcrypt_cost,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: core::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
