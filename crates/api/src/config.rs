//! Environment-driven server configuration.

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Context;

/// Listen address variable (`host:port`).
pub const BIND_ENV: &str = "LOANTRACK_BIND";
/// SQLite URL variable; unset means the in-memory store.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            database_url: None,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = match non_empty(lookup(BIND_ENV)) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("{BIND_ENV} is not a socket address: {raw:?}"))?,
            None => defaults.bind_addr,
        };

        Ok(Self {
            bind_addr,
            database_url: non_empty(lookup(DATABASE_URL_ENV)),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
