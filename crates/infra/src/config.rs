//! Configuration loading and representation.
//!
//! Everything comes from the process environment (optionally seeded from a
//! `.env` file by the binary before `Settings::from_env` runs).

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB_URL: &str = "postgres://localhost:5432/ecommerce";
pub const DEFAULT_STATIC_DIR: &str = "crates/api/public";

/// Runtime settings for the HTTP/realtime server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `PORT`
    pub port: u16,
    /// `DB_URL`: document store location, used when persistent stores are on.
    pub db_url: String,
    /// `USE_PERSISTENT_STORES`: `false` keeps everything in memory.
    pub use_persistent_stores: bool,
    /// `STATIC_DIR`: assets served under `/static`.
    pub static_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_url: DEFAULT_DB_URL.to_string(),
            use_persistent_stores: false,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => defaults.port,
        };

        let use_persistent_stores = match lookup("USE_PERSISTENT_STORES") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .with_context(|| format!("USE_PERSISTENT_STORES must be true or false, got {raw:?}"))?,
            None => defaults.use_persistent_stores,
        };

        Ok(Self {
            port,
            db_url: lookup("DB_URL").unwrap_or(defaults.db_url),
            use_persistent_stores,
            static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
