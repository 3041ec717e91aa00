//! Centralized configuration (environment variables + defaults).
//!
//! Binaries call [`load_dotenv`] first so a local `.env` file can supply any
//! of these. Command-line flags take precedence over everything here.

use anyhow::{bail, Context};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BROKER_ADDR: &str = "0.0.0.0:9292";
pub const DEFAULT_DATA_DIR: &str = "./pactum-data";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Loads `.env` from the working directory if there is one.
pub fn load_dotenv() {
    dotenv::dotenv().ok();
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Listen address of the broker.
pub fn broker_addr() -> String {
    var("PACTUM_BROKER_ADDR").unwrap_or_else(|| DEFAULT_BROKER_ADDR.to_string())
}

/// Bearer token for the broker (optional; unset disables auth).
pub fn broker_token() -> Option<String> {
    var("PACTUM_BROKER_TOKEN")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Fs,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "fs" | "file" | "filesystem" => Ok(StorageBackend::Fs),
            other => bail!("unknown storage backend {:?} (expected memory or fs)", other),
        }
    }
}

/// Contract storage backend (default `memory`).
pub fn storage_backend() -> anyhow::Result<StorageBackend> {
    match var("PACTUM_STORAGE") {
        Some(v) => v.parse().context("PACTUM_STORAGE"),
        None => Ok(StorageBackend::Memory),
    }
}

/// Root directory of the filesystem backend.
pub fn data_dir() -> PathBuf {
    var("PACTUM_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Timeout for every outbound HTTP call (verifier, provider states, broker client).
pub fn http_timeout() -> anyhow::Result<Duration> {
    match var("PACTUM_HTTP_TIMEOUT_SECS") {
        Some(v) => {
            let secs = v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("PACTUM_HTTP_TIMEOUT_SECS must be a whole number of seconds, got {:?}", v))?;
            Ok(Duration::from_secs(secs.max(1)))
        }
        None => Ok(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
    }
}

/// `PACTUM_LOG_FORMAT=json` switches log output to JSON lines.
pub fn log_json() -> bool {
    var("PACTUM_LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"))
}
