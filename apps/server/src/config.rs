use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use cointrail_core::constants::DEFAULT_TRACKED_ASSETS;
use cointrail_market_data::provider::coingecko::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("Invalid CT_LOG_FORMAT: {:?}", other)),
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub data_file: PathBuf,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub poll_enabled: bool,
    pub poll_interval: Duration,
    pub tracked_assets: Vec<String>,
    pub market_data_url: String,
    pub upstream_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads `.env` (if present) and reads `CT_*` variables from the process
    /// environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let listen_addr: SocketAddr =
            parse_var("CT_LISTEN_ADDR", &get("CT_LISTEN_ADDR", "0.0.0.0:8080"))?;
        let data_file = PathBuf::from(get("CT_DATA_FILE", "./data/cryptoPrice.json"));
        let cors_allow = split_list(&get("CT_CORS_ALLOW_ORIGINS", "*"));
        let timeout_ms: u64 =
            parse_var("CT_REQUEST_TIMEOUT_MS", &get("CT_REQUEST_TIMEOUT_MS", "30000"))?;
        let poll_enabled = parse_bool("CT_POLL_ENABLED", &get("CT_POLL_ENABLED", "true"))?;
        let poll_secs: u64 =
            parse_var("CT_POLL_INTERVAL_SECS", &get("CT_POLL_INTERVAL_SECS", "60"))?;
        if poll_secs == 0 {
            return Err(anyhow!("CT_POLL_INTERVAL_SECS must be greater than zero"));
        }

        let default_assets = DEFAULT_TRACKED_ASSETS
            .iter()
            .map(|(id, _, _)| *id)
            .collect::<Vec<_>>()
            .join(",");
        let tracked_assets = split_list(&get("CT_TRACKED_ASSETS", &default_assets));

        let market_data_url = get("CT_MARKET_DATA_URL", DEFAULT_BASE_URL);
        let upstream_ms: u64 =
            parse_var("CT_UPSTREAM_TIMEOUT_MS", &get("CT_UPSTREAM_TIMEOUT_MS", "10000"))?;
        let log_format: LogFormat = get("CT_LOG_FORMAT", "text").parse()?;

        Ok(Self {
            listen_addr,
            data_file,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            poll_enabled,
            poll_interval: Duration::from_secs(poll_secs),
            tracked_assets,
            market_data_url,
            upstream_timeout: Duration::from_millis(upstream_ms),
            log_format,
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid {}: {:?}", key, raw))
}

fn parse_bool(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("Invalid {}: {:?}", key, raw)),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
