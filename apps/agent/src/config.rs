use anyhow::Context;
use std::time::Duration;

use mesfactures_core::constants::DEFAULT_TRANSMIT_TIMEOUT_SECS;

const DEFAULT_DB_PATH: &str = "./db/mesfactures.db";
const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_PROBE_INTERVAL_SECS: u64 = 15;

pub struct Config {
    pub db_path: String,
    pub api_url: String,
    pub api_token: Option<String>,
    pub probe_interval: Duration,
    pub transmit_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let db_path = lookup("DATABASE_URL")
            .or_else(|| lookup("MF_DB_PATH"))
            .unwrap_or_else(|| DEFAULT_DB_PATH.into());
        let api_url = lookup("MF_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let api_token = lookup("MF_API_TOKEN").filter(|t| !t.trim().is_empty());
        let probe_interval = seconds(
            lookup("MF_PROBE_INTERVAL_SECS"),
            DEFAULT_PROBE_INTERVAL_SECS,
            "MF_PROBE_INTERVAL_SECS",
        )?;
        let transmit_timeout = seconds(
            lookup("MF_TRANSMIT_TIMEOUT_SECS"),
            DEFAULT_TRANSMIT_TIMEOUT_SECS,
            "MF_TRANSMIT_TIMEOUT_SECS",
        )?;
        Ok(Self {
            db_path,
            api_url,
            api_token,
            probe_interval,
            transmit_timeout,
        })
    }
}

fn seconds(value: Option<String>, default: u64, name: &str) -> anyhow::Result<Duration> {
    let secs = match value {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid {}: {:?}", name, raw))?,
        None => default,
    };
    anyhow::ensure!(secs > 0, "{} must be positive", name);
    Ok(Duration::from_secs(secs))
}
