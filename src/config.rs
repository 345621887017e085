//! Runtime configuration from the environment (and `.env`)

use crate::error::LedgerError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub api_port: u16,
    /// `None` waits for the service indefinitely
    pub extraction_timeout: Option<Duration>,
    pub seed_ledger: bool,
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let gemini_api_key = lookup("GEMINI_API_KEY").unwrap_or_default();

        let gemini_model = lookup("GEMINI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| LedgerError::Config(format!("invalid port {:?}: {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match lookup("EXTRACTION_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                LedgerError::Config(format!("invalid EXTRACTION_TIMEOUT_SECS {:?}: {}", raw, e))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let seed_ledger = match lookup("LEDGER_SEED") {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(LedgerError::Config(format!(
                        "invalid LEDGER_SEED {:?}",
                        raw
                    )))
                }
            },
            None => true,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model,
            api_port,
            extraction_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            seed_ledger,
        })
    }
}
