use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

pub const DEFAULT_GBIF_URL: &str = "https://api.gbif.org/v1";
pub const DEFAULT_GBIF_TAXON_KEY: u64 = 2_440_530;
pub const DEFAULT_GBIF_LIMIT: u32 = 50;
pub const DEFAULT_GBIF_TIMEOUT_SECS: u64 = 30;

/// Upstream occurrence source settings
#[derive(Deserialize, Debug, Clone)]
pub struct GbifConfig {
    pub base_url: String,
    pub taxon_key: u64,
    pub limit: u32,
    pub timeout_secs: u64,
}

impl Default for GbifConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GBIF_URL.to_string(),
            taxon_key: DEFAULT_GBIF_TAXON_KEY,
            limit: DEFAULT_GBIF_LIMIT,
            timeout_secs: DEFAULT_GBIF_TIMEOUT_SECS,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub app_name: String,
    pub deployment: String,
    pub bind_addr: String,
    /// Serve the synthetic payload from `/population` instead of the database
    pub use_test_data: bool,
    pub cors_allowed_origins: Vec<String>,
    pub gbif: GbifConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load from .env file if available

        let db_url = match env::var("DB_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "{}://{}:{}@{}:{}/{}",
                env::var("DB_PREFIX").unwrap_or_else(|_| "postgresql".to_string()),
                env::var("DB_USER").context("DB_USER must be set")?,
                env::var("DB_PASSWORD").context("DB_PASSWORD must be set")?,
                env::var("DB_HOST").context("DB_HOST must be set")?,
                env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string()),
                env::var("DB_NAME").context("DB_NAME must be set")?,
            ),
        };

        let use_test_data = match env::var("USE_TEST_DATA") {
            Ok(raw) => parse_flag(&raw).with_context(|| format!("USE_TEST_DATA: {raw:?}"))?,
            Err(_) => false,
        };

        let defaults = GbifConfig::default();
        let gbif = GbifConfig {
            base_url: env::var("GBIF_URL").unwrap_or(defaults.base_url),
            taxon_key: parse_or("GBIF_TAXON_KEY", defaults.taxon_key)?,
            limit: parse_or("GBIF_LIMIT", defaults.limit)?,
            timeout_secs: parse_or("GBIF_TIMEOUT_SECS", defaults.timeout_secs)?,
        };

        Ok(Config {
            db_url,
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "whale-api".to_string()),
            deployment: env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            use_test_data,
            cors_allowed_origins: split_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            gbif,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            db_url: "sqlite::memory:".to_string(),
            app_name: "whale-api-test".to_string(),
            deployment: "test".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            use_test_data: false,
            cors_allowed_origins: vec!["*".to_string()],
            gbif: GbifConfig::default(),
        }
    }
}

/// Accepts the usual spellings of a boolean environment flag
pub fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}
