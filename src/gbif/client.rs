//! Reqwest-backed GBIF occurrence search client.
//!
//! Fetches exactly one page of occurrences. No paging, no retry.

use crate::common::errors::ApiError;
use crate::config::GbifConfig;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

const USER_AGENT: &str = concat!("whale-api/", env!("CARGO_PKG_VERSION"));

/// One occurrence record, only the fields the sync reads
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub species: Option<String>,
    pub scientific_name: Option<String>,
    pub vernacular_name: Option<String>,
    pub decimal_longitude: Option<f64>,
    pub decimal_latitude: Option<f64>,
    pub locality: Option<String>,
    pub country: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct OccurrenceSearchResponse {
    #[serde(default)]
    pub results: Vec<Occurrence>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GbifError {
    Transport(String),
    Status { status: u16, body: String },
    Decode(String),
}

impl fmt::Display for GbifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GbifError::Transport(msg) => write!(f, "request failed: {msg}"),
            GbifError::Status { status, body } => {
                write!(f, "upstream returned status {status}: {body}")
            }
            GbifError::Decode(msg) => write!(f, "invalid occurrence payload: {msg}"),
        }
    }
}

impl std::error::Error for GbifError {}

impl From<GbifError> for ApiError {
    fn from(err: GbifError) -> Self {
        ApiError::ExternalServiceError {
            service: "GBIF".to_string(),
            message: err.to_string(),
        }
    }
}

pub struct GbifClient {
    client: Client,
    search_url: String,
    taxon_key: u64,
    limit: u32,
}

impl GbifClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: &GbifConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            search_url: format!("{}/occurrence/search", config.base_url.trim_end_matches('/')),
            taxon_key: config.taxon_key,
            limit: config.limit,
        })
    }

    pub async fn fetch_occurrences(&self) -> Result<Vec<Occurrence>, GbifError> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("taxon_key", self.taxon_key.to_string()),
                ("hasCoordinate", "true".to_string()),
                ("limit", self.limit.to_string()),
            ])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GbifError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GbifError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(GbifError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).chars().take(200).collect(),
            });
        }

        let decoded: OccurrenceSearchResponse =
            serde_json::from_slice(&body).map_err(|e| GbifError::Decode(e.to_string()))?;
        Ok(decoded.results)
    }
}
