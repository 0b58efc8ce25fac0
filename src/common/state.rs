use crate::config::Config;
use crate::gbif::client::GbifClient;
use crate::gbif::jobs::SyncTracker;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub gbif: Arc<GbifClient>,
    pub sync_jobs: SyncTracker,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Result<Self, reqwest::Error> {
        let gbif = Arc::new(GbifClient::new(&config.gbif)?);
        Ok(Self {
            db,
            config,
            gbif,
            sync_jobs: SyncTracker::default(),
        })
    }
}
