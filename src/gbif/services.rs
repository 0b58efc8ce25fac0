use super::client::{GbifClient, Occurrence};
use crate::common::errors::ApiError;
use crate::whales::models::{self, Entity as Whales, WhaleRecord};
use chrono::NaiveDate;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Occurrence data carries no counts, each sighting counts as one animal
const OCCURRENCE_POPULATION: i32 = 1;
const UNKNOWN_REGION: &str = "Unknown";

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SyncSummary {
    pub fetched: usize,
    pub upserted: usize,
    pub skipped: usize,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Map an occurrence to a record, or `None` when it lacks a name or a usable
/// coordinate pair.
pub fn occurrence_to_record(occurrence: &Occurrence, today: NaiveDate) -> Option<WhaleRecord> {
    let species = non_blank(occurrence.species.as_ref())
        .or_else(|| non_blank(occurrence.scientific_name.as_ref()))?;
    let longitude = occurrence.decimal_longitude.filter(|lon| (-180.0..=180.0).contains(lon))?;
    let latitude = occurrence.decimal_latitude.filter(|lat| (-90.0..=90.0).contains(lat))?;
    let region = non_blank(occurrence.locality.as_ref())
        .or_else(|| non_blank(occurrence.country.as_ref()))
        .unwrap_or_else(|| UNKNOWN_REGION.to_string());

    Some(WhaleRecord {
        species,
        common_name: non_blank(occurrence.vernacular_name.as_ref()),
        population: OCCURRENCE_POPULATION,
        longitude,
        latitude,
        region,
        last_updated: today,
    })
}

fn upsert_on_natural_key() -> OnConflict {
    OnConflict::columns([
        models::Column::Species,
        models::Column::Longitude,
        models::Column::Latitude,
    ])
    .update_columns([
        models::Column::CommonName,
        models::Column::Population,
        models::Column::Region,
        models::Column::LastUpdated,
    ])
    .to_owned()
}

/// Upsert every usable occurrence in one transaction, keyed on
/// (species, longitude, latitude).
pub async fn upsert_occurrences(
    db: &DatabaseConnection,
    occurrences: &[Occurrence],
    today: NaiveDate,
) -> Result<SyncSummary, ApiError> {
    let mut summary = SyncSummary {
        fetched: occurrences.len(),
        ..SyncSummary::default()
    };

    let txn = db.begin().await?;
    for occurrence in occurrences {
        let Some(record) = occurrence_to_record(occurrence, today) else {
            tracing::debug!(?occurrence, "Skipping occurrence without name or coordinates");
            summary.skipped += 1;
            continue;
        };

        // Rows are written one by one so repeated keys within a page collapse
        Whales::insert(record.into_active_model())
            .on_conflict(upsert_on_natural_key())
            .exec_without_returning(&txn)
            .await?;
        summary.upserted += 1;
    }
    txn.commit().await?;

    Ok(summary)
}

pub async fn sync_from_gbif(
    db: &DatabaseConnection,
    client: &GbifClient,
) -> Result<SyncSummary, ApiError> {
    let occurrences = client
        .fetch_occurrences()
        .await
        .inspect_err(|err| tracing::warn!(error = %err, "GBIF occurrence fetch failed"))?;

    let today = chrono::Utc::now().date_naive();
    let summary = upsert_occurrences(db, &occurrences, today).await?;

    tracing::info!(
        fetched = summary.fetched,
        upserted = summary.upserted,
        skipped = summary.skipped,
        "GBIF sync finished"
    );
    Ok(summary)
}
