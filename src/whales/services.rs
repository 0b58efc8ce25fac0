use super::models::{self, Entity as Whales, PopulationFilter, WhaleRecord};
use crate::common::errors::ApiError;
use chrono::NaiveDate;
use rand::Rng;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};

pub const DEFAULT_SEED_COUNT: usize = 100;
pub const MAX_SEED_COUNT: usize = 10_000;
const INSERT_CHUNK_SIZE: usize = 500;

/// (scientific name, common name)
pub const SPECIES: &[(&str, &str)] = &[
    ("Balaenoptera musculus", "Blue Whale"),
    ("Megaptera novaeangliae", "Humpback Whale"),
    ("Orcinus orca", "Killer Whale"),
    ("Physeter macrocephalus", "Sperm Whale"),
    ("Balaenoptera physalus", "Fin Whale"),
    ("Balaenoptera acutorostrata", "Minke Whale"),
    ("Eschrichtius robustus", "Gray Whale"),
    ("Eubalaena glacialis", "North Atlantic Right Whale"),
    ("Delphinapterus leucas", "Beluga Whale"),
    ("Balaena mysticetus", "Bowhead Whale"),
];

pub const REGIONS: &[&str] = &[
    "Atlantic Ocean",
    "Pacific Ocean",
    "Indian Ocean",
    "Arctic Ocean",
    "Southern Ocean",
    "Bay of Bengal",
    "Mediterranean Sea",
    "Gulf of Mexico",
];

fn test_data_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 4).unwrap_or_default()
}

/// Fixed payload served by `/population-test` and by `/population` when the
/// test-data flag is set.
pub fn test_data() -> Vec<WhaleRecord> {
    let last_updated = test_data_date();
    [
        ("Killer Whale", 5, 10.0, 80.0, "Bay of Bengal"),
        ("Humpback Whale", 12, -20.0, 150.0, "Pacific Ocean"),
        ("Blue Whale", 3, 40.0, -70.0, "Atlantic Ocean"),
    ]
    .into_iter()
    .map(|(species, population, latitude, longitude, region)| WhaleRecord {
        species: species.to_string(),
        common_name: None,
        population,
        longitude,
        latitude,
        region: region.to_string(),
        last_updated,
    })
    .collect()
}

/// Every stored record matching the filters, in store order.
pub async fn list_population(
    db: &DatabaseConnection,
    filter: &PopulationFilter,
) -> Result<Vec<WhaleRecord>, ApiError> {
    let mut condition = Condition::all();
    if let Some(species) = &filter.species {
        condition = condition.add(models::Column::Species.eq(species.as_str()));
    }
    if let Some(region) = &filter.region {
        condition = condition.add(models::Column::Region.eq(region.as_str()));
    }

    let rows = Whales::find().filter(condition).all(db).await?;

    Ok(rows.into_iter().map(WhaleRecord::from).collect())
}

pub fn validate_seed_count(count: Option<usize>) -> Result<usize, ApiError> {
    let count = count.unwrap_or(DEFAULT_SEED_COUNT);
    if count == 0 || count > MAX_SEED_COUNT {
        return Err(crate::validation_error!(
            "count",
            format!("must be between 1 and {MAX_SEED_COUNT}")
        ));
    }
    Ok(count)
}

/// Random records with population in [1, 20] and coordinates anywhere on the globe
pub fn generate_synthetic_whales<R: Rng>(
    rng: &mut R,
    count: usize,
    today: NaiveDate,
) -> Vec<WhaleRecord> {
    (0..count)
        .map(|_| {
            let (species, common_name) = SPECIES[rng.random_range(0..SPECIES.len())];
            WhaleRecord {
                species: species.to_string(),
                common_name: Some(common_name.to_string()),
                population: rng.random_range(1..=20),
                longitude: rng.random_range(-180.0..=180.0),
                latitude: rng.random_range(-90.0..=90.0),
                region: REGIONS[rng.random_range(0..REGIONS.len())].to_string(),
                last_updated: today,
            }
        })
        .collect()
}

/// Replace the whole table with `records` in one transaction.
pub async fn replace_all(
    db: &DatabaseConnection,
    records: Vec<WhaleRecord>,
) -> Result<usize, ApiError> {
    let count = records.len();
    let txn = db.begin().await?;

    let deleted = Whales::delete_many().exec(&txn).await?;
    tracing::debug!(deleted = deleted.rows_affected, "Cleared whales table");

    let mut models: Vec<models::ActiveModel> = records
        .into_iter()
        .map(WhaleRecord::into_active_model)
        .collect();
    while !models.is_empty() {
        let rest = models.split_off(models.len().min(INSERT_CHUNK_SIZE));
        Whales::insert_many(models).exec_without_returning(&txn).await?;
        models = rest;
    }

    txn.commit().await?;
    Ok(count)
}

pub async fn seed_whales(db: &DatabaseConnection, count: usize) -> Result<usize, ApiError> {
    let today = chrono::Utc::now().date_naive();
    let records = generate_synthetic_whales(&mut rand::rng(), count, today);
    let inserted = replace_all(db, records).await?;
    tracing::info!(count = inserted, "Seeded whales table with synthetic records");
    Ok(inserted)
}
