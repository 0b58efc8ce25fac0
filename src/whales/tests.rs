use super::models::{Entity as Whales, WhaleRecord};
use super::services::{self, REGIONS, SPECIES};
use crate::config::Config;
use crate::config::test_helpers::{
    app_with, closed_test_db, extract_response_body, setup_test_app, setup_test_db,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sea_orm::{DatabaseConnection, EntityTrait};
use tower::ServiceExt;

fn record(
    species: &str,
    population: i32,
    longitude: f64,
    latitude: f64,
    region: &str,
) -> WhaleRecord {
    WhaleRecord {
        species: species.to_string(),
        common_name: None,
        population,
        longitude,
        latitude,
        region: region.to_string(),
        last_updated: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
    }
}

fn stored_fixture() -> Vec<WhaleRecord> {
    vec![
        record("Orcinus orca", 7, 80.5, 10.25, "Bay of Bengal"),
        record("Megaptera novaeangliae", 12, 150.0, -20.0, "Pacific Ocean"),
        record("Orcinus orca", 2, -122.4, 48.5, "Pacific Ocean"),
        record("Balaenoptera musculus", 3, -70.0, 40.0, "Atlantic Ocean"),
    ]
}

async fn insert_fixture(db: &DatabaseConnection) -> Vec<WhaleRecord> {
    let records = stored_fixture();
    services::replace_all(db, records.clone()).await.unwrap();
    records
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    extract_response_body(response).await
}

async fn post(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    extract_response_body(response).await
}

fn records_from(body: &serde_json::Value) -> Vec<WhaleRecord> {
    serde_json::from_value(body["data"].clone()).expect("data should be a list of records")
}

#[tokio::test]
async fn test_list_without_filters_returns_every_row_in_store_order() {
    let (app, db) = setup_test_app().await;
    let stored = insert_fixture(&db).await;

    let (status, body) = get(&app, "/population").await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["source"], "database");
    assert_eq!(body["count"], 4);
    assert_eq!(records_from(&body), stored);

    let first = &body["data"][0];
    for field in [
        "species",
        "common_name",
        "population",
        "longitude",
        "latitude",
        "region",
        "last_updated",
    ] {
        assert!(first.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(first["last_updated"], "2025-06-01");
}

#[tokio::test]
async fn test_list_on_empty_table() {
    let (app, _db) = setup_test_app().await;

    let (status, body) = get(&app, "/population").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_list_filtered_by_species() {
    let (app, db) = setup_test_app().await;
    insert_fixture(&db).await;

    let (status, body) = get(&app, "/population?species=Orcinus%20orca").await;
    assert_eq!(status, StatusCode::OK);
    let records = records_from(&body);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.species == "Orcinus orca"));
}

#[tokio::test]
async fn test_list_filtered_by_region() {
    let (app, db) = setup_test_app().await;
    insert_fixture(&db).await;

    let (status, body) = get(&app, "/population?region=Pacific%20Ocean").await;
    assert_eq!(status, StatusCode::OK);
    let records = records_from(&body);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.region == "Pacific Ocean"));
}

#[tokio::test]
async fn test_list_filters_combine_and_match_exactly() {
    let (app, db) = setup_test_app().await;
    insert_fixture(&db).await;

    let (_, body) = get(&app, "/population?species=Orcinus%20orca&region=Pacific%20Ocean").await;
    let records = records_from(&body);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].population, 2);

    // Exact match only, no prefix or case folding
    let (_, body) = get(&app, "/population?species=orcinus").await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_population_test_endpoint_ignores_store() {
    let (app, db) = setup_test_app().await;
    insert_fixture(&db).await;

    let (status, body) = get(&app, "/population-test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "test-data");
    assert_eq!(body["count"], 3);

    let expected = [
        ("Killer Whale", 5, 10.0, 80.0, "Bay of Bengal"),
        ("Humpback Whale", 12, -20.0, 150.0, "Pacific Ocean"),
        ("Blue Whale", 3, 40.0, -70.0, "Atlantic Ocean"),
    ];
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), expected.len());
    for (item, (species, population, latitude, longitude, region)) in data.iter().zip(expected) {
        assert_eq!(item["species"], species);
        assert_eq!(item["population"], population);
        assert_eq!(item["latitude"].as_f64(), Some(latitude));
        assert_eq!(item["longitude"].as_f64(), Some(longitude));
        assert_eq!(item["region"], region);
        assert_eq!(item["last_updated"], "2026-01-04");
    }
}

#[tokio::test]
async fn test_population_test_endpoint_works_without_database() {
    let (app, _) = app_with(closed_test_db().await, Config::for_tests());

    let (status, body) = get(&app, "/population-test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_flag_serves_test_data_from_population() {
    let mut config = Config::for_tests();
    config.use_test_data = true;
    let (app, _) = app_with(closed_test_db().await, config);

    let (status, body) = get(&app, "/population").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "test-data");
    assert_eq!(body["count"], 3);

    let (_, body) = get(&app, "/population?region=Pacific%20Ocean").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["species"], "Humpback Whale");
}

#[tokio::test]
async fn test_database_outage_yields_error_body() {
    let (app, _) = app_with(closed_test_db().await, Config::for_tests());

    let (status, body) = get(&app, "/population").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "DATABASE_UNAVAILABLE");
    assert!(
        !body["error"]["message"].as_str().unwrap_or_default().is_empty(),
        "expected an error description, got {body:?}"
    );
}

#[tokio::test]
async fn test_seed_replaces_all_rows() {
    let (app, db) = setup_test_app().await;
    insert_fixture(&db).await;

    let (status, body) = post(&app, "/seed-whales?count=25").await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["count"], 25);

    let rows = Whales::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 25);
    for row in rows {
        assert!(SPECIES.iter().any(|(scientific, _)| *scientific == row.species));
        assert!((1..=20).contains(&row.population));
        assert!((-180.0..=180.0).contains(&row.longitude));
        assert!((-90.0..=90.0).contains(&row.latitude));
        assert!(REGIONS.contains(&row.region.as_str()));
    }
}

#[tokio::test]
async fn test_seed_uses_default_count() {
    let (app, db) = setup_test_app().await;

    let (status, body) = post(&app, "/seed-whales").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], services::DEFAULT_SEED_COUNT);
    assert_eq!(
        Whales::find().all(&db).await.unwrap().len(),
        services::DEFAULT_SEED_COUNT
    );
}

#[tokio::test]
async fn test_seed_rejects_out_of_range_count() {
    let (app, db) = setup_test_app().await;
    insert_fixture(&db).await;

    for uri in ["/seed-whales?count=0", "/seed-whales?count=10001"] {
        let (status, body) = post(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body:?}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    // Nothing was replaced
    assert_eq!(Whales::find().all(&db).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_seed_in_chunks_larger_than_one_batch() {
    let db = setup_test_db().await;

    let inserted = services::seed_whales(&db, 1_234).await.unwrap();
    assert_eq!(inserted, 1_234);
    assert_eq!(Whales::find().all(&db).await.unwrap().len(), 1_234);
}

#[test]
fn test_generate_synthetic_whales_ranges() {
    let mut rng = StdRng::seed_from_u64(42);
    let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let records = services::generate_synthetic_whales(&mut rng, 500, today);

    assert_eq!(records.len(), 500);
    for r in &records {
        assert!((1..=20).contains(&r.population));
        assert!((-180.0..=180.0).contains(&r.longitude));
        assert!((-90.0..=90.0).contains(&r.latitude));
        assert_eq!(r.last_updated, today);
        let common = SPECIES
            .iter()
            .find(|(scientific, _)| *scientific == r.species)
            .map(|(_, common)| *common);
        assert_eq!(r.common_name.as_deref(), common);
    }
}

#[test]
fn test_generate_synthetic_whales_is_deterministic_for_a_seed() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let a = services::generate_synthetic_whales(&mut StdRng::seed_from_u64(7), 10, today);
    let b = services::generate_synthetic_whales(&mut StdRng::seed_from_u64(7), 10, today);
    assert_eq!(a, b);
}

#[test]
fn test_validate_seed_count() {
    assert_eq!(services::validate_seed_count(None).unwrap(), 100);
    assert_eq!(services::validate_seed_count(Some(1)).unwrap(), 1);
    assert_eq!(services::validate_seed_count(Some(10_000)).unwrap(), 10_000);
    assert!(services::validate_seed_count(Some(0)).is_err());
    assert!(services::validate_seed_count(Some(10_001)).is_err());
}
