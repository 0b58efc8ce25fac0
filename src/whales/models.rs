use chrono::NaiveDate;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A whale population record. The PostGIS `location` column is generated from
/// longitude/latitude by the database and never read or written here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "whales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub species: String,
    #[sea_orm(nullable)]
    pub common_name: Option<String>,
    pub population: i32,
    #[sea_orm(column_type = "Double")]
    pub longitude: f64,
    #[sea_orm(column_type = "Double")]
    pub latitude: f64,
    pub region: String,
    pub last_updated: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Flat record as exposed over HTTP
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WhaleRecord {
    /// Scientific name
    pub species: String,
    pub common_name: Option<String>,
    pub population: i32,
    pub longitude: f64,
    pub latitude: f64,
    pub region: String,
    pub last_updated: NaiveDate,
}

impl From<Model> for WhaleRecord {
    fn from(model: Model) -> Self {
        Self {
            species: model.species,
            common_name: model.common_name,
            population: model.population,
            longitude: model.longitude,
            latitude: model.latitude,
            region: model.region,
            last_updated: model.last_updated,
        }
    }
}

impl WhaleRecord {
    pub fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            species: Set(self.species),
            common_name: Set(self.common_name),
            population: Set(self.population),
            longitude: Set(self.longitude),
            latitude: Set(self.latitude),
            region: Set(self.region),
            last_updated: Set(self.last_updated),
            ..Default::default()
        }
    }
}

/// Exact-match filters for the population listing
#[derive(Deserialize, IntoParams, Debug, Default, Clone)]
#[into_params(parameter_in = Query)]
pub struct PopulationFilter {
    /// Scientific name to match exactly
    pub species: Option<String>,
    /// Region label to match exactly
    pub region: Option<String>,
}

impl PopulationFilter {
    pub fn matches(&self, record: &WhaleRecord) -> bool {
        self.species.as_ref().is_none_or(|s| *s == record.species)
            && self.region.as_ref().is_none_or(|r| *r == record.region)
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PopulationResponse {
    /// `database` or `test-data`
    pub source: String,
    pub count: usize,
    pub data: Vec<WhaleRecord>,
}

impl PopulationResponse {
    pub fn new(source: &str, data: Vec<WhaleRecord>) -> Self {
        Self {
            source: source.to_string(),
            count: data.len(),
            data,
        }
    }
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct SeedParams {
    /// Number of synthetic records to generate (1 to 10000, default 100)
    pub count: Option<usize>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SeedResponse {
    pub message: String,
    pub count: usize,
}
