use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Processing status for async operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }
}

#[derive(ToSchema, Deserialize, Serialize, Debug)]
pub struct HealthCheck {
    pub status: String,
    pub database: String,
    pub use_test_data: bool,
}
