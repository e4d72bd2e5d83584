use serde::{Deserialize, Serialize};
use validator::Validate;

use super::task_models::DayOfWeek;

#[derive(Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub day_of_week: Option<DayOfWeek>,
}

#[derive(Debug, Serialize, Validate)]
pub struct UpdateDescriptionRequest {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
}

/// Outcome of the bulk delete of completed tasks.
#[derive(Debug, Deserialize)]
pub struct DeleteCompletedResponse {
    pub deleted: u64,
}
