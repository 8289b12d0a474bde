use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to compute recommendations for a finished quiz attempt
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    /// Client-generated id of the attempt; results are stored at most once per id
    #[serde(alias = "attempt_id", rename = "attemptId")]
    pub attempt_id: uuid::Uuid,
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(alias = "region_id", rename = "regionId", default)]
    pub region_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    #[serde(alias = "selected_option_ids", rename = "selectedOptionIds")]
    pub selected_option_ids: Vec<i64>,
    #[validate(range(min = 1, max = 20))]
    #[serde(default)]
    pub limit: Option<u8>,
}

/// Query parameters for the result history listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_history_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u16,
    #[serde(default)]
    pub offset: u32,
}

/// Owner check for reading a single stored result
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResultQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

fn default_history_limit() -> u16 {
    20
}
