use serde::{Deserialize, Serialize};
use crate::models::domain::{DestinationPick, StoredResult, UserProfile};

/// Response for the recommendation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(rename = "attemptId")]
    pub attempt_id: uuid::Uuid,
    pub profile: UserProfile,
    pub results: Vec<DestinationPick>,
    /// True when this call wrote the snapshot; false for guests and repeated attempts
    pub saved: bool,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response for the result history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub results: Vec<StoredResult>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
