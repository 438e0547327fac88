use serde::{Deserialize, Serialize};
use crate::models::domain::{Criteria, MatchKind, RankedCandidate};

/// Response for the search submission endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// How the result list was produced (exact, default filter, similar).
    pub outcome: MatchKind,
    pub results: Vec<RankedCandidate>,
    /// The criteria the immediate query actually ran with.
    pub criteria: Criteria,
    /// Id of the standing search, when persistence succeeded.
    #[serde(rename = "standingSearchId")]
    pub standing_search_id: Option<uuid::Uuid>,
    /// False when the registry write failed; results are still valid.
    pub persisted: bool,
}

/// Response for the status toggle endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSearchStatusResponse {
    pub success: bool,
    #[serde(rename = "searchId")]
    pub search_id: uuid::Uuid,
    pub status: String,
}

/// Per-event outcome summary of the match evaluator.
/// Failures here are operational signals only; they never fail the
/// triggering profile write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluated: usize,
    pub matched: usize,
    pub notified: usize,
    pub duplicates: usize,
    pub failures: usize,
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
