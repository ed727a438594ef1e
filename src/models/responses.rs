use serde::{Deserialize, Serialize};
use crate::core::ranker::DropTally;
use crate::models::domain::{BadgeInfo, ModifierStep, ScoredMatch};
use crate::services::PathologySummary;

/// Response for the triage scoring endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTriageResponse {
    #[serde(rename = "triageId")]
    pub triage_id: uuid::Uuid,
    pub matches: Vec<ScoredMatch>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub dropped: DropTally,
}

/// Modifier explanation for a single pathology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierResponse {
    pub modifier: f64,
    pub steps: Vec<ModifierStep>,
    pub badge: Option<BadgeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeResponse {
    pub badge: Option<BadgeInfo>,
}

/// Loaded catalogue listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueResponse {
    pub count: usize,
    pub pathologies: Vec<PathologySummary>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "catalogueSize")]
    pub catalogue_size: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
