use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Pathology, PatientProfile, TriageAnswers};

/// Request to score the triage answers against a set of pathologies
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreTriageRequest {
    #[serde(default, alias = "patient", rename = "patientData")]
    pub patient: PatientProfile,
    #[serde(default, alias = "answers", rename = "triageAnswers")]
    pub answers: TriageAnswers,
    /// Candidate pathologies; the loaded catalogue is used when absent
    #[serde(default)]
    pub pathologies: Option<Vec<Pathology>>,
    #[validate(range(min = 1, max = 500))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to explain the modifier of a single pathology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierRequest {
    pub pathology: Pathology,
    #[serde(default, alias = "patient", rename = "patientData")]
    pub patient: PatientProfile,
    #[serde(default, alias = "answers", rename = "triageAnswers")]
    pub answers: TriageAnswers,
}

/// Request to classify a previously computed modifier
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BadgeRequest {
    pub pathology: Pathology,
    #[serde(default, alias = "patient", rename = "patientData")]
    pub patient: PatientProfile,
    #[validate(range(min = 0.0))]
    pub modifier: f64,
}
