//! OsteoUpgrade triage scorer
//!
//! Ranks candidate pathologies from a patient's triage answers and profile.
//! The scoring itself is pure and synchronous; the HTTP layer in `routes`
//! and the catalogue loader in `services` wrap it as a service.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{classify_badge, compute_inclusion_exclusion_modifier, filter_and_rank_pathologies, TriageRanker};
pub use crate::models::{BadgeInfo, Pathology, PatientProfile, ScoredMatch, ScoringConstants, TriageAnswers};
pub use crate::services::PathologyCatalogue;
