// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AdditionalCriteria, AgeBucket, BadgeInfo, BadgeKind, ExclusionCriteria, InclusionCriteria, Lifestyle,
    ModifierBreakdown, ModifierRule, ModifierStep, Pathology, PatientProfile, ProfileValue, Requirement, ScoredMatch,
    ScoringConstants, Sex, TriageAnswers, TriageCriteria, TriageDimension,
};
pub use requests::{BadgeRequest, ModifierRequest, ScoreTriageRequest};
pub use responses::{
    BadgeResponse, CatalogueResponse, ErrorResponse, HealthResponse, ModifierResponse, ScoreTriageResponse,
};
