use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::TriageRanker;
use crate::models::{
    BadgeRequest, BadgeResponse, CatalogueResponse, ErrorResponse, HealthResponse, ModifierRequest,
    ModifierResponse, ScoreTriageRequest, ScoreTriageResponse,
};
use crate::services::PathologyCatalogue;
use std::sync::Arc;

/// Result size limits applied to scoring requests
#[derive(Debug, Clone, Copy)]
pub struct RankingLimits {
    pub default_limit: Option<usize>,
    pub max_limit: usize,
}

impl RankingLimits {
    /// Resolve the effective limit for a request
    pub fn resolve(&self, requested: Option<u16>) -> Option<usize> {
        requested
            .map(usize::from)
            .or(self.default_limit)
            .map(|limit| limit.min(self.max_limit))
    }
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            default_limit: None,
            max_limit: 500,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalogue: Arc<PathologyCatalogue>,
    pub ranker: TriageRanker,
    pub limits: RankingLimits,
}

/// Configure all triage routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/pathologies", web::get().to(list_pathologies))
        .route("/triage/score", web::post().to(score_triage))
        .route("/triage/modifier", web::post().to(explain_modifier))
        .route("/triage/badge", web::post().to(classify_badge));
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.catalogue.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        catalogue_size: state.catalogue.len(),
    })
}

/// List the loaded catalogue
///
/// GET /api/v1/pathologies
async fn list_pathologies(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(CatalogueResponse {
        count: state.catalogue.len(),
        pathologies: state.catalogue.summaries(),
    })
}

/// Score triage answers
///
/// POST /api/v1/triage/score
///
/// Request body:
/// ```json
/// {
///   "patientData": { "age": "30-50", "sex": "femme", "lifestyle": "actif" },
///   "triageAnswers": { "temporalEvolution": "brutale", "painType": "mecanique", "painLocation": "epaule" },
///   "pathologies": [ ... ],
///   "limit": 10
/// }
/// ```
///
/// `pathologies` is optional; the loaded catalogue is ranked when it is absent.
async fn score_triage(
    state: web::Data<AppState>,
    req: web::Json<ScoreTriageRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for score request: {:?}", errors);
        return validation_error(errors);
    }

    let req = req.into_inner();
    let limit = state.limits.resolve(req.limit);

    let (source, pathologies) = match req.pathologies.as_deref() {
        Some(inline) => ("request", inline),
        None => ("catalogue", state.catalogue.pathologies()),
    };

    tracing::debug!(
        "Scoring {} pathologies from {} (limit: {:?})",
        pathologies.len(),
        source,
        limit
    );

    let result = state.ranker.rank(pathologies, &req.answers, &req.patient, limit);

    let response = ScoreTriageResponse {
        triage_id: uuid::Uuid::new_v4(),
        matches: result.matches,
        total_candidates: result.total_candidates,
        dropped: result.dropped,
    };

    tracing::info!(
        "Triage {} returned {} matches (from {} candidates)",
        response.triage_id,
        response.matches.len(),
        response.total_candidates
    );

    HttpResponse::Ok().json(response)
}

/// Explain the modifier of a single pathology
///
/// POST /api/v1/triage/modifier
async fn explain_modifier(
    state: web::Data<AppState>,
    req: web::Json<ModifierRequest>,
) -> impl Responder {
    let breakdown = state
        .ranker
        .modifier_breakdown(&req.pathology, &req.answers, &req.patient);
    let badge = state
        .ranker
        .classify_badge(&req.pathology, &req.patient, breakdown.modifier);

    HttpResponse::Ok().json(ModifierResponse {
        modifier: breakdown.modifier,
        steps: breakdown.steps,
        badge,
    })
}

/// Classify a previously computed modifier
///
/// POST /api/v1/triage/badge
async fn classify_badge(
    state: web::Data<AppState>,
    req: web::Json<BadgeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let badge = state
        .ranker
        .classify_badge(&req.pathology, &req.patient, req.modifier);

    HttpResponse::Ok().json(BadgeResponse { badge })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_resolution() {
        let limits = RankingLimits {
            default_limit: Some(20),
            max_limit: 50,
        };

        assert_eq!(limits.resolve(None), Some(20));
        assert_eq!(limits.resolve(Some(10)), Some(10));
        assert_eq!(limits.resolve(Some(400)), Some(50));
        assert_eq!(RankingLimits::default().resolve(None), None);
        assert_eq!(RankingLimits::default().resolve(Some(300)), Some(300));
    }
}
