use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::config::RankingSettings;
use crate::core::Matcher;
use crate::models::{ErrorResponse, HealthResponse, ParseResumeRequest, ParsedResume, RankRequest, RankResponse};
use crate::services::{EmbeddingProvider, SemanticAvailability};
use std::sync::Arc;

/// Résumé text shorter than this (after trimming) is treated as an extraction failure
const MIN_RESUME_CHARS: usize = 50;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
    pub provider: Option<Arc<EmbeddingProvider>>,
    pub availability: SemanticAvailability,
    pub ranking: RankingSettings,
}

impl AppState {
    fn model_loaded(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.is_loaded())
    }
}

/// Configure all ranking-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/rank", web::post().to(rank_candidates))
        .route("/resumes/parse", web::post().to(parse_resume));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    // Lexical ranking always works; a missing model only degrades quality
    let status = if state.availability.is_ready() && !state.model_loaded() {
        "warming"
    } else {
        "healthy"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        semantic: state.availability.summary(),
        model_loaded: state.model_loaded(),
    })
}

/// Rank candidates endpoint
///
/// POST /api/v1/rank
///
/// Request body:
/// ```json
/// {
///   "jobDescription": "string",
///   "candidates": [{"id": 1, "name": "string", "email": "string", "resume_text": "string"}],
///   "limit": 10
/// }
/// ```
async fn rank_candidates(
    state: web::Data<AppState>,
    req: web::Json<RankRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rank request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if req.candidates.len() > state.ranking.max_candidates {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Too many candidates".to_string(),
            message: format!(
                "At most {} candidates can be ranked per request, got {}",
                state.ranking.max_candidates,
                req.candidates.len()
            ),
            status_code: 400,
        });
    }

    let limit = state.ranking.effective_limit(req.limit);
    let RankRequest { job_description, candidates, .. } = req.into_inner();
    let total_candidates = candidates.len();

    tracing::info!("Ranking {} candidates, limit: {}", total_candidates, limit);

    // Model loading and inference block; keep them off the async workers
    let matcher = state.matcher.clone();
    let outcome = match web::block(move || matcher.rank_detailed(&job_description, &candidates)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Ranking task failed: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to rank candidates".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let mut matches = outcome.matches;
    matches.truncate(limit);

    tracing::info!(
        "Returning {} matches (from {} candidates) via {} strategy",
        matches.len(),
        total_candidates,
        outcome.strategy
    );

    HttpResponse::Ok().json(RankResponse {
        matches,
        total_candidates,
        strategy: outcome.strategy.to_string(),
        fallback_reason: outcome.fallback_reason,
    })
}

/// Parse résumé text endpoint
///
/// POST /api/v1/resumes/parse
///
/// Extracts a display name and contact address from already-extracted text.
async fn parse_resume(req: web::Json<ParseResumeRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if req.text.trim().chars().count() < MIN_RESUME_CHARS {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Résumé text too short".to_string(),
            message: "Could not extract meaningful text from resume".to_string(),
            status_code: 400,
        });
    }

    let parsed = ParsedResume::from_text(&req.text);
    tracing::debug!("Parsed résumé: name={:?}, email={:?}", parsed.name, parsed.email);

    HttpResponse::Ok().json(parsed)
}
