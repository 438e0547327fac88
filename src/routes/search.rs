use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{self, fallback, query};
use crate::models::{
    Criteria, ErrorResponse, HealthResponse, MatchKind, ProfileEventRequest, RankedCandidate,
    RequesterKind, SearchResponse, SearchStatus, SetSearchStatusRequest, SetSearchStatusResponse,
    SubmitSearchRequest,
};
use crate::services::{
    CriteriaExtractor, MatchEvaluator, ProfileStore, RegistryError, StandingSearchRegistry,
};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<StandingSearchRegistry>,
    pub profiles: Arc<ProfileStore>,
    pub extractor: Arc<CriteriaExtractor>,
    pub evaluator: Arc<MatchEvaluator>,
}

/// Configure all search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/search", web::post().to(submit_search))
        .route("/search/status", web::post().to(set_search_status))
        .route("/search/active", web::get().to(get_active_search))
        .route("/profiles/events", web::post().to(profile_event));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.registry.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Submit a search description
///
/// POST /api/v1/search
///
/// Runs the extraction → normalize → query → fallback pipeline for the
/// immediate result list, then persists the standing search best-effort.
/// The requester always receives either a ranked (possibly fallback)
/// result list or an explicit empty state; a registry write failure only
/// clears the `persisted` flag.
async fn submit_search(
    state: web::Data<AppState>,
    req: web::Json<SubmitSearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for submit_search request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let Some(requester_kind) = RequesterKind::parse(&req.requester_kind) else {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid requester kind".to_string(),
            message: "Requester kind must be one of: athlete, coach, club, agent".to_string(),
            status_code: 400,
        });
    };

    tracing::info!("Search submission from requester {}", req.requester_id);

    // Extraction is best-effort: any failure or timeout degrades to an
    // empty map inside the extractor.
    let raw = state.extractor.extract(&req.description).await;
    let criteria = core::normalize(&raw);

    let plan = fallback::plan(&criteria);

    let candidates = match state.profiles.query_candidates(&plan.criteria).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Candidate query failed for {}: {}", req.requester_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "query_failed".to_string(),
                message: "Candidate query failed, please retry".to_string(),
                status_code: 500,
            });
        }
    };

    let mut kind = plan.kind;
    let mut results = query::rank(candidates, &plan.criteria, query::RESULT_CAP);

    // Broaden a positional zero-result into "similar profiles", at most
    // once. A fault here is absorbed: the true empty state is an answer.
    if fallback::should_broaden(kind, &criteria, results.len()) {
        match state.profiles.query_candidates(&Criteria::default()).await {
            Ok(candidates) => {
                results = query::rank(candidates, &Criteria::default(), fallback::SIMILAR_LIMIT);
                kind = MatchKind::Similar;
            }
            Err(e) => {
                tracing::warn!("Similar-profiles fallback query failed: {}", e);
            }
        }
    }

    let outcome = fallback::finalize(kind, results);

    // Persist after the results are in hand; failure must not take the
    // answer away from the user.
    let (standing_search_id, persisted) = match state
        .registry
        .upsert(
            &req.requester_id,
            requester_kind,
            &req.requester_contact,
            &req.description,
            &criteria,
        )
        .await
    {
        Ok(search) => (Some(search.id), true),
        Err(e) => {
            tracing::warn!(
                "Standing search persistence failed for {}, results still returned: {}",
                req.requester_id,
                e
            );
            (None, false)
        }
    };

    let results = mask_contacts(outcome.results, req.contact_visible);

    tracing::info!(
        "Returning {} results ({:?}) for requester {}",
        results.len(),
        outcome.kind,
        req.requester_id
    );

    HttpResponse::Ok().json(SearchResponse {
        outcome: outcome.kind,
        results,
        criteria,
        standing_search_id,
        persisted,
    })
}

/// Strip contact details unless the paywall gate allowed them.
/// Display-time only; matching always ran on full attributes.
fn mask_contacts(mut results: Vec<RankedCandidate>, contact_visible: bool) -> Vec<RankedCandidate> {
    if !contact_visible {
        for candidate in &mut results {
            candidate.contact = None;
        }
    }
    results
}

/// Toggle a standing search between active and expired
///
/// POST /api/v1/search/status
async fn set_search_status(
    state: web::Data<AppState>,
    req: web::Json<SetSearchStatusRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let Some(status) = SearchStatus::parse(&req.status) else {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid status".to_string(),
            message: "Status must be one of: active, expired".to_string(),
            status_code: 400,
        });
    };

    match state.registry.set_status(req.search_id, status).await {
        Ok(()) => HttpResponse::Ok().json(SetSearchStatusResponse {
            success: true,
            search_id: req.search_id,
            status: status.as_str().to_string(),
        }),
        Err(RegistryError::NotFound(id)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Not found".to_string(),
            message: format!("Standing search {} does not exist", id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to set status for {}: {}", req.search_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "write_failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Get the requester's active standing search
///
/// GET /api/v1/search/active?requesterId={requesterId}
///
/// Used by the UI to restore continuation state; the registry is the
/// single durable source, the client only caches a read-through view.
async fn get_active_search(
    state: web::Data<AppState>,
    params: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let Some(requester_id) = params.get("requesterId") else {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Missing requesterId parameter".to_string(),
            message: "requesterId query parameter is required".to_string(),
            status_code: 400,
        });
    };

    match state.registry.find_active_for(requester_id).await {
        Ok(Some(search)) => HttpResponse::Ok().json(search),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Not found".to_string(),
            message: format!("No active standing search for {}", requester_id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch standing search for {}: {}", requester_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "query_failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Profile create/update event feed
///
/// POST /api/v1/profiles/events
///
/// Evaluates the written profile against every active standing search.
/// Always answers 200 with a report: notification-path failures are
/// operational signals and must never fail the profile write that
/// triggered them. The feed may deliver the same event more than once;
/// re-evaluation cannot duplicate notifications.
async fn profile_event(
    state: web::Data<AppState>,
    req: web::Json<ProfileEventRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let profile = req.into_inner().into_profile();

    tracing::debug!("Evaluating profile event for {}", profile.id);

    let report = state.evaluator.on_profile_event(&profile).await;

    HttpResponse::Ok().json(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_mask_contacts() {
        let candidate = RankedCandidate {
            candidate_id: "1".to_string(),
            name: "Athlete".to_string(),
            avatar_url: None,
            position: "Pivô".to_string(),
            nationality: "Brasil".to_string(),
            height_cm: 195,
            status: "Available".to_string(),
            experience_years: 4,
            contact: Some("athlete@example.com".to_string()),
            rank: 1,
            score: 100.0,
        };

        let masked = mask_contacts(vec![candidate.clone()], false);
        assert!(masked[0].contact.is_none());

        let visible = mask_contacts(vec![candidate], true);
        assert!(visible[0].contact.is_some());
    }
}
