use actix_web::{web, HttpResponse, Responder};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{aggregate_profile, attach_attractions, Matcher};
use crate::models::{
    assemble_quiz, ErrorResponse, HealthResponse, HistoryQuery, HistoryResponse, QuizItem,
    QuizOption, RecommendRequest, RecommendResponse, ResultQuery, ResultSnapshot, TraitVector,
};
use crate::services::{
    CacheError, CacheKey, CacheManager, CatalogClient, CatalogError, NewResult, PostgresClient,
    PostgresError,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
    pub matching: MatchingSettings,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/regions", web::get().to(list_regions))
        .route("/quiz", web::get().to(get_quiz))
        .route("/recommendations", web::post().to(recommend))
        .route("/results", web::get().to(list_results))
        .route("/results/{id}", web::get().to(get_result))
        .route("/catalog/refresh", web::post().to(refresh_catalog));
}

fn error_response(status: u16, error: &str, message: impl ToString) -> HttpResponse {
    let body = ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code: status,
    };

    match status {
        400 => HttpResponse::BadRequest().json(body),
        404 => HttpResponse::NotFound().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

/// Serve a catalog read from the cache, falling back to the catalog API
///
/// Cache failures never fail the request; they are logged and the catalog
/// is queried directly.
async fn cached<T, F, Fut>(cache: &CacheManager, key: &str, fetch: F) -> Result<T, CatalogError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    match cache.get::<T>(key).await {
        Ok(value) => return Ok(value),
        Err(CacheError::CacheMiss(_)) => {}
        Err(e) => tracing::warn!("Cache read for {} failed, querying catalog: {}", key, e),
    }

    let value = fetch().await?;

    if let Err(e) = cache.set(key, &value).await {
        tracing::warn!("Failed to cache {}: {}", key, e);
    }

    Ok(value)
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// List regions
///
/// GET /api/v1/regions
async fn list_regions(state: web::Data<AppState>) -> impl Responder {
    let regions = cached(&state.cache, &CacheKey::regions(), || state.catalog.get_regions()).await;

    match regions {
        Ok(regions) => HttpResponse::Ok().json(regions),
        Err(e) => {
            tracing::error!("Failed to fetch regions: {}", e);
            error_response(500, "Failed to fetch regions", e)
        }
    }
}

/// Load the quiz questions with their answer options nested
async fn load_quiz(catalog: &CatalogClient) -> Result<Vec<QuizItem>, CatalogError> {
    let questions = catalog.get_questions().await?;
    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let options = catalog.get_options_for_questions(&question_ids).await?;

    Ok(assemble_quiz(questions, &options))
}

/// The quiz: questions by number, each with its options by label
///
/// GET /api/v1/quiz
async fn get_quiz(state: web::Data<AppState>) -> impl Responder {
    let quiz = cached(&state.cache, &CacheKey::quiz(), || load_quiz(&state.catalog)).await;

    match quiz {
        Ok(quiz) => HttpResponse::Ok().json(quiz),
        Err(e) => {
            tracing::error!("Failed to load quiz: {}", e);
            error_response(500, "Failed to load quiz", e)
        }
    }
}

/// Recommendation endpoint
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "attemptId": "uuid",
///   "userId": "string",
///   "regionId": 1,
///   "selectedOptionIds": [1, 5, 9],
///   "limit": 3
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendation request: {:?}", errors);
        return error_response(400, "Validation failed", errors);
    }

    let limit = state.matching.destination_limit(req.limit);
    let attraction_limit = state.matching.attraction_limit as usize;

    tracing::info!(
        "Computing recommendations for attempt {} ({} options, region {:?}, limit {})",
        req.attempt_id,
        req.selected_option_ids.len(),
        req.region_id,
        limit
    );

    // Stage 1: selected options -> profile
    let options = match state.catalog.get_options(&req.selected_option_ids).await {
        Ok(options) => options,
        Err(e) => {
            tracing::error!("Failed to fetch options for attempt {}: {}", req.attempt_id, e);
            return error_response(500, "Failed to fetch quiz options", e);
        }
    };

    if options.len() < req.selected_option_ids.len() {
        tracing::warn!(
            "Attempt {}: {} of {} selected options found in catalog",
            req.attempt_id,
            options.len(),
            req.selected_option_ids.len()
        );
    }

    let option_scores: Vec<TraitVector> = options.iter().map(|o: &QuizOption| o.scores).collect();
    let profile = aggregate_profile(&option_scores);

    // Stage 2: rank candidate destinations
    let region_id = req.region_id;
    let destinations = match cached(&state.cache, &CacheKey::destinations(region_id), || {
        state.catalog.get_destinations(region_id)
    })
    .await
    {
        Ok(destinations) => destinations,
        Err(e) => {
            tracing::error!("Failed to fetch destinations for region {:?}: {}", region_id, e);
            return error_response(500, "Failed to fetch destinations", e);
        }
    };

    tracing::debug!("Ranking {} destinations for attempt {}", destinations.len(), req.attempt_id);

    let ranked = state.matcher.match_destinations(&profile, &destinations, limit);
    let selected_ids: Vec<i64> = ranked.iter().map(|r| r.destination.id).collect();

    // Stage 3: attractions of the selected destinations only
    let attractions = match state.catalog.get_attractions(&selected_ids).await {
        Ok(attractions) => attractions,
        Err(e) => {
            tracing::error!("Failed to fetch attractions for {:?}: {}", selected_ids, e);
            return error_response(500, "Failed to fetch attractions", e);
        }
    };

    let result = attach_attractions(&profile, ranked, &attractions, attraction_limit, destinations.len());

    // Stage 4: persist the snapshot once per attempt for signed-in users
    let saved = match req.user_id.as_deref() {
        Some(user_id) => {
            let snapshot = ResultSnapshot::from(&result);
            let new_result = NewResult {
                attempt_id: req.attempt_id,
                user_id,
                region_id,
                profile: &profile,
                snapshot: &snapshot,
            };

            match state.postgres.save_result(new_result).await {
                Ok(inserted) => inserted,
                Err(e) => {
                    tracing::error!("Failed to store result for attempt {}: {}", req.attempt_id, e);
                    false
                }
            }
        }
        None => false,
    };

    tracing::info!(
        "Returning {} destinations for attempt {} (from {} candidates, saved: {})",
        result.picks.len(),
        req.attempt_id,
        result.total_candidates,
        saved
    );

    HttpResponse::Ok().json(RecommendResponse {
        attempt_id: req.attempt_id,
        profile,
        results: result.picks,
        saved,
        total_candidates: result.total_candidates,
    })
}

/// Result history for a user, newest first
///
/// GET /api/v1/results?userId={userId}&limit=20&offset=0
async fn list_results(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(400, "Validation failed", errors);
    }

    match state
        .postgres
        .list_results(&query.user_id, query.limit as usize, query.offset as usize)
        .await
    {
        Ok(results) => HttpResponse::Ok().json(HistoryResponse {
            user_id: query.user_id.clone(),
            count: results.len(),
            results,
        }),
        Err(e) => {
            tracing::error!("Failed to list results for {}: {}", query.user_id, e);
            error_response(500, "Failed to list results", e)
        }
    }
}

/// A single stored result of the given user
///
/// GET /api/v1/results/{id}?userId={userId}
async fn get_result(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<ResultQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(400, "Validation failed", errors);
    }

    let id = path.into_inner();

    match state.postgres.get_result(id, &query.user_id).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(PostgresError::NotFound(message)) => error_response(404, "Result not found", message),
        Err(e) => {
            tracing::error!("Failed to fetch result {}: {}", id, e);
            error_response(500, "Failed to fetch result", e)
        }
    }
}

/// Drop cached catalog data after the catalog tables were edited
///
/// POST /api/v1/catalog/refresh
async fn refresh_catalog(state: web::Data<AppState>) -> impl Responder {
    match state.cache.invalidate_pattern(CacheKey::CATALOG_PATTERN).await {
        Ok(removed) => {
            tracing::info!("Catalog cache refreshed ({} entries dropped)", removed);
            HttpResponse::Ok().json(serde_json::json!({ "invalidated": removed }))
        }
        Err(e) => {
            tracing::error!("Failed to refresh catalog cache: {}", e);
            error_response(500, "Failed to refresh catalog cache", e)
        }
    }
}
