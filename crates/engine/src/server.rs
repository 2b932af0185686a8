//! HTTP interface for the recommendation engine

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use reelgraph_core::{MovieFilter, PaginatedResponse, PaginationParams, RecommenderError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::recommendation::SeedId;
use crate::RecommendationEngine;

/// Application state shared across all handlers
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self { engine }
    }
}

/// Body of `/recommend` and `/recommend/ranked`
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Integer, or a string holding one
    #[serde(default)]
    pub movie_id: serde_json::Value,
    /// Results per recommender; the engine default when omitted
    pub top_n: Option<usize>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Engine errors rendered as JSON HTTP responses
#[derive(Debug)]
pub struct ApiError(pub RecommenderError);

impl From<RecommenderError> for ApiError {
    fn from(err: RecommenderError) -> Self {
        Self(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            RecommenderError::ValidationError(_) => StatusCode::BAD_REQUEST,
            RecommenderError::SeedNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.0.to_string(),
        })
    }
}

impl RecommendRequest {
    fn parse(
        &self,
        engine: &RecommendationEngine,
    ) -> Result<(SeedId, usize, PaginationParams), ApiError> {
        let validated = SeedId::try_from(&self.movie_id).and_then(|seed| {
            let pagination = PaginationParams::new(self.page, self.limit)?;
            Ok((seed, pagination))
        });

        match validated {
            Ok((seed, pagination)) => {
                let top_n = self.top_n.unwrap_or_else(|| engine.default_top_n());
                Ok((seed, top_n, pagination))
            }
            Err(e) => {
                warn!(error = %e, "Rejected recommendation request");
                Err(ApiError(e))
            }
        }
    }
}

/// POST /recommend - Hybrid recommendations as a deduplicated title list
///
/// An unknown movie yields an empty page, not an error.
pub async fn recommend(
    state: web::Data<AppState>,
    body: web::Json<RecommendRequest>,
) -> Result<HttpResponse, ApiError> {
    let (seed, top_n, pagination) = body.parse(&state.engine)?;

    info!(movie_id = %seed, top_n, page = pagination.page, "Generating hybrid recommendations");

    let titles = state.engine.get_hybrid_recommendations(seed, top_n);
    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(titles, &pagination)))
}

/// POST /recommend/ranked - Hybrid recommendations ordered by blended score
pub async fn recommend_ranked(
    state: web::Data<AppState>,
    body: web::Json<RecommendRequest>,
) -> Result<HttpResponse, ApiError> {
    let (seed, top_n, pagination) = body.parse(&state.engine)?;

    info!(movie_id = %seed, top_n, page = pagination.page, "Generating ranked recommendations");

    let ranked = state.engine.hybrid_recommendations(seed, top_n).into_ranked();
    Ok(HttpResponse::Ok().json(PaginatedResponse::from_items(ranked, &pagination)))
}

/// POST /analytics - Ratings joined with metadata, filtered by
/// `min_rating`, `genre` and `year`
pub async fn analytics(
    state: web::Data<AppState>,
    body: web::Json<MovieFilter>,
) -> Result<HttpResponse, ApiError> {
    info!(
        min_rating = ?body.min_rating,
        genre = ?body.genre,
        year = ?body.year,
        "Filtering ratings"
    );

    let records = state.engine.filter_movies(&body)?;
    Ok(HttpResponse::Ok().json(records))
}

/// Health check endpoint
async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "reelgraph-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Configure application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError(RecommenderError::ValidationError(err.to_string())).into()
    }))
    .route("/health", web::get().to(health))
    .route("/recommend", web::post().to(recommend))
    .route("/recommend/ranked", web::post().to(recommend_ranked))
    .route("/analytics", web::post().to(analytics));
}
