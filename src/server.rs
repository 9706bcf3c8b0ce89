use axum::{
    extract::Request,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::correlation::CorrelationService;
use crate::db::{MovieRepo, ReviewGraphRepo};

/// Lifecycle-scoped handles shared by every request. Built once in `run`.
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn MovieRepo>,
    pub correlation: CorrelationService,
}

impl AppState {
    pub fn new(movies: Arc<dyn MovieRepo>, graph: Arc<dyn ReviewGraphRepo>) -> Self {
        Self {
            correlation: CorrelationService::new(movies.clone(), graph),
            movies,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let movie_routes = Router::new()
        .route("/movies", get(crate::movies::list_movies))
        .route("/movies/", get(crate::movies::list_movies))
        .route("/movies/search", get(crate::movies::search_movies))
        .route("/movies/common_movies", get(crate::movies::common_movies))
        .route("/movies/movie_ratings", get(crate::movies::movie_ratings))
        .route(
            "/movies/user_movie_ratings",
            get(crate::movies::user_movie_ratings),
        )
        .route("/movies/:title", put(crate::movies::update_movie))
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Path normalization has to see the request before routing does, so the
    // routes sit behind a fallback that carries the rewrite layer.
    Router::new()
        .fallback_service(movie_routes)
        .layer(axum::middleware::from_fn(crate::middleware::normalize_path))
}

async fn fallback_handler(req: Request) -> impl IntoResponse {
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" }))).into_response()
}
