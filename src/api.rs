use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::metrics::Metrics;
use crate::model::Story;
use crate::service::StoryService;
use crate::store::CacheInfo;

pub const CACHE_HEADER: &str = "x-stories-cache";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StoryService>,
    pub metrics: Option<Metrics>,
}

impl AppState {
    pub fn new(service: Arc<StoryService>) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(health))
        .route("/api/stories", get(stories))
        .route("/api/cache", get(cache_info));

    if let Some(m) = &state.metrics {
        router = router.merge(m.router());
    }

    router
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Internal failure rendered as `500 {"error": "..."}`.
pub struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(target: "api", error = ?self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:#}", self.0) })),
        )
            .into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Default, Deserialize)]
struct StoriesQuery {
    #[serde(default)]
    refresh: bool,
}

#[derive(Serialize)]
struct StoriesResp {
    stories: Vec<Story>,
}

/// Stories with at least two articles; `?refresh=true` forces a recompute.
async fn stories(
    State(state): State<AppState>,
    Query(q): Query<StoriesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let out = state.service.get_stories(q.refresh).await?;
    let stories = out
        .stories
        .into_iter()
        .filter(Story::is_matched)
        .collect::<Vec<_>>();
    Ok((
        [(CACHE_HEADER, out.cache.as_str())],
        Json(StoriesResp { stories }),
    ))
}

async fn cache_info(State(state): State<AppState>) -> Result<Json<CacheInfo>, ApiError> {
    Ok(Json(state.service.cache_info()?))
}
