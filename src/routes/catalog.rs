use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{error::AppResult, middleware::request_id::RequestId, routes::AppState};

#[derive(Debug, Serialize)]
pub struct TitlesResponse {
    pub titles: Vec<String>,
    pub count: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub count: usize,
}

/// Lists every catalog title, in catalog order
pub async fn list_titles(State(state): State<AppState>) -> Json<TitlesResponse> {
    let catalog = state.recommender.catalog().await;
    Json(TitlesResponse {
        titles: catalog.titles(),
        count: catalog.len(),
        loaded_at: catalog.loaded_at(),
    })
}

/// Reloads the catalog from disk and invalidates cached metadata
pub async fn reload(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<ReloadResponse>> {
    tracing::info!(request_id = %request_id, "Catalog reload requested");

    let count = state.recommender.reload().await?;
    Ok(Json(ReloadResponse { count }))
}
