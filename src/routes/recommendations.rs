use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::RecommendationResult,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
}

/// Handler for recommendations endpoint
///
/// Unknown titles answer 200 with empty sequences; the caller tells "nothing
/// found" apart from "not asked yet" through its own state.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResult>> {
    if params.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        title = %params.title,
        "Processing recommendation request"
    );

    let result = state.recommender.recommend(&params.title).await;
    Ok(Json(result))
}
