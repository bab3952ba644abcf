use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::app::{blocking, AppState};
use crate::error::AppError;
use crate::models::search::SearchHit;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Axum handler for `GET /api/v1/search?q=`.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let search = state.search_service.clone();
    let hits = blocking(move || search.search(&params.q)).await?;
    Ok(Json(hits))
}
