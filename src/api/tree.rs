use axum::extract::State;
use axum::Json;

use crate::app::{blocking, AppState};
use crate::error::AppError;
use crate::storage::tree::TreeNode;

/// Axum handler for `GET /api/v1/tree`.
pub async fn tree_handler(State(state): State<AppState>) -> Result<Json<TreeNode>, AppError> {
    let store = state.document_store.clone();
    let tree = blocking(move || store.list_tree()).await?;
    Ok(Json(tree))
}
