use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::rendering::markdown::render_markdown;

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub html: String,
}

/// Axum handler for `POST /render_markdown`, used by the editor preview.
///
/// Accepts either a JSON body or an urlencoded form, both carrying `content`.
pub async fn render_markdown_handler(request: Request) -> Result<Json<RenderResponse>, AppError> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    let payload = if is_json {
        Json::<RenderRequest>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
            .0
    } else {
        Form::<RenderRequest>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
            .0
    };

    Ok(Json(RenderResponse {
        html: render_markdown(&payload.content),
    }))
}
