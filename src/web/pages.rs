//! HTML page handlers.

use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tera::Context;

use crate::api::upload::{read_file_field, save_upload};
use crate::app::{blocking, AppState};
use crate::error::AppError;
use crate::models::document::Document;
use crate::rendering::markdown::render_markdown;
use crate::storage::path::normalize_path;
use crate::web::breadcrumbs::doc_url;

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocForm {
    #[serde(default)]
    pub path: String,
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct EditDocForm {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// Render `template` with the sidebar and breadcrumbs; `fill` adds the
/// page-specific values.
async fn render_page(
    state: &AppState,
    template: &str,
    current_path: Option<&str>,
    status: StatusCode,
    fill: impl FnOnce(&mut Context),
) -> Result<Response, AppError> {
    let store = state.document_store.clone();
    let tree = blocking(move || store.list_tree()).await?;

    let mut context = state.views.base_context(&tree, current_path);
    fill(&mut context);
    let html = state.views.render(template, &context)?;
    Ok((status, Html(html)).into_response())
}

/// Turn a failed request into an HTML page: missing documents get the
/// empty-state page, everything else the generic error page.
async fn error_page(state: &AppState, current_path: Option<&str>, error: AppError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!("Page request failed: {error}");
    }

    let rendered = match &error {
        AppError::NotFound(_) => {
            render_page(state, "not_found.html", current_path, status, |_| {}).await
        }
        _ => {
            let message = error.to_string();
            render_page(state, "error.html", None, status, |ctx| {
                ctx.insert("status", &status.as_u16());
                ctx.insert("message", &message);
            })
            .await
        }
    };

    rendered.unwrap_or_else(|e| {
        tracing::error!("Failed to render error page: {e}");
        (status, error.to_string()).into_response()
    })
}

async fn respond(
    state: &AppState,
    current_path: Option<&str>,
    result: Result<Response, AppError>,
) -> Response {
    match result {
        Ok(response) => response,
        Err(error) => error_page(state, current_path, error).await,
    }
}

/// `GET /` and `GET /docs`.
pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Response {
    let result = render_page(&state, "index.html", None, StatusCode::OK, |ctx| {
        ctx.insert("error", &query.error);
    })
    .await;
    respond(&state, None, result).await
}

/// `GET /docs/new`.
pub async fn new_doc_form(State(state): State<AppState>) -> Response {
    let result = render_page(&state, "new_doc.html", None, StatusCode::OK, |ctx| {
        ctx.insert("error", &None::<String>);
    })
    .await;
    respond(&state, None, result).await
}

/// `POST /docs` and `POST /docs/new`.
pub async fn create_doc(State(state): State<AppState>, Form(form): Form<CreateDocForm>) -> Response {
    let result = create_doc_inner(&state, form).await;
    respond(&state, None, result).await
}

async fn create_doc_inner(state: &AppState, form: CreateDocForm) -> Result<Response, AppError> {
    let normalized = normalize_path(&form.path);
    let title = form
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let rejection = if normalized.is_empty() {
        Some(("Invalid document path", form.path.clone()))
    } else {
        let store = state.document_store.clone();
        let candidate = normalized.clone();
        if blocking(move || store.exists(&candidate)).await? {
            Some(("Document already exists", normalized.clone()))
        } else {
            None
        }
    };

    if let Some((message, path_value)) = rejection {
        return render_page(state, "new_doc.html", None, StatusCode::BAD_REQUEST, |ctx| {
            ctx.insert("error", message);
            ctx.insert("path_value", &path_value);
            ctx.insert("title_value", &title);
            ctx.insert("content", &form.content);
        })
        .await;
    }

    let content = match &title {
        Some(title) => format!("# {}\n\n{}", title, form.content),
        None => form.content,
    };

    let store = state.document_store.clone();
    let saved = blocking(move || store.write(&normalized, &content)).await?;
    Ok(Redirect::to(&doc_url(&saved)).into_response())
}

/// `GET /docs/{path}` and `GET /docs/{path}/edit`.
pub async fn docs_get(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let (result, current) = match path.strip_suffix("/edit") {
        Some(doc_path) => (edit_doc_form(&state, doc_path).await, doc_path),
        None => (view_doc(&state, &path).await, path.as_str()),
    };
    let current = normalize_path(current);
    respond(&state, Some(current.as_str()), result).await
}

async fn load_document(state: &AppState, path: &str) -> Result<Document, AppError> {
    let store = state.document_store.clone();
    let normalized = normalize_path(path);
    let lookup = normalized.clone();
    match blocking(move || store.read(&lookup)).await? {
        Some(content) => Ok(Document::new(normalized, content)),
        None => Err(AppError::NotFound(format!("Document '{normalized}' not found"))),
    }
}

async fn view_doc(state: &AppState, path: &str) -> Result<Response, AppError> {
    let doc = load_document(state, path).await?;
    let html_content = render_markdown(&doc.content);

    render_page(state, "view_doc.html", Some(doc.path.as_str()), StatusCode::OK, |ctx| {
        ctx.insert("path", &doc.path);
        ctx.insert("title", &doc.title);
        ctx.insert("html_content", &html_content);
        ctx.insert("raw_content", &doc.content);
    })
    .await
}

async fn edit_doc_form(state: &AppState, path: &str) -> Result<Response, AppError> {
    let doc = load_document(state, path).await?;

    render_page(state, "edit_doc.html", Some(doc.path.as_str()), StatusCode::OK, |ctx| {
        ctx.insert("path", &doc.path);
        ctx.insert("content", &doc.content);
    })
    .await
}

/// `POST /docs/{path}/edit` and `POST /docs/{path}/delete`.
pub async fn docs_post(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: Request,
) -> Response {
    let result = if let Some(doc_path) = path.strip_suffix("/edit") {
        match Form::<EditDocForm>::from_request(request, &state).await {
            Ok(Form(form)) => update_doc(&state, doc_path, form.content).await,
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    } else if let Some(doc_path) = path.strip_suffix("/delete") {
        remove_doc(&state, doc_path).await
    } else {
        Err(AppError::NotFound(format!("No action for '{path}'")))
    };
    respond(&state, None, result).await
}

async fn update_doc(state: &AppState, path: &str, content: String) -> Result<Response, AppError> {
    let store = state.document_store.clone();
    let path = path.to_string();
    let saved = blocking(move || store.write(&path, &content)).await?;
    Ok(Redirect::to(&doc_url(&saved)).into_response())
}

async fn remove_doc(state: &AppState, path: &str) -> Result<Response, AppError> {
    let store = state.document_store.clone();
    let path = path.to_string();
    blocking(move || store.delete(&path)).await?;
    Ok(Redirect::to("/docs").into_response())
}

/// `POST /folders/{path}/delete`.
///
/// A folder that still has content is not an error page: the index is shown
/// again with the reason in its `error` parameter.
pub async fn folder_delete(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let result = match path.strip_suffix("/delete") {
        Some(dir_path) => {
            let store = state.document_store.clone();
            let dir_path = dir_path.to_string();
            match blocking(move || store.delete_directory(&dir_path)).await {
                Ok(()) => Ok(Redirect::to("/docs").into_response()),
                Err(AppError::DirectoryNotEmpty(dir)) => {
                    let message = format!("Folder '{dir}' is not empty");
                    let url = format!("/docs?error={}", urlencoding::encode(&message));
                    Ok(Redirect::to(&url).into_response())
                }
                Err(e) => Err(e),
            }
        }
        None => Err(AppError::NotFound(format!("No action for '{path}'"))),
    };
    respond(&state, None, result).await
}

/// `GET /search?query=`.
pub async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let search = state.search_service.clone();
    let query = params.query.clone();
    let result = match blocking(move || search.search(&query)).await {
        Ok(results) => {
            render_page(&state, "search_results.html", None, StatusCode::OK, |ctx| {
                ctx.insert("query", &params.query);
                ctx.insert("results", &results);
            })
            .await
        }
        Err(e) => Err(e),
    };
    respond(&state, None, result).await
}

/// `GET /upload`.
pub async fn upload_form(State(state): State<AppState>) -> Response {
    let result = render_page(&state, "upload_image.html", None, StatusCode::OK, |ctx| {
        ctx.insert("filename", &None::<String>);
        ctx.insert("url", &None::<String>);
    })
    .await;
    respond(&state, None, result).await
}

/// `POST /upload`.
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let result = async {
        let (file_name, data) = read_file_field(&mut multipart).await?;
        let stored = save_upload(state.storage_client.as_ref(), &file_name, data).await?;
        render_page(&state, "upload_image.html", None, StatusCode::OK, |ctx| {
            ctx.insert("filename", &stored.filename);
            ctx.insert("url", &stored.url);
        })
        .await
    }
    .await;
    respond(&state, None, result).await
}
