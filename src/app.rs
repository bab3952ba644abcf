use std::path::Path;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Settings;
use crate::error::AppError;
use crate::search::client::{ScanSearchService, SearchService};
use crate::storage::client::{LocalStorageClient, StorageClient};
use crate::storage::documents::DocumentStore;
use crate::web::{pages, views::Views};

/// Shared handler state. Every root directory comes in through here.
#[derive(Clone)]
pub struct AppState {
    pub document_store: Arc<DocumentStore>,
    pub search_service: Arc<dyn SearchService>,
    pub storage_client: Arc<dyn StorageClient>,
    pub views: Arc<Views>,
}

impl AppState {
    /// Build the state from configured directories, creating them if needed.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let document_store = DocumentStore::open(&settings.docs_dir)?;
        let search_service = ScanSearchService::new(document_store.root());
        let storage_client = LocalStorageClient::new(&settings.uploads_dir)?;

        Ok(Self {
            document_store: Arc::new(document_store),
            search_service: Arc::new(search_service),
            storage_client: Arc::new(storage_client),
            views: Arc::new(Views::new()?),
        })
    }
}

/// Run blocking filesystem work off the async executor.
pub async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {e}")))?
}

/// Build the full router: HTML pages, JSON API and static mounts.
pub fn router(state: AppState, static_dir: &Path, uploads_dir: &Path) -> Router {
    Router::new()
        // HTML pages
        .route("/", get(pages::index))
        .route("/docs", get(pages::index).post(pages::create_doc))
        .route("/docs/new", get(pages::new_doc_form).post(pages::create_doc))
        .route("/docs/{*path}", get(pages::docs_get).post(pages::docs_post))
        .route("/folders/{*path}", post(pages::folder_delete))
        .route("/search", get(pages::search_page))
        .route("/upload", get(pages::upload_form).post(pages::upload_file))
        .route(
            "/render_markdown",
            post(api::render::render_markdown_handler),
        )
        // JSON API
        .route("/api/v1/search", get(api::search::search_handler))
        .route("/api/v1/tree", get(api::tree::tree_handler))
        .route("/api/v1/upload", post(api::upload::upload_handler))
        // Static files
        .nest_service("/static", ServeDir::new(static_dir))
        .nest_service(api::upload::UPLOADS_URL_PREFIX, ServeDir::new(uploads_dir))
        // uploads have no size cap
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
