#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use tempfile::TempDir;

use leafwiki::app::{router, AppState};
use leafwiki::config::Settings;
use leafwiki::storage::documents::DocumentStore;

/// A wiki served from temporary directories.
///
/// The directories live as long as this struct; dropping it removes them.
pub struct TestEnv {
    _data: TempDir,
    pub state: AppState,
    pub router: Router,
    pub uploads_dir: PathBuf,
}

impl TestEnv {
    pub fn start() -> Self {
        let data = tempfile::tempdir().expect("Failed to create temp dir");
        let settings = Settings::for_data_dir(data.path());
        let state = AppState::from_settings(&settings).expect("Failed to build app state");

        let static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");
        let router = router(state.clone(), &static_dir, &settings.uploads_dir);

        Self {
            _data: data,
            state,
            router,
            uploads_dir: settings.uploads_dir,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.state.document_store
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }

    /// Helper: seed a document directly in the store.
    pub fn seed(&self, path: &str, content: &str) {
        self.store().write(path, content).expect("Failed to seed document");
    }
}

/// A minimal 1x1 PNG.
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, // bit depth, color type, CRC
        0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, // IDAT chunk
        0x08, 0xD7, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, // compressed data
        0x00, 0x02, 0x00, 0x01, 0xE2, 0x21, 0xBC, 0x33, // CRC
        0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND chunk
        0xAE, 0x42, 0x60, 0x82,
    ]
}
