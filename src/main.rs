use anyhow::Context;
use clap::Parser;
use leafwiki::app::{router, AppState};
use leafwiki::config::{Cli, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        )
        .init();

    tracing::info!("Starting Leafwiki server...");

    let app_state = AppState::from_settings(&settings)?;
    tracing::info!(
        "Documents in {}, uploads in {}",
        app_state.document_store.root().display(),
        settings.uploads_dir.display()
    );

    let app = router(app_state, &settings.static_dir, &settings.uploads_dir);

    tracing::info!("Listening on http://{}", settings.bind_addr);
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
