//! Server configuration.
//!
//! Layered as defaults → TOML file → `LEAFWIKI_*` environment variables →
//! command line flags.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::AppError;

const ENV_PREFIX: &str = "LEAFWIKI";
const DEFAULT_CONFIG_NAME: &str = "leafwiki";

/// Command line arguments.
#[derive(Debug, Default, Parser)]
#[command(name = "leafwiki", version, about = "Minimal Markdown wiki server")]
pub struct Cli {
    /// Path to a TOML configuration file (defaults to ./leafwiki.toml if present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8000.
    #[arg(long)]
    pub bind: Option<String>,

    /// Data directory; documents go to <dir>/docs and uploads to <dir>/uploads.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Resolved server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub docs_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub static_dir: PathBuf,
    pub log_filter: String,
}

impl Settings {
    /// Load settings from every configured source.
    pub fn load(cli: &Cli) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .set_default("bind_addr", "127.0.0.1:8000")
            .and_then(|b| b.set_default("docs_dir", "data/docs"))
            .and_then(|b| b.set_default("uploads_dir", "data/uploads"))
            .and_then(|b| b.set_default("static_dir", "static"))
            .and_then(|b| b.set_default("log_filter", "leafwiki=info,tower_http=info"))
            .map_err(config_error)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(config::File::from(path.as_path()).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        if let Some(bind) = &cli.bind {
            builder = builder
                .set_override("bind_addr", bind.clone())
                .map_err(config_error)?;
        }
        if let Some(data_dir) = &cli.data_dir {
            builder = builder
                .set_override("docs_dir", path_value(&data_dir.join("docs")))
                .and_then(|b| b.set_override("uploads_dir", path_value(&data_dir.join("uploads"))))
                .map_err(config_error)?;
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)
    }

    /// Settings rooted at `data_dir` with every other value defaulted.
    pub fn for_data_dir(data_dir: &Path) -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            docs_dir: data_dir.join("docs"),
            uploads_dir: data_dir.join("uploads"),
            static_dir: PathBuf::from("static"),
            log_filter: "leafwiki=info,tower_http=info".to_string(),
        }
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn config_error(err: config::ConfigError) -> AppError {
    AppError::Internal(format!("Invalid configuration: {err}"))
}
