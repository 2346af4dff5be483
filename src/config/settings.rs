//! Application settings loaded from environment variables.
//!
//! Every setting has a default suitable for running locally, so a bare
//! `cargo run` works without any `.env` file. Uploaded files are written
//! under `upload_dir` keyed by a generated UUID, so two uploads with the
//! same original filename never collide.

use crate::errors::Result;
use std::path::PathBuf;

/// Resolved runtime settings for the application.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SeaORM connection string, e.g. `sqlite://data/stockroom.sqlite?mode=rwc`
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Scratch directory for uploaded CSV files
    pub upload_dir: PathBuf,
    /// Where the trained forecasting model artifact is stored
    pub model_path: PathBuf,
    /// Optional path to a TOML file with initial products to seed
    pub seed_path: Option<PathBuf>,
}

impl Settings {
    /// Builds settings from the process environment, falling back to
    /// local-development defaults for anything unset.
    ///
    /// # Errors
    /// Returns an error if the upload directory cannot be created.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/stockroom.sqlite?mode=rwc".to_string());
        let bind_addr =
            std::env::var("STOCKROOM_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let upload_dir = PathBuf::from(
            std::env::var("STOCKROOM_UPLOAD_DIR").unwrap_or_else(|_| "data/uploads".to_string()),
        );
        let model_path = PathBuf::from(
            std::env::var("STOCKROOM_MODEL_PATH")
                .unwrap_or_else(|_| "data/stock_model.json".to_string()),
        );
        let seed_path = std::env::var("STOCKROOM_SEED_FILE").ok().map(PathBuf::from);

        std::fs::create_dir_all(&upload_dir)?;

        Ok(Self {
            database_url,
            bind_addr,
            upload_dir,
            model_path,
            seed_path,
        })
    }
}
