//! Offline trainer for the learned stock prediction model.
//!
//! Reads a historical-orders CSV, aggregates it, fits the scaler + linear
//! model, and saves the artifact for the learned forecast endpoint to load.
//!
//! Usage: `train_model <orders.csv> [artifact-path]`

use std::path::PathBuf;

use stockroom::errors::{Error, Result};
use stockroom::forecast;
use stockroom::forecast::predict::LearnedPredictor;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let dataset = args.next().map(PathBuf::from).ok_or_else(|| Error::Config {
        message: "Usage: train_model <orders.csv> [artifact-path]".to_string(),
    })?;
    let artifact_path = args
        .next()
        .map_or_else(|| PathBuf::from("data/stock_model.json"), PathBuf::from);

    let file = std::fs::File::open(&dataset)?;
    let loaded = forecast::load_aggregates(file)?;
    info!(
        orders_seen = loaded.orders_seen,
        orders_skipped = loaded.orders_skipped,
        products = loaded.aggregates.len(),
        "Loaded training aggregates"
    );

    let (_predictor, score) = LearnedPredictor::train(&loaded.aggregates, &artifact_path)?;
    info!(
        path = %artifact_path.display(),
        r_squared = score,
        "Model trained and saved"
    );

    Ok(())
}
