//! Unified error types and result handling for Stockroom.
//!
//! All fallible operations in the crate return [`Result`], backed by the
//! [`Error`] enum below. Variants are grouped by layer: configuration,
//! database, CSV/JSON ingest, and the forecasting pipeline.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration problem (missing setting, unparseable config file).
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// Underlying SeaORM / SQLite failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure (uploads, model artifacts).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A referenced product does not exist.
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// The product id or name that was looked up
        id: String,
    },

    /// A referenced order does not exist.
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The order id that was looked up
        order_id: i64,
    },

    /// A product name collided with an existing one.
    #[error("Product already exists: {name}")]
    DuplicateProduct {
        /// The conflicting product name
        name: String,
    },

    /// A numeric field failed validation (negative price, NaN, ...).
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// Input validation failure on a request or imported row.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// CSV file could not be read or decoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON payload (line items, model artifact) could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Model artifact missing or unusable when learned mode was requested.
    #[error("Model artifact error: {message}")]
    ModelArtifact {
        /// Why the artifact could not be used
        message: String,
    },

    /// The forecasting pipeline failed as a whole (unreadable dataset,
    /// unexpected schema). Distinct from a legitimately empty result.
    #[error("Forecast pipeline error: {message}")]
    Forecast {
        /// Why the pipeline could not run
        message: String,
    },
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
