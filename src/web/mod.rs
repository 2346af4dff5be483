//! HTTP surface - axum routes over the core operations.
//!
//! All request and response bodies are JSON; file uploads use multipart
//! form data. Outcome notices that a browser app would show as flash
//! messages are returned in the response body instead. Forecasting runs
//! synchronously inside its handler: one request, one complete pipeline
//! run, no background workers.

mod orders;
mod products;
mod uploads;

use crate::config::Settings;
use crate::errors::Error;
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Resolved runtime settings (upload dir, model path, ...)
    pub settings: Arc<Settings>,
}

/// JSON body for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// What went wrong
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::ProductNotFound { .. } | Error::OrderNotFound { .. } => StatusCode::NOT_FOUND,
            Error::DuplicateProduct { .. } => StatusCode::CONFLICT,
            Error::InvalidInput { .. } | Error::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
            Error::Csv(_) | Error::Json(_) | Error::Forecast { .. } | Error::ModelArtifact { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::Database(_) | Error::Io(_) | Error::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            axum::routing::put(products::update_product).delete(products::delete_product),
        )
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route(
            "/orders/:id",
            axum::routing::put(orders::update_order).delete(orders::delete_order),
        )
        .route("/orders/clear", post(orders::clear_orders))
        .route("/orders/process", post(orders::process_orders))
        .route("/upload/inventory", post(uploads::upload_inventory))
        .route("/upload/orders", post(uploads::upload_orders))
        .route("/forecast", post(uploads::run_forecast))
        .route("/forecast/learned", post(uploads::run_learned_forecast))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
