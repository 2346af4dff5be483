//! Shared test utilities for Stockroom.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::{entities, errors::Result};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a pending test order with the given raw line-items payload.
///
/// # Defaults
/// * `order_date`: "2026-01-15"
/// * `customer_email`: `"test@example.com"`
/// * `total_amount`: 100.0
/// * `status`: "pending"
pub async fn create_test_order(
    db: &DatabaseConnection,
    line_items: &str,
) -> Result<entities::order::Model> {
    use sea_orm::{ActiveModelTrait, Set};

    let order = entities::order::ActiveModel {
        order_date: Set("2026-01-15".to_string()),
        customer_email: Set("test@example.com".to_string()),
        total_amount: Set(100.0),
        status: Set("pending".to_string()),
        line_items: Set(line_items.to_string()),
        ..Default::default()
    };
    order.insert(db).await.map_err(Into::into)
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * price: 10.0
/// * `stock_level`: 100
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::product::Model> {
    crate::core::product::create_product(db, name.to_string(), 10.0, 100).await
}
