//! Database connection and schema management.
//!
//! This module handles `SQLite` connection setup and table creation using
//! `SeaORM`. Tables are generated from the entity definitions via
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust struct definitions without hand-written SQL.

use crate::entities::{Order, Product};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at the given URL.
///
/// # Errors
/// Returns an error if the connection cannot be opened.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
///
/// Intended to run once at startup; table creation is skipped when the
/// tables already exist.
///
/// # Errors
/// Returns an error if a DDL statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let product_table = schema
        .create_table_from_entity(Product)
        .if_not_exists()
        .to_owned();
    let order_table = schema
        .create_table_from_entity(Order)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&order_table)).await?;

    Ok(())
}
