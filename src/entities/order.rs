//! Order entity - Represents one customer order and its line items.
//!
//! `line_items` is stored as a JSON array of `{product_id, quantity,
//! [name], [price]}` objects, exactly as it arrives in order CSV uploads.
//! Line items are owned exclusively by their parent order and are never
//! shared between orders. Orders move from `"pending"` to `"completed"`
//! when processed against stock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub order_id: i64,
    /// When the order was placed (as supplied by the source system)
    pub order_date: String,
    /// Email address of the ordering customer
    pub customer_email: String,
    /// Total order value in dollars
    pub total_amount: f64,
    /// Order status: `"pending"` or `"completed"`
    pub status: String,
    /// JSON-encoded array of line items
    pub line_items: String,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
