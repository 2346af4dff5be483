//! Product entity - Represents one stocked item in the inventory.
//!
//! Products are mutated by direct edits, by bulk CSV replacement, and by
//! stock deduction during order processing. `stock_level` is a signed
//! integer on purpose: processing an order against insufficient stock
//! drives it negative rather than failing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub product_id: i64,
    /// Product name, unique across the inventory
    #[sea_orm(unique)]
    pub name: String,
    /// Unit price in dollars
    pub price: f64,
    /// Units on hand; may go negative during order processing
    pub stock_level: i64,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
