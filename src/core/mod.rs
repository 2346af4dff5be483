//! Core business logic - framework-agnostic inventory, order, and import
//! operations. Everything here takes a `DatabaseConnection` and returns
//! structured data; the web layer is responsible for presentation.

/// CSV import of inventory and order snapshots
pub mod ingest;
/// Order management and order processing
pub mod order;
/// Product management and stock adjustments
pub mod product;
