//! Order business logic - creation, line items, and order processing.
//!
//! Line items are stored on the order row as a JSON array and decoded into
//! [`LineItem`] records on access. Processing pending orders deducts stock
//! per line item and marks each order completed; a line item whose product
//! does not exist synthesizes one from the item's optional name and price,
//! with the deducted quantity driving its stock negative from the start.

use crate::{
    entities::{Order, order},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One (product, quantity) entry within an order's contents.
///
/// `name` and `price` are only present when the source system includes them
/// for products it knows may not exist yet on the receiving side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product the item refers to
    pub product_id: i64,
    /// Units ordered
    pub quantity: i64,
    /// Product name, if supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unit price, if supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Decodes a JSON line-items payload into structured records.
///
/// # Errors
/// Returns an error if the payload is not a JSON array of line items or an
/// item is missing a required field.
pub fn parse_line_items(payload: &str) -> Result<Vec<LineItem>> {
    serde_json::from_str(payload).map_err(Into::into)
}

/// Outcome of a `process_pending` run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessReport {
    /// Orders marked completed
    pub processed: usize,
    /// Per-order notices for orders that could not be processed
    pub skipped: Vec<String>,
}

/// Retrieves all orders, ordered by order id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_orders(db: &DatabaseConnection) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_asc(order::Column::OrderId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific order by its unique id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Creates a new order with the given line items, serialized to JSON.
///
/// # Errors
/// Returns an error if validation or the database insert fails.
pub async fn create_order(
    db: &DatabaseConnection,
    order_date: String,
    customer_email: String,
    total_amount: f64,
    status: String,
    line_items: &[LineItem],
) -> Result<order::Model> {
    if customer_email.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Customer email cannot be empty".to_string(),
        });
    }
    if !total_amount.is_finite() || total_amount < 0.0 {
        return Err(Error::InvalidAmount {
            amount: total_amount,
        });
    }

    let order = order::ActiveModel {
        order_date: Set(order_date),
        customer_email: Set(customer_email),
        total_amount: Set(total_amount),
        status: Set(status),
        line_items: Set(serde_json::to_string(line_items)?),
        ..Default::default()
    };
    order.insert(db).await.map_err(Into::into)
}

/// Inserts an order with an explicit id and raw line-items payload.
///
/// Used by CSV import, which carries its own order ids and has already
/// validated the payload.
///
/// # Errors
/// Returns an error if the database insert fails.
pub async fn insert_imported_order(
    db: &DatabaseConnection,
    order_id: i64,
    order_date: String,
    customer_email: String,
    total_amount: f64,
    status: String,
    line_items: String,
) -> Result<order::Model> {
    let order = order::ActiveModel {
        order_id: Set(order_id),
        order_date: Set(order_date),
        customer_email: Set(customer_email),
        total_amount: Set(total_amount),
        status: Set(status),
        line_items: Set(line_items),
    };
    order.insert(db).await.map_err(Into::into)
}

/// Updates an existing order's details and line items.
///
/// # Errors
/// Returns an error if the order does not exist or the update fails.
pub async fn update_order(
    db: &DatabaseConnection,
    order_id: i64,
    order_date: String,
    customer_email: String,
    total_amount: f64,
    status: String,
    line_items: &[LineItem],
) -> Result<order::Model> {
    let mut order: order::ActiveModel = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })?
        .into();

    order.order_date = Set(order_date);
    order.customer_email = Set(customer_email);
    order.total_amount = Set(total_amount);
    order.status = Set(status);
    order.line_items = Set(serde_json::to_string(line_items)?);

    order.update(db).await.map_err(Into::into)
}

/// Removes a single order.
///
/// # Errors
/// Returns an error if the order does not exist or the delete fails.
pub async fn remove_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let order = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })?;

    Order::delete_by_id(order_id).exec(db).await?;
    Ok(order)
}

/// Deletes all orders. Returns the number removed.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn clear_all(db: &DatabaseConnection) -> Result<u64> {
    let res = Order::delete_many().exec(db).await?;
    Ok(res.rows_affected)
}

/// Deletes every order whose line items reference the given product.
///
/// Orders whose line-items payload does not decode are left in place.
///
/// # Errors
/// Returns an error if a query or delete fails.
pub async fn remove_orders_referencing(db: &DatabaseConnection, product_id: i64) -> Result<u64> {
    let mut removed = 0u64;
    for order in get_all_orders(db).await? {
        let Ok(items) = parse_line_items(&order.line_items) else {
            warn!(order_id = order.order_id, "Undecodable line items, leaving order in place");
            continue;
        };
        if items.iter().any(|item| item.product_id == product_id) {
            Order::delete_by_id(order.order_id).exec(db).await?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Processes every order not yet completed.
///
/// For each pending order: decode the line items (a malformed payload skips
/// the order with a notice), deduct each item's quantity from its product's
/// stock, synthesizing the product from the line item when it does not exist,
/// then mark the order completed. Stock levels may go negative.
///
/// # Errors
/// Returns an error if a database operation fails; per-order data problems
/// are reported in the returned [`ProcessReport`], not as errors.
pub async fn process_pending(db: &DatabaseConnection) -> Result<ProcessReport> {
    let pending = Order::find()
        .filter(order::Column::Status.ne("completed"))
        .order_by_asc(order::Column::OrderId)
        .all(db)
        .await?;

    let mut report = ProcessReport::default();

    for order in pending {
        let items = match parse_line_items(&order.line_items) {
            Ok(items) => items,
            Err(e) => {
                warn!(order_id = order.order_id, error = %e, "Skipping order with malformed line items");
                report
                    .skipped
                    .push(format!("Invalid line items in order {}", order.order_id));
                continue;
            }
        };

        for item in &items {
            match crate::core::product::get_product_by_id(db, item.product_id).await? {
                Some(_) => {
                    crate::core::product::adjust_stock(db, item.product_id, -item.quantity)
                        .await?;
                }
                None => {
                    synthesize_product(db, item).await?;
                }
            }
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set("completed".to_string());
        active.update(db).await?;
        report.processed += 1;
    }

    Ok(report)
}

/// Creates a product record for a line item whose product id is dangling.
/// The new product starts at `-quantity` stock, mirroring the deduction.
async fn synthesize_product(db: &DatabaseConnection, item: &LineItem) -> Result<()> {
    use crate::entities::product;

    let name = item
        .name
        .clone()
        .unwrap_or_else(|| format!("Unknown product {}", item.product_id));
    let row = product::ActiveModel {
        product_id: Set(item.product_id),
        name: Set(name),
        price: Set(item.price.unwrap_or(0.0)),
        stock_level: Set(-item.quantity),
    };
    row.insert(db).await?;
    Ok(())
}
