//! Product business logic - Handles all product-related operations.
//!
//! This module provides functions for creating, retrieving, updating, and
//! removing products in the inventory. All functions are async, take a
//! `DatabaseConnection`, and return Result types for proper error handling
//! throughout the system. Removing a product cascades to every order whose
//! line items reference it.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Retrieves all products, ordered by product id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::ProductId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a product by its (unique) name, returning None if absent.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_name_and_price(name: &str, price: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if price < 0.0 || !price.is_finite() {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(())
}

/// Creates a new product, performing input validation.
///
/// The name is trimmed and must be unique; the price must be finite and
/// non-negative. The initial stock level may be any signed value.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - A product with the same name already exists
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    name: String,
    price: f64,
    stock_level: i64,
) -> Result<product::Model> {
    validate_name_and_price(&name, price)?;

    let name = name.trim().to_string();
    if get_product_by_name(db, &name).await?.is_some() {
        return Err(Error::DuplicateProduct { name });
    }

    let product = product::ActiveModel {
        name: Set(name),
        price: Set(price),
        stock_level: Set(stock_level),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Updates an existing product's name, price, and stock level.
///
/// # Errors
/// Returns an error if:
/// - The new name is empty or the new price is invalid
/// - The product does not exist
/// - The database update operation fails
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    new_name: String,
    new_price: f64,
    new_stock_level: i64,
) -> Result<product::Model> {
    validate_name_and_price(&new_name, new_price)?;

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })?
        .into();

    product.name = Set(new_name.trim().to_string());
    product.price = Set(new_price);
    product.stock_level = Set(new_stock_level);

    product.update(db).await.map_err(Into::into)
}

/// Adjusts a product's stock level by a signed delta.
///
/// Deductions during order processing go through here; the stock level is
/// allowed to go negative.
///
/// # Errors
/// Returns an error if the product does not exist or the update fails.
pub async fn adjust_stock(
    db: &DatabaseConnection,
    product_id: i64,
    delta: i64,
) -> Result<product::Model> {
    let current = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })?;

    let new_level = current.stock_level + delta;
    let mut active: product::ActiveModel = current.into();
    active.stock_level = Set(new_level);
    active.update(db).await.map_err(Into::into)
}

/// Removes a product and every order whose line items reference it.
///
/// Returns the deleted product. Orders with undecodable line items are left
/// in place; they cannot be inspected for a reference.
///
/// # Errors
/// Returns an error if the product does not exist or a delete fails.
pub async fn remove_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })?;

    Product::delete_by_id(product_id).exec(db).await?;
    crate::core::order::remove_orders_referencing(db, product_id).await?;

    Ok(product)
}

/// Replaces the entire inventory with the given set of products.
///
/// Used by bulk CSV upload: all existing products are deleted, then the new
/// rows are inserted, inside one transaction.
///
/// # Errors
/// Returns an error if the transaction or any statement fails.
pub async fn replace_all(
    db: &DatabaseConnection,
    products: Vec<(i64, String, f64, i64)>,
) -> Result<usize> {
    let count = products.len();
    let txn = db.begin().await?;

    Product::delete_many().exec(&txn).await?;
    for (product_id, name, price, stock_level) in products {
        let row = product::ActiveModel {
            product_id: Set(product_id),
            name: Set(name),
            price: Set(price),
            stock_level: Set(stock_level),
        };
        row.insert(&txn).await?;
    }

    txn.commit().await?;
    Ok(count)
}
