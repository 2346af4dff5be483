//! Product handlers: listing with stock status, add, edit, remove.

use super::AppState;
use crate::entities::product;
use crate::errors::Result;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

/// A product as presented to the operator, with a color-coding hint.
#[derive(Debug, Serialize)]
pub struct ProductView {
    /// Product id
    pub product_id: i64,
    /// Product name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Units on hand
    pub stock_level: i64,
    /// "out" (none left), "low" (< 100), or "ok"
    pub stock_status: &'static str,
}

fn stock_status(stock_level: i64) -> &'static str {
    if stock_level <= 0 {
        "out"
    } else if stock_level < 100 {
        "low"
    } else {
        "ok"
    }
}

impl From<product::Model> for ProductView {
    fn from(model: product::Model) -> Self {
        Self {
            product_id: model.product_id,
            name: model.name,
            price: model.price,
            stock_status: stock_status(model.stock_level),
            stock_level: model.stock_level,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: f64,
    pub stock_level: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    pub price: f64,
    pub stock_level: i64,
}

#[derive(Debug, Serialize)]
pub struct RemovedProductResponse {
    pub message: String,
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let products = crate::core::product::get_all_products(&state.db).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<ProductView>> {
    let product =
        crate::core::product::create_product(&state.db, req.name, req.price, req.stock_level)
            .await?;
    Ok(Json(product.into()))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductView>> {
    let product = crate::core::product::update_product(
        &state.db,
        product_id,
        req.name,
        req.price,
        req.stock_level,
    )
    .await?;
    Ok(Json(product.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<RemovedProductResponse>> {
    let product = crate::core::product::remove_product(&state.db, product_id).await?;
    Ok(Json(RemovedProductResponse {
        message: format!("Product '{}' and related orders removed", product.name),
    }))
}
