//! Order handlers: listing, add, edit, remove, clear, and processing.

use super::AppState;
use crate::core::order::{LineItem, ProcessReport};
use crate::entities::order;
use crate::errors::Result;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

/// An order as presented to the operator, line items decoded where possible.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order_id: i64,
    pub order_date: String,
    pub customer_email: String,
    pub total_amount: f64,
    pub status: String,
    /// Decoded line items; None when the stored payload is malformed
    pub line_items: Option<Vec<LineItem>>,
}

impl From<order::Model> for OrderView {
    fn from(model: order::Model) -> Self {
        let line_items = crate::core::order::parse_line_items(&model.line_items).ok();
        Self {
            order_id: model.order_id,
            order_date: model.order_date,
            customer_email: model.customer_email,
            total_amount: model.total_amount,
            status: model.status,
            line_items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Defaults to today's date when omitted
    #[serde(default = "default_order_date")]
    pub order_date: String,
    pub customer_email: String,
    pub total_amount: f64,
    #[serde(default = "default_status")]
    pub status: String,
    pub line_items: Vec<LineItem>,
}

fn default_order_date() -> String {
    chrono::Utc::now().date_naive().to_string()
}

fn default_status() -> String {
    "pending".to_string()
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub order_date: String,
    pub customer_email: String,
    pub total_amount: f64,
    pub status: String,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OrderView>>> {
    let orders = crate::core::order::get_all_orders(&state.db).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<OrderView>> {
    let order = crate::core::order::create_order(
        &state.db,
        req.order_date,
        req.customer_email,
        req.total_amount,
        req.status,
        &req.line_items,
    )
    .await?;
    Ok(Json(order.into()))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderView>> {
    let order = crate::core::order::update_order(
        &state.db,
        order_id,
        req.order_date,
        req.customer_email,
        req.total_amount,
        req.status,
        &req.line_items,
    )
    .await?;
    Ok(Json(order.into()))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let order = crate::core::order::remove_order(&state.db, order_id).await?;
    Ok(Json(MessageResponse {
        message: format!("Order {} removed", order.order_id),
    }))
}

pub async fn clear_orders(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    let removed = crate::core::order::clear_all(&state.db).await?;
    Ok(Json(MessageResponse {
        message: format!("Cleared {removed} orders"),
    }))
}

pub async fn process_orders(State(state): State<AppState>) -> Result<Json<ProcessReport>> {
    let report = crate::core::order::process_pending(&state.db).await?;
    Ok(Json(report))
}
