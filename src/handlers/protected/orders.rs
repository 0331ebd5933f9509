// handlers/protected/orders.rs - /api/orders and /api/orders/:id
use axum::extract::{Path, Query, State};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::api::{filter, paginate, PageRequest, ValidJson, Validator};
use crate::error::{ApiError, ErrorCode};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Order, OrderStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: Option<u64>,
    pub items: Option<Vec<String>>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
    pub status: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::not_found_with("Order not found", ErrorCode::OrderNotFound)
}

fn order_id(raw: &str) -> Result<u64, ApiError> {
    filter::path_id(raw, "Invalid order ID", ErrorCode::InvalidOrderId)
}

fn parse_status(raw: Option<&str>) -> Result<Option<OrderStatus>, ApiError> {
    filter::enum_param("status", raw, ErrorCode::InvalidStatus)
}

/// Items must be present and every entry non-blank
pub fn validate_items(items: Option<Vec<String>>) -> Result<Vec<String>, ApiError> {
    match items {
        Some(items) if !items.is_empty() && items.iter().all(|i| !i.trim().is_empty()) => Ok(items),
        _ => Err(ApiError::invalid_field(
            "items",
            "Items array is required and must not be empty",
        )),
    }
}

pub fn validate_amount(amount: Option<Decimal>) -> Result<Decimal, ApiError> {
    match amount {
        Some(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(ApiError::bad_request(
            "Valid totalAmount is required",
            ErrorCode::InvalidAmount,
        )),
    }
}

/// GET /api/orders - list orders filtered by status and userId
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Vec<Order>> {
    let page = PageRequest::from_params(query.page.as_deref(), query.limit.as_deref(), &state.config.pagination);
    let status = parse_status(query.status.as_deref())?;
    let user_id = filter::id_param("userId", query.user_id.as_deref(), ErrorCode::InvalidUserId)?;

    let orders: Vec<Order> = state
        .orders
        .all()
        .await?
        .into_iter()
        .filter(|o| status.map_or(true, |s| o.status == s))
        .filter(|o| user_id.map_or(true, |id| o.user_id == id))
        .collect();

    Ok(ApiResponse::page(paginate(orders, page)).message("Orders retrieved successfully"))
}

/// POST /api/orders - place an order
pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<OrderRequest>,
) -> ApiResult<Order> {
    let mut v = Validator::new();
    let user_id = v.require("userId", body.user_id, "userId is required");
    let Some(user_id) = user_id else {
        return Err(v.into_error());
    };
    let items = validate_items(body.items)?;
    let total_amount = validate_amount(body.total_amount)?;
    let status = parse_status(body.status.as_deref())?.unwrap_or(OrderStatus::Pending);

    let now = Utc::now();
    let id = state.orders.next_id();
    let mut order = Order {
        id,
        user_id,
        order_number: Order::number_for(id),
        total_amount,
        status: OrderStatus::Pending,
        items,
        order_date: now,
        delivered_date: None,
    };
    order.set_status(status, now);
    let order = state.orders.insert(order).await?;

    info!("Created order {} for user {}", order.order_number, order.user_id);
    Ok(ApiResponse::created(order).message("Order created successfully"))
}

/// GET /api/orders/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Order> {
    let id = order_id(&id)?;
    let order = state.orders.find(&id.to_string()).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(order).message("Order retrieved successfully"))
}

/// PUT /api/orders/:id - replace userId, items, totalAmount and status
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<OrderRequest>,
) -> ApiResult<Order> {
    let id = order_id(&id)?;
    let mut order = state.orders.find(&id.to_string()).await?.ok_or_else(not_found)?;

    let mut v = Validator::new();
    let user_id = v.require("userId", body.user_id, "userId is required");
    let status = v.require_text("status", &body.status, "status is required");
    let (Some(user_id), Some(status)) = (user_id, status) else {
        return Err(v.into_error());
    };
    let items = validate_items(body.items)?;
    let total_amount = validate_amount(body.total_amount)?;
    let status = parse_status(Some(status))?.unwrap_or(order.status);

    order.user_id = user_id;
    order.items = items;
    order.total_amount = total_amount;
    order.set_status(status, Utc::now());

    let order = state.orders.replace(order).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(order).message("Order updated successfully"))
}

/// PATCH /api/orders/:id - update only the supplied fields
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<OrderRequest>,
) -> ApiResult<Order> {
    let id = order_id(&id)?;
    let mut order = state.orders.find(&id.to_string()).await?.ok_or_else(not_found)?;

    if let Some(user_id) = body.user_id {
        order.user_id = user_id;
    }
    if body.items.is_some() {
        order.items = validate_items(body.items)?;
    }
    if body.total_amount.is_some() {
        order.total_amount = validate_amount(body.total_amount)?;
    }
    if let Some(status) = parse_status(body.status.as_deref())? {
        order.set_status(status, Utc::now());
    }

    let order = state.orders.replace(order).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(order).message("Order updated successfully"))
}

/// DELETE /api/orders/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Order> {
    let id = order_id(&id)?;
    let order = state.orders.remove(&id.to_string()).await?.ok_or_else(not_found)?;
    info!("Deleted order {}", order.order_number);
    Ok(ApiResponse::success(order).message("Order deleted successfully"))
}
