//! HTTP JSON API.
//!
//! Thin axum handlers over the service layer. Operations that need an
//! authorizing staff member read it from the `X-Staff-Id` header; a
//! missing or malformed header is rejected before any work happens.

use crate::error::{option_to_result, AppError, AppResult};
use crate::models::{Order, OrderLine, Product, Purchase, Raise, User};
use crate::repositories::order_repository::LineRequest;
use crate::repositories::ProductRepository;
use crate::services::{OrderService, PurchaseService, RaiseService, UserService};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Shared handler context
#[derive(Clone)]
pub struct ApiContext {
    pub order_service: Arc<OrderService>,
    pub raise_service: Arc<RaiseService>,
    pub purchase_service: Arc<PurchaseService>,
    pub user_service: Arc<UserService>,
    pub product_repo: Arc<ProductRepository>,
}

/// Build the application router
pub fn router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/orders", post(create_order).get(list_orders))
        .route("/api/orders/:id", get(get_order).delete(delete_order))
        .route("/api/raises", post(create_raise))
        .route("/api/purchases", post(create_purchase).get(list_purchases))
        .route("/api/products", post(create_product).get(list_products))
        .route("/api/products/:id", get(get_product).put(update_product))
        .route("/api/users", post(create_user))
        .route("/api/users/:id", get(get_user))
        .route("/api/users/:id/raises", get(list_user_raises))
        .route("/api/users/:id/guests", post(create_guest))
        .route("/api/users/:id/anonymize", post(anonymize_user))
        .with_state(ctx)
}

/// Staff identity for operations that require an authorizing staff member
fn staff_from_headers(headers: &HeaderMap) -> AppResult<Uuid> {
    let raw = headers
        .get("x-staff-id")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing X-Staff-Id header".into()))?;

    Uuid::parse_str(raw).map_err(|_| AppError::Unauthorized("Invalid X-Staff-Id header".into()))
}

async fn health() -> &'static str {
    "ok"
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub products: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub message: String,
    pub order_id: Uuid,
    pub total_cents: i64,
}

async fn create_order(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<CreateOrderResponse>)> {
    let staff_id = staff_from_headers(&headers)?;

    let lines: Vec<LineRequest> = req
        .products
        .iter()
        .map(|line| LineRequest {
            product_id: line.product_id,
            quantity: line.count,
        })
        .collect();

    let order = ctx
        .order_service
        .place_order(req.user_id, req.guest_id, &lines, staff_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            message: "Order placed".to_string(),
            order_id: order.id,
            total_cents: order.total_cents,
        }),
    ))
}

/// Day filter for day-bucketed listings; defaults to the current
/// business day
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub day: Option<chrono::NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

async fn get_order(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderWithLines>> {
    let (order, lines) = ctx.order_service.get_order(id).await?;

    Ok(Json(OrderWithLines { order, lines }))
}

async fn list_orders(
    State(ctx): State<ApiContext>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(ctx.order_service.orders_for_day(query.day).await?))
}

#[derive(Debug, Serialize)]
pub struct DeleteOrderResponse {
    pub success: bool,
    pub message: String,
}

async fn delete_order(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteOrderResponse>> {
    let staff_id = staff_from_headers(&headers)?;

    ctx.order_service.delete_order(id, staff_id).await?;

    Ok(Json(DeleteOrderResponse {
        success: true,
        message: "Order deleted and effects reversed".to_string(),
    }))
}

// =============================================================================
// Raises
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRaiseRequest {
    pub user_id: Uuid,
    pub amount_cents: i64,
    #[serde(default)]
    pub via_bank: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateRaiseResponse {
    pub new_balance_cents: i64,
}

async fn create_raise(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    Json(req): Json<CreateRaiseRequest>,
) -> AppResult<(StatusCode, Json<CreateRaiseResponse>)> {
    let staff_id = staff_from_headers(&headers)?;

    let (_raise, new_balance) = ctx
        .raise_service
        .create_raise(req.user_id, req.amount_cents, staff_id, req.via_bank)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRaiseResponse {
            new_balance_cents: new_balance,
        }),
    ))
}

// =============================================================================
// Purchases (restocking)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

async fn create_purchase(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    Json(req): Json<CreatePurchaseRequest>,
) -> AppResult<(StatusCode, Json<Purchase>)> {
    let staff_id = staff_from_headers(&headers)?;

    let purchase = ctx
        .purchase_service
        .record_purchase(req.product_id, req.quantity, req.unit_price_cents, staff_id)
        .await?;

    Ok((StatusCode::CREATED, Json(purchase)))
}

async fn list_purchases(
    State(ctx): State<ApiContext>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Vec<Purchase>>> {
    Ok(Json(
        ctx.purchase_service.purchases_for_day(query.day).await?,
    ))
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i64,
}

async fn create_product(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<Product>)> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Product name must not be empty".into()));
    }
    if req.price_cents < 0 {
        return Err(AppError::Validation("Price must not be negative".into()));
    }
    if req.stock < 0 {
        return Err(AppError::Validation("Stock must not be negative".into()));
    }

    let product = ctx
        .product_repo
        .create(req.name.trim(), &req.category, req.price_cents, req.stock)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

async fn list_products(State(ctx): State<ApiContext>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(ctx.product_repo.list_ranked().await?))
}

async fn get_product(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let product = option_to_result(
        ctx.product_repo.find_by_id(id).await?,
        "Product not found",
    )?;

    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i64,
    pub active: bool,
}

async fn update_product(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> AppResult<Json<Product>> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Product name must not be empty".into()));
    }
    if req.price_cents < 0 {
        return Err(AppError::Validation("Price must not be negative".into()));
    }
    if req.stock < 0 {
        return Err(AppError::Validation("Stock must not be negative".into()));
    }

    let product = option_to_result(
        ctx.product_repo
            .update(
                id,
                req.name.trim(),
                &req.category,
                req.price_cents,
                req.stock,
                req.active,
            )
            .await?,
        "Product not found",
    )?;

    Ok(Json(product))
}

// =============================================================================
// Users & guests
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub opening_balance_cents: i64,
}

async fn create_user(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = ctx
        .user_service
        .create_user(&req.name, req.opening_balance_cents)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(State(ctx): State<ApiContext>, Path(id): Path<Uuid>) -> AppResult<Json<User>> {
    Ok(Json(ctx.user_service.get_user(id).await?))
}

async fn list_user_raises(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Raise>>> {
    Ok(Json(ctx.raise_service.raises_for_user(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateGuestRequest {
    pub name: String,
}

async fn create_guest(
    State(ctx): State<ApiContext>,
    Path(host_id): Path<Uuid>,
    Json(req): Json<CreateGuestRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let guest = ctx.user_service.create_guest(host_id, &req.name).await?;

    Ok((StatusCode::CREATED, Json(guest)))
}

async fn anonymize_user(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let staff_id = staff_from_headers(&headers)?;

    Ok(Json(ctx.user_service.anonymize_user(id, staff_id).await?))
}
