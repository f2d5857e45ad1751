//! # API Request Handlers
//!
//! This module contains the handler functions for each API endpoint.
//! Each handler:
//! 1. Extracts request data
//! 2. Calls the appropriate service
//! 3. Pushes WebSocket events for what changed
//! 4. Returns a formatted response
//!
//! ## Error Handling
//!
//! Service errors are mapped to stable codes:
//!
//! | Code | HTTP | Raised by |
//! |------|------|-----------|
//! | `INVALID_AMOUNT` | 400 | non-positive or overflowing amounts |
//! | `INSUFFICIENT_BALANCE` | 400 | deposit recharge above balance |
//! | `INSUFFICIENT_UNFREEZABLE` | 400 | unfreeze above settled earnings |
//! | `EXCEEDS_PAYABLE` | 400 | payout above min(owed, balance) |
//! | `INVALID_TRANSITION` | 400 | order not in the required status |
//! | `ACCOUNT_FROZEN` | 400 | frozen boss or hitter |
//! | `SELF_DEALING` | 400 | hitter accepting own order |
//! | `BOUNTY_FULL` / `BOUNTY_ENDED` | 400 | sign-up rejected |
//! | `VALIDATION_FAILED` | 400 | empty or out-of-range form fields |
//! | `FORBIDDEN` | 403 | admin-only operation |
//! | `NOT_FOUND` | 404 | unknown id |
//!
//! ```json
//! {
//!     "success": false,
//!     "error": {
//!         "code": "BOUNTY_FULL",
//!         "message": "Bounty B3 is full"
//!     }
//! }
//! ```

use std::fmt::Display;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use crate::models::{
    AcceptOrderRequest, AdSlotUpdate, AmountRequest, ApiResponse, ComplaintStatusUpdate, CreateBountyRequest,
    DeductionRequest, DescribeRequest, DescriptionResponse, FundOperationResponse, HealthResponse, LedgerHistoryResponse,
    LedgerQuery, NewAnnouncement, NewComplaint, NewProduct, NewTeam, OrderHallQuery, OrderListQuery, PlaceOrderRequest,
    ProductQuery, RechargePresetsResponse, UserProfileUpdate,
};
use crate::services::{BountyError, CatalogError, LedgerError, OrderError, RECHARGE_PRESETS};
use crate::store::{Bounty, Order, PlatformSettings, StoreError};
use crate::utils::format_yuan;
use crate::websocket::{
    broadcast, send_to_user, BalanceUpdateData, BountyUpdateData, NegativeBalanceData, OrderStatusData, WsEventType,
};
use crate::AppState;

// ==========================================
// ERROR MAPPING
// ==========================================

/// Stable API code and HTTP status of a service error.
trait ApiErrorCode: Display {
    fn code(&self) -> &'static str;

    fn status(&self) -> StatusCode {
        if self.code() == "NOT_FOUND" {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl ApiErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "NOT_FOUND",
        }
    }
}

impl ApiErrorCode for LedgerError {
    fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount(_) | LedgerError::Overflow => "INVALID_AMOUNT",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::InsufficientUnfreezable { .. } => "INSUFFICIENT_UNFREEZABLE",
            LedgerError::ExceedsPayable { .. } => "EXCEEDS_PAYABLE",
            LedgerError::NotAdmin(_) => "FORBIDDEN",
            LedgerError::Store(e) => e.code(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            LedgerError::NotAdmin(_) => StatusCode::FORBIDDEN,
            LedgerError::Store(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl ApiErrorCode for OrderError {
    fn code(&self) -> &'static str {
        match self {
            OrderError::InvalidTransition { .. } => "INVALID_TRANSITION",
            OrderError::AccountFrozen(_) => "ACCOUNT_FROZEN",
            OrderError::SelfDealing(_) => "SELF_DEALING",
            OrderError::InvalidInput(_) => "VALIDATION_FAILED",
            OrderError::Overflow(_) => "INVALID_AMOUNT",
            OrderError::Store(e) => e.code(),
        }
    }
}

impl ApiErrorCode for BountyError {
    fn code(&self) -> &'static str {
        match self {
            BountyError::Full(_) => "BOUNTY_FULL",
            BountyError::Ended(_) => "BOUNTY_ENDED",
            BountyError::InvalidInput(_) => "VALIDATION_FAILED",
            BountyError::Store(e) => e.code(),
        }
    }
}

impl ApiErrorCode for CatalogError {
    fn code(&self) -> &'static str {
        match self {
            CatalogError::Validation(_) => "VALIDATION_FAILED",
            CatalogError::Store(e) => e.code(),
        }
    }
}

fn error_response<E: ApiErrorCode>(operation: &str, e: &E) -> HttpResponse {
    if e.status() == StatusCode::NOT_FOUND {
        warn!("{} failed: {}", operation, e);
    } else {
        error!("{} failed: {}", operation, e);
    }
    HttpResponse::build(e.status()).json(ApiResponse::<()>::error(e.code(), &e.to_string()))
}

fn respond<T: serde::Serialize, E: ApiErrorCode>(operation: &str, result: Result<T, E>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data)),
        Err(e) => error_response(operation, &e),
    }
}

// ==========================================
// INFO & HEALTH
// ==========================================

/// API information endpoint (root).
///
/// ## Endpoint
///
/// `GET /`
pub async fn api_info() -> HttpResponse {
    let info = json!({
        "name": "Club Platform API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Orders, fund ledger and bounty board for the club platform",
        "endpoints": {
            "health": "GET /health",
            "products": "GET /products?category=",
            "orders": {
                "hall": "GET /orders/hall?platform=",
                "list": "GET /orders?status=&hitterId=",
                "place": "POST /orders",
                "detail": "GET /orders/{id}",
                "pay": "POST /orders/{id}/pay",
                "accept": "POST /orders/{id}/accept",
                "settle": "POST /orders/{id}/settle",
                "complete": "POST /orders/{id}/complete",
                "afterSales": "POST /orders/{id}/after-sales"
            },
            "users": {
                "get": "GET /users/{id}",
                "ledger": "GET /users/{id}/ledger",
                "rechargeBalance": "POST /users/{id}/recharge-balance",
                "rechargeDeposit": "POST /users/{id}/recharge-deposit",
                "unfreeze": "POST /users/{id}/unfreeze",
                "payout": "POST /users/{id}/payout",
                "presets": "GET /ledger/presets"
            },
            "bounties": {
                "list": "GET /bounties",
                "create": "POST /bounties",
                "signUp": "POST /bounties/{id}/sign-up",
                "close": "POST /bounties/{id}/close",
                "describe": "POST /bounties/describe"
            },
            "admin": "/admin/{products,users,teams,complaints,announcements,ad-slots,settings}",
            "websocket": "GET /ws/{user}"
        }
    });

    HttpResponse::Ok().json(ApiResponse::success(info))
}

/// Health check endpoint.
///
/// ## Endpoint
///
/// `GET /health`
pub async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let (users, orders) = {
        let data = state.store.read().await;
        (data.users.len(), data.orders.len())
    };

    let response = HealthResponse {
        status: "healthy".to_string(),
        users,
        orders,
        ws_connections: state.ws_registry.total_connections().await,
        description_ai: state.bounty_board.description_ai_configured(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    HttpResponse::Ok().json(ApiResponse::success(response))
}

// ==========================================
// PRODUCTS
// ==========================================

/// Browse products.
///
/// ## Endpoint
///
/// `GET /products?category=技能陪练`
///
/// `category=全部` or no category lists everything.
pub async fn list_products(
    state: web::Data<Arc<AppState>>,
    query: web::Query<ProductQuery>,
) -> HttpResponse {
    let products = state.catalog.products(query.category.as_deref()).await;
    HttpResponse::Ok().json(ApiResponse::success(products))
}

/// `GET /admin/products/:id`
pub async fn get_product(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    respond("Get product", state.catalog.product(&path).await)
}

/// `POST /admin/products`
pub async fn create_product(
    state: web::Data<Arc<AppState>>,
    body: web::Json<NewProduct>,
) -> HttpResponse {
    respond("Create product", state.catalog.create_product(body.into_inner()).await)
}

/// `PUT /admin/products/:id`
pub async fn replace_product(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<NewProduct>,
) -> HttpResponse {
    respond(
        "Replace product",
        state.catalog.replace_product(&path, body.into_inner()).await,
    )
}

/// `DELETE /admin/products/:id`
pub async fn delete_product(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    respond("Delete product", state.catalog.delete_product(&path).await)
}

// ==========================================
// ORDERS
// ==========================================

/// Tell both sides of an order about its new status, and refresh the
/// hitter's balances when `hitter_funds_moved`.
async fn notify_order(state: &Arc<AppState>, order: &Order, hitter_funds_moved: bool) {
    let data = OrderStatusData::from(order);

    if let Err(e) = send_to_user(state, &order.user_id, WsEventType::OrderStatusChanged, &data).await {
        warn!("Failed to send order update via WebSocket: {}", e);
    }

    let Some(hitter_id) = order.hitter_id.as_deref() else {
        return;
    };
    if let Err(e) = send_to_user(state, hitter_id, WsEventType::OrderStatusChanged, &data).await {
        warn!("Failed to send order update via WebSocket: {}", e);
    }

    if hitter_funds_moved {
        match state.fund_ledger.account(hitter_id).await {
            Ok(account) => {
                let update = BalanceUpdateData::from(&account.user);
                if let Err(e) = send_to_user(state, hitter_id, WsEventType::BalanceUpdate, update).await {
                    warn!("Failed to send balance update via WebSocket: {}", e);
                }
            }
            Err(e) => warn!("Failed to fetch hitter for WebSocket notification: {}", e),
        }
    }
}

async fn order_transition(
    state: &Arc<AppState>,
    operation: &str,
    result: Result<Order, OrderError>,
    hitter_funds_moved: bool,
) -> HttpResponse {
    match result {
        Ok(order) => {
            notify_order(state, &order, hitter_funds_moved).await;
            HttpResponse::Ok().json(ApiResponse::success(order))
        }
        Err(e) => error_response(operation, &e),
    }
}

/// Order hall: orders waiting for a hitter.
///
/// ## Endpoint
///
/// `GET /orders/hall?platform=mobile`
pub async fn order_hall(
    state: web::Data<Arc<AppState>>,
    query: web::Query<OrderHallQuery>,
) -> HttpResponse {
    let orders = state.order_manager.order_hall(query.platform).await;
    HttpResponse::Ok().json(ApiResponse::success(orders))
}

/// Order listing.
///
/// ## Endpoint
///
/// `GET /orders?status=inProgress&hitterId=U2`
///
/// Both filters are optional. With only `hitterId` this is the hitter's
/// accepted-orders list.
pub async fn list_orders(
    state: web::Data<Arc<AppState>>,
    query: web::Query<OrderListQuery>,
) -> HttpResponse {
    let orders = state
        .order_manager
        .list(query.status, query.hitter_id.as_deref())
        .await;
    HttpResponse::Ok().json(ApiResponse::success(orders))
}

/// Place an order.
///
/// ## Endpoint
///
/// `POST /orders`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/orders \
///   -H "Content-Type: application/json" \
///   -d '{
///     "productId": "P1",
///     "userId": "U1",
///     "gameId": "player-8888",
///     "server": "微信区"
///   }'
/// ```
///
/// The order starts in `pendingPayment` with `amount` equal to the
/// product price.
pub async fn place_order(
    state: web::Data<Arc<AppState>>,
    body: web::Json<PlaceOrderRequest>,
) -> HttpResponse {
    info!("Place order: {} by {}", body.product_id, body.user_id);

    let result = state.order_manager.place_order(body.into_inner()).await;
    order_transition(&state, "Place order", result, false).await
}

/// Order detail with the hitter's earnings.
///
/// ## Endpoint
///
/// `GET /orders/:id`
pub async fn get_order(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    respond("Get order", state.order_manager.detail(&path).await)
}

/// `POST /orders/:id/pay`
pub async fn pay_order(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let result = state.order_manager.pay_order(&path).await;
    order_transition(&state, "Pay order", result, false).await
}

/// Accept an order from the hall.
///
/// ## Endpoint
///
/// `POST /orders/:id/accept`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/orders/O3/accept \
///   -H "Content-Type: application/json" \
///   -d '{ "hitterId": "U2" }'
/// ```
///
/// **Response:**
/// ```json
/// {
///     "success": true,
///     "data": {
///         "id": "O3",
///         "status": "inProgress",
///         "hitterId": "U2",
///         "hitterEarnings": 1900,
///         "acceptTime": "2024-01-15T12:00:00Z",
///         ...
///     }
/// }
/// ```
pub async fn accept_order(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<AcceptOrderRequest>,
) -> HttpResponse {
    info!("Accept order {} by {}", path.as_str(), body.hitter_id);

    let result = state.order_manager.accept_order(&path, &body.hitter_id).await;
    order_transition(&state, "Accept order", result, true).await
}

/// `POST /orders/:id/settle`
pub async fn settle_order(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let result = state.order_manager.mark_for_settlement(&path).await;
    order_transition(&state, "Mark for settlement", result, false).await
}

/// `POST /orders/:id/complete`
pub async fn complete_order(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let result = state.order_manager.complete_settlement(&path).await;
    order_transition(&state, "Complete settlement", result, true).await
}

/// `POST /orders/:id/after-sales`
pub async fn open_after_sales(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let result = state.order_manager.open_after_sales(&path).await;
    order_transition(&state, "Open after-sales", result, false).await
}

// ==========================================
// FUND LEDGER
// ==========================================

async fn fund_operation(
    state: &Arc<AppState>,
    operation: &str,
    result: Result<FundOperationResponse, LedgerError>,
) -> HttpResponse {
    match result {
        Ok(result) => {
            let user = &result.account.user;
            if let Err(e) = send_to_user(
                state,
                &user.id,
                WsEventType::BalanceUpdate,
                BalanceUpdateData::from(user),
            )
            .await
            {
                warn!("Failed to send balance update via WebSocket: {}", e);
            }
            HttpResponse::Ok().json(ApiResponse::success(result))
        }
        Err(e) => error_response(operation, &e),
    }
}

/// Get a user's account.
///
/// ## Endpoint
///
/// `GET /users/:id`
///
/// ## Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "id": "U2",
///         "balance": 12000,
///         "deposit": 50000,
///         "unfreezableBalance": 8000,
///         "formattedBalance": "¥120.00",
///         ...
///     }
/// }
/// ```
pub async fn get_user(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    respond("Get user", state.fund_ledger.account(&path).await)
}

/// Journal of a user's fund operations, newest first.
///
/// ## Endpoint
///
/// `GET /users/:id/ledger?limit=20&offset=0`
pub async fn get_ledger(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    query: web::Query<LedgerQuery>,
) -> HttpResponse {
    let limit = query.limit.min(100);
    let result = state
        .fund_ledger
        .ledger_history(&path, limit, query.offset)
        .await
        .map(|entries| LedgerHistoryResponse {
            entries,
            offset: query.offset,
            limit,
        });
    respond("Ledger history", result)
}

/// Top up the spendable balance.
///
/// ## Endpoint
///
/// `POST /users/:id/recharge-balance`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/users/U1/recharge-balance \
///   -H "Content-Type: application/json" \
///   -d '{ "amount": 5000 }'
/// ```
pub async fn recharge_balance(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<AmountRequest>,
) -> HttpResponse {
    let result = state.fund_ledger.recharge_balance(&path, body.amount).await;
    fund_operation(&state, "Recharge balance", result).await
}

/// Move part of the balance into the deposit.
///
/// ## Endpoint
///
/// `POST /users/:id/recharge-deposit`
///
/// Fails with `INSUFFICIENT_BALANCE` when the balance is smaller than the
/// amount; nothing changes in that case.
pub async fn recharge_deposit(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<AmountRequest>,
) -> HttpResponse {
    let result = state.fund_ledger.recharge_deposit(&path, body.amount).await;
    fund_operation(&state, "Recharge deposit", result).await
}

/// `POST /users/:id/unfreeze`
pub async fn unfreeze(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<AmountRequest>,
) -> HttpResponse {
    let result = state.fund_ledger.unfreeze(&path, body.amount).await;
    fund_operation(&state, "Unfreeze", result).await
}

/// `POST /users/:id/payout`
pub async fn payout(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<AmountRequest>,
) -> HttpResponse {
    let result = state.fund_ledger.payout(&path, body.amount).await;
    fund_operation(&state, "Payout", result).await
}

/// `GET /ledger/presets`
pub async fn recharge_presets() -> HttpResponse {
    let response = RechargePresetsResponse {
        presets: RECHARGE_PRESETS.to_vec(),
        formatted: RECHARGE_PRESETS.iter().map(|a| format_yuan(*a)).collect(),
    };
    HttpResponse::Ok().json(ApiResponse::success(response))
}

// ==========================================
// ADMIN USERS
// ==========================================

/// `GET /admin/users`
pub async fn list_users(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(state.catalog.users().await))
}

/// `PUT /admin/users/:id`
pub async fn edit_user(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<UserProfileUpdate>,
) -> HttpResponse {
    respond("Edit user", state.catalog.edit_user(&path, body.into_inner()).await)
}

/// `POST /admin/users/:id/toggle-status`
pub async fn toggle_user_status(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    respond("Toggle user status", state.catalog.toggle_user_status(&path).await)
}

/// `DELETE /admin/users/:id`
pub async fn delete_user(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    respond("Delete user", state.catalog.delete_user(&path).await)
}

/// Deduct from a user's balance.
///
/// ## Endpoint
///
/// `POST /admin/users/:id/deduct`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/admin/users/U2/deduct \
///   -H "Content-Type: application/json" \
///   -d '{ "adminId": "U5", "amount": 3000, "reason": "超时赔付" }'
/// ```
///
/// The balance may go negative. When it does, every connected client
/// receives a `negative_balance` event.
pub async fn admin_deduct(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<DeductionRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    let result = state
        .fund_ledger
        .admin_payout_deduction(&request.admin_id, &path, request.amount, request.reason)
        .await;

    if let Ok(result) = &result {
        let user = &result.account.user;
        if user.balance < 0 {
            let alert = NegativeBalanceData {
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                balance: user.balance,
                formatted_balance: result.account.formatted_balance.clone(),
            };
            if let Err(e) = broadcast(&state, WsEventType::NegativeBalance, alert).await {
                warn!("Failed to broadcast negative balance: {}", e);
            }
        }
    }

    fund_operation(&state, "Admin deduction", result).await
}

// ==========================================
// BOUNTIES
// ==========================================

async fn bounty_change(state: &Arc<AppState>, operation: &str, result: Result<Bounty, BountyError>) -> HttpResponse {
    match result {
        Ok(bounty) => {
            if let Err(e) = broadcast(state, WsEventType::BountyUpdated, BountyUpdateData::from(&bounty)).await {
                warn!("Failed to broadcast bounty update: {}", e);
            }
            HttpResponse::Ok().json(ApiResponse::success(bounty))
        }
        Err(e) => error_response(operation, &e),
    }
}

/// `GET /bounties`
pub async fn list_bounties(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(state.bounty_board.list().await))
}

/// Post a bounty.
///
/// ## Endpoint
///
/// `POST /bounties`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/bounties \
///   -H "Content-Type: application/json" \
///   -d '{ "title": "五排缺一辅助", "reward": 5000 }'
/// ```
///
/// `maxParticipants` defaults to the configured capacity (5).
pub async fn create_bounty(
    state: web::Data<Arc<AppState>>,
    body: web::Json<CreateBountyRequest>,
) -> HttpResponse {
    let result = state.bounty_board.create_bounty(body.into_inner()).await;
    bounty_change(&state, "Create bounty", result).await
}

/// Sign up for a bounty.
///
/// ## Endpoint
///
/// `POST /bounties/:id/sign-up`
///
/// Rejected with `BOUNTY_ENDED` for a completed bounty and `BOUNTY_FULL`
/// when every place is taken.
pub async fn sign_up(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let result = state.bounty_board.sign_up(&path).await;
    bounty_change(&state, "Bounty sign-up", result).await
}

/// `POST /bounties/:id/close`
pub async fn close_bounty(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let result = state.bounty_board.close_bounty(&path).await;
    bounty_change(&state, "Close bounty", result).await
}

/// Suggest a description for a bounty title.
///
/// ## Endpoint
///
/// `POST /bounties/describe`
///
/// Always succeeds for a non-empty title; without an API key the
/// description is a fixed placeholder.
pub async fn describe_bounty(
    state: web::Data<Arc<AppState>>,
    body: web::Json<DescribeRequest>,
) -> HttpResponse {
    let result = state
        .bounty_board
        .generate_description(&body.title)
        .await
        .map(|description| DescriptionResponse { description });
    respond("Generate description", result)
}

// ==========================================
// ADMIN CATALOG
// ==========================================

/// `GET /admin/teams`
pub async fn list_teams(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(state.catalog.teams().await))
}

/// `POST /admin/teams`
pub async fn create_team(state: web::Data<Arc<AppState>>, body: web::Json<NewTeam>) -> HttpResponse {
    respond("Create team", state.catalog.create_team(body.into_inner()).await)
}

/// `PUT /admin/teams/:id`
pub async fn update_team(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<NewTeam>,
) -> HttpResponse {
    respond("Update team", state.catalog.update_team(&path, body.into_inner()).await)
}

/// `POST /admin/teams/:id/toggle-status`
pub async fn toggle_team_status(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    respond("Toggle team status", state.catalog.toggle_team_status(&path).await)
}

/// `DELETE /admin/teams/:id`
pub async fn delete_team(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    respond("Delete team", state.catalog.delete_team(&path).await)
}

pub async fn list_complaints(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(state.catalog.complaints().await))
}

pub async fn create_complaint(state: web::Data<Arc<AppState>>, body: web::Json<NewComplaint>) -> HttpResponse {
    respond("Create complaint", state.catalog.create_complaint(body.into_inner()).await)
}

/// `PUT /admin/complaints/:id/status`
pub async fn set_complaint_status(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<ComplaintStatusUpdate>,
) -> HttpResponse {
    respond(
        "Set complaint status",
        state.catalog.set_complaint_status(&path, body.status).await,
    )
}

pub async fn list_announcements(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(state.catalog.announcements().await))
}

pub async fn create_announcement(
    state: web::Data<Arc<AppState>>,
    body: web::Json<NewAnnouncement>,
) -> HttpResponse {
    respond(
        "Create announcement",
        state.catalog.create_announcement(body.into_inner()).await,
    )
}

pub async fn replace_announcement(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<NewAnnouncement>,
) -> HttpResponse {
    respond(
        "Replace announcement",
        state.catalog.replace_announcement(&path, body.into_inner()).await,
    )
}

pub async fn delete_announcement(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    respond("Delete announcement", state.catalog.delete_announcement(&path).await)
}

pub async fn list_ad_slots(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(state.catalog.ad_slots().await))
}

/// `PUT /admin/ad-slots/:id`
pub async fn update_ad_slot(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<AdSlotUpdate>,
) -> HttpResponse {
    respond("Update ad slot", state.catalog.update_ad_slot(&path, body.into_inner()).await)
}

/// `GET /admin/settings`
pub async fn get_settings(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(state.catalog.settings().await))
}

/// `PUT /admin/settings`
///
/// Replaces identities, both level tables, naming and the withdrawal fee
/// in one go.
pub async fn replace_settings(
    state: web::Data<Arc<AppState>>,
    body: web::Json<PlatformSettings>,
) -> HttpResponse {
    respond("Replace settings", state.catalog.replace_settings(body.into_inner()).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::Value;

    use crate::api::configure_routes;
    use crate::config::AppConfig;
    use crate::store::Store;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Store::seeded(), AppConfig::default()).unwrap())
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!(state());
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["users"], 5);
    }

    #[actix_web::test]
    async fn test_accept_order_flow() {
        let app = app!(state());

        let req = test::TestRequest::post()
            .uri("/orders/O3/accept")
            .set_json(json!({ "hitterId": "U2" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "inProgress");
        assert_eq!(body["data"]["hitterId"], "U2");
        assert!(body["data"]["acceptTime"].is_string());

        // Second accept is an invalid transition
        let req = test::TestRequest::post()
            .uri("/orders/O3/accept")
            .set_json(json!({ "hitterId": "U2" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
    }

    #[actix_web::test]
    async fn test_recharge_deposit_insufficient() {
        let app = app!(state());

        // U1 holds ¥500
        let req = test::TestRequest::post()
            .uri("/users/U1/recharge-deposit")
            .set_json(json!({ "amount": 60_000 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INSUFFICIENT_BALANCE");

        let req = test::TestRequest::post()
            .uri("/users/U1/recharge-deposit")
            .set_json(json!({ "amount": 5_000 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["account"]["balance"], 45_000);
        assert_eq!(body["data"]["account"]["deposit"], 5_000);
        assert_eq!(body["data"]["entry"]["kind"], "recharge_deposit");
    }

    #[actix_web::test]
    async fn test_bounty_full_and_ended_codes() {
        let app = app!(state());

        let req = test::TestRequest::post().uri("/bounties/B3/sign-up").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["error"]["code"], "BOUNTY_ENDED");

        let req = test::TestRequest::post().uri("/bounties/B2/sign-up").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["participants"], 5);

        let req = test::TestRequest::post().uri("/bounties/B2/sign-up").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["error"]["code"], "BOUNTY_FULL");
    }

    #[actix_web::test]
    async fn test_unknown_ids_are_404() {
        let app = app!(state());

        for uri in ["/users/U404", "/orders/O404"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_admin_deduction_requires_admin() {
        let app = app!(state());

        let req = test::TestRequest::post()
            .uri("/admin/users/U2/deduct")
            .set_json(json!({ "adminId": "U1", "amount": 100 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/admin/users/U2/deduct")
            .set_json(json!({ "adminId": "U5", "amount": 20_000 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["account"]["balance"], -8_000);
    }

    #[actix_web::test]
    async fn test_describe_without_key_uses_placeholder() {
        let app = app!(state());

        let req = test::TestRequest::post()
            .uri("/bounties/describe")
            .set_json(json!({ "title": "开荒团" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body["data"]["description"],
            crate::services::description_generator::PLACEHOLDER_NO_KEY
        );
    }

    #[actix_web::test]
    async fn test_products_category_filter() {
        let app = app!(state());

        let req = test::TestRequest::get()
            .uri("/products?category=%E5%85%A8%E9%83%A8")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().map(|a| a.len()), Some(8));
    }

    #[actix_web::test]
    async fn test_recharge_presets() {
        let app = app!(state());

        let req = test::TestRequest::get().uri("/ledger/presets").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["presets"], json!([1_000, 5_000, 10_000, 50_000]));
        assert_eq!(body["data"]["formatted"][3], "¥500.00");
    }

    #[actix_web::test]
    async fn test_admin_get_product() {
        let app = app!(state());

        let req = test::TestRequest::get().uri("/admin/products/P6").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["serviceFee"], 10);
        assert_eq!(body["data"]["platform"], "pc");
    }

    #[actix_web::test]
    async fn test_admin_settings_round_trip() {
        let app = app!(state());

        let req = test::TestRequest::get().uri("/admin/settings").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let mut settings = body["data"].clone();
        assert_eq!(settings["withdrawalFee"], 5);
        assert_eq!(settings["naming"]["bossRole"], "老板");

        settings["withdrawalFee"] = json!(101);
        let req = test::TestRequest::put()
            .uri("/admin/settings")
            .set_json(&settings)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        settings["withdrawalFee"] = json!(8);
        settings["naming"]["platformName"] = json!("电竞俱乐部");
        let req = test::TestRequest::put()
            .uri("/admin/settings")
            .set_json(&settings)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = test::TestRequest::get().uri("/admin/settings").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["withdrawalFee"], 8);
        assert_eq!(body["data"]["naming"]["platformName"], "电竞俱乐部");
    }
}
