//! # Order Lifecycle Service
//!
//! The OrderManager moves catalog orders through their status sequence and
//! applies the matching effects on the accepting hitter's account.
//!
//! ## Status Machine
//!
//! ```text
//!   place_order
//!        │
//!        ▼
//! ┌────────────────┐  pay   ┌───────────────┐ accept ┌────────────┐
//! │ PendingPayment │──────► │ PendingAccept │──────► │ InProgress │
//! └────────────────┘        └───────────────┘        └─────┬──────┘
//!                                                          │ mark_for_settlement
//!                                                          ▼
//!                          ┌───────────┐  complete  ┌───────────────────┐
//!                          │ Completed │ ◄───────── │ PendingSettlement │
//!                          └─────┬─────┘            └─────────┬─────────┘
//!                                │                            │
//!                                └──────────┬─────────────────┘
//!                                           ▼ open_after_sales (also from InProgress)
//!                                    ┌────────────┐
//!                                    │ AfterSales │
//!                                    └────────────┘
//! ```
//!
//! ## Hitter Funds
//!
//! | Step | Effect on hitter |
//! |------|------------------|
//! | accept | `freezing_balance += earnings` |
//! | complete | `freezing_balance -= earnings`, `unfreezable_balance += earnings` |
//!
//! `earnings = amount × (100 − service_fee) / 100`, fixed on the order at
//! acceptance.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::models::{OrderDetailResponse, PlaceOrderRequest};
use crate::store::queries;
use crate::store::{LedgerEntryKind, Order, OrderStatus, Platform, Store, StoreData, StoreError};
use crate::utils::{format_yuan, net_of_fee};

/// Errors that can occur in order operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// The order is not in a status the operation starts from.
    #[error("Invalid transition for order {order_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The acting account is frozen.
    #[error("Account is frozen: {0}")]
    AccountFrozen(String),

    /// A hitter tried to accept their own order.
    #[error("User {0} cannot accept their own order")]
    SelfDealing(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A hitter fund field would leave the `i64` range.
    #[error("Amount overflow on order {0}")]
    Overflow(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The service for the order lifecycle.
///
/// ## Usage
///
/// ```rust,ignore
/// let orders = OrderManager::new(store);
///
/// let order = orders.accept_order("O3", "U2").await?;
/// assert_eq!(order.status, OrderStatus::InProgress);
/// ```
#[derive(Clone)]
pub struct OrderManager {
    store: Store,
}

impl OrderManager {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ==========================================
    // QUERIES
    // ==========================================

    /// Orders waiting for a hitter.
    pub async fn order_hall(&self, platform: Option<Platform>) -> Vec<Order> {
        let data = self.store.read().await;
        queries::order_hall(&data, platform)
    }

    /// Orders filtered by status and/or accepting hitter.
    ///
    /// With only `hitter_id` set this is the hitter's "my orders" list.
    pub async fn list(&self, status: Option<OrderStatus>, hitter_id: Option<&str>) -> Vec<Order> {
        let data = self.store.read().await;
        queries::orders_filtered(&data, status, hitter_id)
    }

    /// Order with the hitter's share computed.
    pub async fn detail(&self, order_id: &str) -> Result<OrderDetailResponse, OrderError> {
        let data = self.store.read().await;
        let order = queries::order(&data, order_id)?;
        let service_fee = service_fee_of(&data, order);
        let earnings = order
            .hitter_earnings
            .unwrap_or_else(|| net_of_fee(order.amount, Some(service_fee)));

        Ok(OrderDetailResponse {
            service_fee,
            earnings,
            formatted_amount: format_yuan(order.amount),
            formatted_earnings: format_yuan(earnings),
            status_label: order.status.label().to_string(),
            order: order.clone(),
        })
    }

    // ==========================================
    // TRANSITIONS
    // ==========================================

    /// Create an order for a product in `PendingPayment`.
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, OrderError> {
        if request.game_id.trim().is_empty() {
            return Err(OrderError::InvalidInput("gameId is required".into()));
        }

        let mut data = self.store.write().await;

        let product = queries::product(&data, &request.product_id)?.clone();
        let boss = queries::user(&data, &request.user_id)?;
        if !boss.is_active() {
            return Err(OrderError::AccountFrozen(boss.id.clone()));
        }
        let user_name = boss.name.clone();

        let id = queries::allocate_id(&data, "O");
        let order = Order {
            text_id: format!("TXT-{}", id),
            id,
            product_id: product.id,
            product_name: product.name,
            category: product.category,
            status: OrderStatus::PendingPayment,
            amount: product.price,
            user_id: request.user_id,
            user_name,
            hitter_id: None,
            hitter_earnings: None,
            platform: product.platform,
            game_id: request.game_id,
            server: request.server,
            notes: request.notes,
            order_time: Utc::now(),
            accept_time: None,
            completion_time: None,
        };

        info!(
            "Order {} placed by {} for {} ({})",
            order.id,
            order.user_id,
            order.product_name,
            format_yuan(order.amount)
        );

        data.orders.push(order.clone());
        Ok(order)
    }

    /// `PendingPayment` → `PendingAccept`.
    ///
    /// A product that grants a hitter identity grants it to the buyer here.
    pub async fn pay_order(&self, order_id: &str) -> Result<Order, OrderError> {
        let mut data = self.store.write().await;

        let order = queries::order(&data, order_id)?;
        ensure_status(order, &[OrderStatus::PendingPayment], OrderStatus::PendingAccept)?;

        let grant = queries::product(&data, &order.product_id)
            .ok()
            .and_then(|p| p.grants_identity);
        let buyer_id = order.user_id.clone();

        if let Some(identity) = grant {
            if let Ok(buyer) = queries::user_mut(&mut data, &buyer_id) {
                info!("User {} granted identity {:?}", buyer_id, identity);
                buyer.hitter_identity = identity;
            }
        }

        let order = queries::order_mut(&mut data, order_id)?;
        order.status = OrderStatus::PendingAccept;
        info!("Order {} paid", order_id);
        Ok(order.clone())
    }

    /// `PendingAccept` → `InProgress`, assigned to `hitter_id`.
    ///
    /// Rejected when the hitter is frozen or owns the order.
    pub async fn accept_order(&self, order_id: &str, hitter_id: &str) -> Result<Order, OrderError> {
        let mut data = self.store.write().await;

        let order = queries::order(&data, order_id)?;
        ensure_status(order, &[OrderStatus::PendingAccept], OrderStatus::InProgress)?;

        let hitter = queries::user(&data, hitter_id)?;
        if !hitter.is_active() {
            warn!("Frozen account {} tried to accept order {}", hitter_id, order_id);
            return Err(OrderError::AccountFrozen(hitter_id.to_string()));
        }
        if order.user_id == hitter_id {
            warn!("User {} tried to accept their own order {}", hitter_id, order_id);
            return Err(OrderError::SelfDealing(hitter_id.to_string()));
        }

        let earnings = net_of_fee(order.amount, Some(service_fee_of(&data, order)));
        let freezing = hitter
            .freezing_balance
            .checked_add(earnings)
            .ok_or_else(|| OrderError::Overflow(order_id.to_string()))?;

        // Validated; mutate.
        let hitter = queries::user_mut(&mut data, hitter_id)?;
        hitter.freezing_balance = freezing;
        let balance = hitter.balance;
        queries::append_ledger_entry(
            &mut data,
            hitter_id,
            LedgerEntryKind::OrderAccepted,
            earnings,
            balance,
            balance,
            Some(order_id),
            Some(format!("freezing +{}", format_yuan(earnings))),
        );

        let order = queries::order_mut(&mut data, order_id)?;
        order.status = OrderStatus::InProgress;
        order.hitter_id = Some(hitter_id.to_string());
        order.hitter_earnings = Some(earnings);
        order.accept_time = Some(Utc::now());

        info!(
            "Order {} accepted by {} (earnings {})",
            order_id,
            hitter_id,
            format_yuan(earnings)
        );
        Ok(order.clone())
    }

    /// `InProgress` → `PendingSettlement`.
    pub async fn mark_for_settlement(&self, order_id: &str) -> Result<Order, OrderError> {
        let mut data = self.store.write().await;

        let order = queries::order_mut(&mut data, order_id)?;
        ensure_status(order, &[OrderStatus::InProgress], OrderStatus::PendingSettlement)?;
        order.status = OrderStatus::PendingSettlement;

        info!("Order {} submitted for settlement", order_id);
        Ok(order.clone())
    }

    /// `PendingSettlement` → `Completed`.
    ///
    /// The hitter's earnings stop freezing and become unfreezable.
    pub async fn complete_settlement(&self, order_id: &str) -> Result<Order, OrderError> {
        let mut data = self.store.write().await;

        let order = queries::order(&data, order_id)?;
        ensure_status(order, &[OrderStatus::PendingSettlement], OrderStatus::Completed)?;
        let hitter_id = order.hitter_id.clone();
        let earnings = order.hitter_earnings.unwrap_or(0);

        let hitter = match hitter_id.as_deref() {
            Some(h) => Some(queries::user_mut(&mut data, h)),
            None => None,
        };

        match hitter {
            Some(Ok(hitter)) => {
                let overflow = || OrderError::Overflow(order_id.to_string());
                let freezing = hitter.freezing_balance.checked_sub(earnings).ok_or_else(overflow)?;
                let unfreezable = hitter.unfreezable_balance.checked_add(earnings).ok_or_else(overflow)?;
                hitter.freezing_balance = freezing;
                hitter.unfreezable_balance = unfreezable;
                let (id, balance) = (hitter.id.clone(), hitter.balance);
                queries::append_ledger_entry(
                    &mut data,
                    &id,
                    LedgerEntryKind::OrderSettled,
                    earnings,
                    balance,
                    balance,
                    Some(order_id),
                    Some(format!("unfreezable +{}", format_yuan(earnings))),
                );
            }
            Some(Err(_)) => {
                warn!("Hitter of order {} no longer exists, skipping earnings", order_id);
            }
            None => {
                warn!("Order {} reached settlement without a hitter", order_id);
            }
        }

        let order = queries::order_mut(&mut data, order_id)?;
        order.status = OrderStatus::Completed;
        order.completion_time = Some(Utc::now());

        info!("Order {} completed", order_id);
        Ok(order.clone())
    }

    /// Open a dispute. Allowed once the order has been accepted.
    ///
    /// Timestamps and hitter funds are left as they are. Earnings of an order
    /// that was not yet completed stay freezing and show up in
    /// `PlatformTotals::after_sales_held`.
    pub async fn open_after_sales(&self, order_id: &str) -> Result<Order, OrderError> {
        let mut data = self.store.write().await;

        let order = queries::order_mut(&mut data, order_id)?;
        ensure_status(
            order,
            &[
                OrderStatus::InProgress,
                OrderStatus::PendingSettlement,
                OrderStatus::Completed,
            ],
            OrderStatus::AfterSales,
        )?;
        order.status = OrderStatus::AfterSales;

        info!("Order {} moved to after-sales", order_id);
        Ok(order.clone())
    }
}

fn ensure_status(order: &Order, allowed: &[OrderStatus], to: OrderStatus) -> Result<(), OrderError> {
    if allowed.contains(&order.status) {
        return Ok(());
    }
    debug!("Rejected {:?} -> {:?} for order {}", order.status, to, order.id);
    Err(OrderError::InvalidTransition {
        order_id: order.id.clone(),
        from: order.status,
        to,
    })
}

/// Fee percentage of the order's product, 0 when unknown.
fn service_fee_of(data: &StoreData, order: &Order) -> u8 {
    queries::product(data, &order.product_id)
        .ok()
        .and_then(|p| p.service_fee)
        .unwrap_or(0)
}
