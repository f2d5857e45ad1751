//! # WebSocket Module
//!
//! Real-time event feed for bosses, hitters and the back-office.
//!
//! ## Events
//!
//! | Event | Sent to | When |
//! |-------|---------|------|
//! | `balance_update` | the account owner | any fund operation or settlement |
//! | `order_status_changed` | boss and hitter of the order | every transition |
//! | `bounty_updated` | everyone | sign-up, creation, close |
//! | `negative_balance` | everyone | monitor finds a balance below zero |
//! | `health_update` | everyone | on connect and every 2 minutes |
//! | `ping` | the sender | reply to any text frame |
//! | `error` | the sender | unsupported frame received |
//!
//! ## Connection Flow
//!
//! ```text
//! 1. Client connects to /ws/:user
//!              ↓
//! 2. Connection registered under the user id
//!              ↓
//! 3. health_update sent as a welcome
//!              ↓
//! 4. Events pushed as services report them
//! ```
//!
//! ## Message Format
//!
//! ```json
//! {
//!     "event": "order_status_changed",
//!     "data": {
//!         "orderId": "O3",
//!         "status": "inProgress",
//!         "statusLabel": "服务中",
//!         "hitterId": "U2"
//!     },
//!     "timestamp": "2024-01-15T12:00:00Z"
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::Message;
use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::store::{Bounty, Order, OrderStatus, User};
use crate::utils::format_yuan;
use crate::AppState;

/// WebSocket event types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsEventType {
    BalanceUpdate,
    OrderStatusChanged,
    BountyUpdated,
    NegativeBalance,
    HealthUpdate,
    Ping,
    Error,
}

/// WebSocket message wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsMessage<T> {
    pub event: WsEventType,
    pub data: T,
    pub timestamp: chrono::DateTime<Utc>,
}

impl<T: Serialize> WsMessage<T> {
    pub fn new(event: WsEventType, data: T) -> Self {
        Self {
            event,
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Balance update event data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdateData {
    pub user_id: String,
    pub balance: i64,
    pub deposit: i64,
    pub unfreezable_balance: i64,
    pub freezing_balance: i64,
    pub to_be_paid: i64,
    pub formatted_balance: String,
}

impl From<&User> for BalanceUpdateData {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            balance: user.balance,
            deposit: user.deposit,
            unfreezable_balance: user.unfreezable_balance,
            freezing_balance: user.freezing_balance,
            to_be_paid: user.to_be_paid,
            formatted_balance: format_yuan(user.balance),
        }
    }
}

/// Order status changed event data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusData {
    pub order_id: String,
    pub status: OrderStatus,
    pub status_label: String,
    pub hitter_id: Option<String>,
}

impl From<&Order> for OrderStatusData {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            status: order.status,
            status_label: order.status.label().to_string(),
            hitter_id: order.hitter_id.clone(),
        }
    }
}

/// Bounty updated event data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyUpdateData {
    pub bounty_id: String,
    pub participants: u32,
    pub max_participants: u32,
    pub open: bool,
}

impl From<&Bounty> for BountyUpdateData {
    fn from(bounty: &Bounty) -> Self {
        Self {
            bounty_id: bounty.id.clone(),
            participants: bounty.participants,
            max_participants: bounty.max_participants,
            open: bounty.status == crate::store::BountyStatus::InProgress,
        }
    }
}

/// Negative balance alert data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativeBalanceData {
    pub user_id: String,
    pub user_name: String,
    pub balance: i64,
    pub formatted_balance: String,
}

/// WebSocket connection registry.
///
/// Each user id maps to one sender per open connection (tabs, devices).
#[derive(Clone, Default)]
pub struct WsRegistry {
    sessions: Arc<Mutex<HashMap<String, Vec<broadcast::Sender<String>>>>>,
}

impl WsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and get the receiver for its messages.
    pub async fn register(&self, user: String) -> broadcast::Receiver<String> {
        let mut sessions = self.sessions.lock().await;
        let (tx, rx) = broadcast::channel(100);

        let senders = sessions.entry(user.clone()).or_default();
        senders.push(tx);
        info!("Registered WebSocket for {} (connections: {})", user, senders.len());

        rx
    }

    /// Drop senders of closed connections for a user.
    pub async fn unregister(&self, user: &str) {
        let mut sessions = self.sessions.lock().await;
        if let Some(senders) = sessions.get_mut(user) {
            senders.retain(|tx| tx.receiver_count() > 0);
            if senders.is_empty() {
                sessions.remove(user);
                info!("Unregistered all WebSocket connections for {}", user);
            }
        }
    }

    /// Send to every connection of one user. A user with no connection is
    /// not an error.
    pub async fn send_to_user<T: Serialize>(
        &self,
        user: &str,
        event: WsEventType,
        data: T,
    ) -> Result<(), String> {
        let json = WsMessage::new(event, data)
            .to_json()
            .map_err(|e| format!("Failed to serialize message: {}", e))?;

        let mut sessions = self.sessions.lock().await;
        let Some(senders) = sessions.get_mut(user) else {
            debug!("No active WebSocket connections for {}", user);
            return Ok(());
        };

        senders.retain(|tx| tx.send(json.clone()).is_ok());
        let sent = senders.len();
        if senders.is_empty() {
            sessions.remove(user);
        }

        debug!("Sent {:?} to {} ({} connections)", event, user, sent);
        Ok(())
    }

    /// Send to every open connection.
    pub async fn broadcast<T: Serialize>(&self, event: WsEventType, data: T) -> Result<(), String> {
        let json = WsMessage::new(event, data)
            .to_json()
            .map_err(|e| format!("Failed to serialize message: {}", e))?;

        let sessions = self.sessions.lock().await;
        let sent = sessions
            .values()
            .flatten()
            .filter(|tx| tx.send(json.clone()).is_ok())
            .count();

        debug!("Broadcast {:?} to {} connections", event, sent);
        Ok(())
    }

    pub async fn total_connections(&self) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.values().map(|v| v.len()).sum()
    }
}

/// Configure WebSocket routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws/{user}", web::get().to(websocket_handler));
}

/// WebSocket connection handler.
///
/// ## Endpoint
///
/// `GET /ws/:user`
///
/// ## Example (JavaScript)
///
/// ```javascript
/// const ws = new WebSocket('ws://localhost:8080/ws/U2');
///
/// ws.onmessage = (event) => {
///     const message = JSON.parse(event.data);
///     if (message.event === 'order_status_changed') {
///         refreshOrders();
///     }
/// };
/// ```
pub async fn websocket_handler(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Payload,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = path.into_inner();
    info!("WebSocket connection request for {}", user);

    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, body)?;

    let registry = state.ws_registry.clone();
    let mut rx = registry.register(user.clone()).await;

    actix_rt::spawn(async move {
        let welcome = WsMessage::new(
            WsEventType::HealthUpdate,
            serde_json::json!({ "status": "connected", "user": user }),
        );
        if let Ok(json) = welcome.to_json() {
            if let Err(e) = session.text(json).await {
                error!("Failed to send welcome message: {}", e);
            }
        }

        // registry -> socket
        let mut outbound = session.clone();
        let forward_user = user.clone();
        let forward_registry = registry.clone();
        actix_rt::spawn(async move {
            while let Some(msg) = next_event(&mut rx, &forward_user).await {
                if let Err(e) = outbound.text(msg).await {
                    debug!("WebSocket closed for {}: {}", forward_user, e);
                    break;
                }
            }
            drop(rx);
            forward_registry.unregister(&forward_user).await;
        });

        // socket -> server
        while let Some(Ok(msg)) = msg_stream.next().await {
            match msg {
                Message::Ping(bytes) => {
                    let _ = session.pong(&bytes).await;
                }
                Message::Text(text) => {
                    let reply = WsMessage::new(
                        WsEventType::Ping,
                        serde_json::json!({ "received": text.to_string() }),
                    );
                    if let Ok(json) = reply.to_json() {
                        let _ = session.text(json).await;
                    }
                }
                Message::Binary(_) => {
                    warn!("Unexpected binary message from {}", user);
                    let reply = WsMessage::new(
                        WsEventType::Error,
                        serde_json::json!({ "message": "binary frames are not supported" }),
                    );
                    if let Ok(json) = reply.to_json() {
                        let _ = session.text(json).await;
                    }
                }
                Message::Close(reason) => {
                    info!("WebSocket closed for {}: {:?}", user, reason);
                    break;
                }
                _ => {}
            }
        }

        let _ = session.close(None).await;
        registry.unregister(&user).await;
        info!("WebSocket disconnected for {}", user);
    });

    Ok(response)
}

/// Next queued event for a connection. A slow reader that fell behind skips
/// the dropped events and keeps going; `None` only once the sender is gone.
async fn next_event(rx: &mut broadcast::Receiver<String>, user: &str) -> Option<String> {
    loop {
        match rx.recv().await {
            Ok(msg) => return Some(msg),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("WebSocket for {} lagged, skipped {} events", user, skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

/// Send an event to one user through the registry in `AppState`.
pub async fn send_to_user<T: Serialize>(
    state: &Arc<AppState>,
    user: &str,
    event: WsEventType,
    data: T,
) -> Result<(), String> {
    state.ws_registry.send_to_user(user, event, data).await
}

/// Send an event to every connection through the registry in `AppState`.
pub async fn broadcast<T: Serialize>(
    state: &Arc<AppState>,
    event: WsEventType,
    data: T,
) -> Result<(), String> {
    state.ws_registry.broadcast(event, data).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lagged_receiver_keeps_forwarding() {
        let (tx, mut rx) = broadcast::channel(2);
        for i in 0..5 {
            tx.send(format!("m{}", i)).unwrap();
        }

        assert_eq!(next_event(&mut rx, "U1").await.as_deref(), Some("m3"));
        assert_eq!(next_event(&mut rx, "U1").await.as_deref(), Some("m4"));

        drop(tx);
        assert_eq!(next_event(&mut rx, "U1").await, None);
    }

    #[tokio::test]
    async fn test_send_to_user_reaches_only_that_user() {
        let registry = WsRegistry::new();
        let mut a = registry.register("U1".into()).await;
        let mut b = registry.register("U2".into()).await;

        registry
            .send_to_user("U1", WsEventType::BalanceUpdate, serde_json::json!({ "balance": 1 }))
            .await
            .unwrap();

        let msg = a.recv().await.unwrap();
        assert!(msg.contains("\"event\":\"balance_update\""));
        assert!(b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_receivers_are_pruned() {
        let registry = WsRegistry::new();
        let rx = registry.register("U1".into()).await;
        assert_eq!(registry.total_connections().await, 1);

        drop(rx);
        registry.send_to_user("U1", WsEventType::Ping, "x").await.unwrap();
        assert_eq!(registry.total_connections().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_an_error() {
        let registry = WsRegistry::new();
        assert!(registry.send_to_user("nobody", WsEventType::Ping, ()).await.is_ok());
        assert!(registry.broadcast(WsEventType::HealthUpdate, ()).await.is_ok());
    }
}
