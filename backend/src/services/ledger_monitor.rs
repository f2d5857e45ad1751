//! # Ledger Monitor Service
//!
//! The LedgerMonitor watches the platform's fund ledger in the background.
//!
//! ## Responsibilities
//!
//! - Log platform totals (balances, deposits, owed compensation, orders
//!   per status)
//! - Warn about accounts whose balance went negative
//! - Push `negative_balance` and `health_update` events to WebSocket clients
//!
//! ## Monitoring Flow
//!
//! ```text
//! LedgerMonitor (background task)
//!              │
//!              ├── Every MONITOR_INTERVAL: totals + negative balances
//!              │
//!              └── Every 2m: health_update broadcast
//! ```

use std::time::Duration;

use serde::Serialize;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::store::queries;
use crate::store::{PlatformTotals, Store};
use crate::utils::format_yuan;
use crate::websocket::{NegativeBalanceData, WsEventType, WsRegistry};

/// Outcome of one monitoring pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorReport {
    pub totals: PlatformTotals,
    pub negative_balances: Vec<NegativeBalanceData>,
}

/// The ledger monitor service.
///
/// ## Usage
///
/// ```rust,ignore
/// let monitor = LedgerMonitor::new(store, ws_registry, config);
///
/// // Start monitoring (runs forever)
/// tokio::spawn(async move {
///     monitor.start().await;
/// });
/// ```
#[derive(Clone)]
pub struct LedgerMonitor {
    store: Store,
    ws_registry: WsRegistry,
    config: AppConfig,
}

impl LedgerMonitor {
    pub fn new(store: Store, ws_registry: WsRegistry, config: AppConfig) -> Self {
        Self {
            store,
            ws_registry,
            config,
        }
    }

    /// Start the monitoring loop.
    pub async fn start(&self) {
        info!(
            "Starting Ledger Monitor (interval {}s)",
            self.config.monitor_interval
        );

        let mut ledger_ticker = interval(Duration::from_secs(self.config.monitor_interval.max(1)));
        let mut health_ticker = interval(Duration::from_secs(120));

        loop {
            tokio::select! {
                _ = ledger_ticker.tick() => {
                    let report = self.check_once().await;
                    self.notify_negative(&report).await;
                }

                _ = health_ticker.tick() => {
                    self.broadcast_health().await;
                }
            }
        }
    }

    /// Run one pass: sum the ledger and collect negative balances.
    pub async fn check_once(&self) -> MonitorReport {
        let data = self.store.read().await;
        let totals = queries::platform_totals(&data);

        let negative_balances: Vec<NegativeBalanceData> = data
            .users
            .iter()
            .filter(|u| u.balance < 0)
            .map(|u| NegativeBalanceData {
                user_id: u.id.clone(),
                user_name: u.name.clone(),
                balance: u.balance,
                formatted_balance: format_yuan(u.balance),
            })
            .collect();
        drop(data);

        info!(
            "Ledger: balances {} | deposits {} | freezing {} | to be paid {} | {} users | {} open bounties",
            format_yuan(totals.total_balance),
            format_yuan(totals.total_deposit),
            format_yuan(totals.total_freezing),
            format_yuan(totals.total_to_be_paid),
            totals.users,
            totals.open_bounties
        );
        if totals.after_sales_held > 0 {
            warn!(
                "{} of hitter earnings held by unsettled after-sales orders",
                format_yuan(totals.after_sales_held)
            );
        }
        for (status, count) in &totals.orders_by_status {
            debug!("Orders {:?}: {}", status, count);
        }

        for n in &negative_balances {
            warn!(
                "Negative balance: {} ({}) at {}",
                n.user_id, n.user_name, n.formatted_balance
            );
        }

        MonitorReport {
            totals,
            negative_balances,
        }
    }

    async fn notify_negative(&self, report: &MonitorReport) {
        for n in &report.negative_balances {
            if let Err(e) = self
                .ws_registry
                .broadcast(WsEventType::NegativeBalance, n)
                .await
            {
                warn!("Failed to broadcast negative balance: {}", e);
            }
        }
    }

    async fn broadcast_health(&self) {
        let connections = self.ws_registry.total_connections().await;
        let totals = {
            let data = self.store.read().await;
            queries::platform_totals(&data)
        };

        let payload = serde_json::json!({
            "status": "healthy",
            "connections": connections,
            "users": totals.users,
            "openBounties": totals.open_bounties,
        });
        if let Err(e) = self.ws_registry.broadcast(WsEventType::HealthUpdate, payload).await {
            warn!("Failed to broadcast health update: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FundLedger;
    use crate::store::{seed, StoreData, User};

    #[tokio::test]
    async fn test_check_once_on_seed() {
        let store = Store::with_data(seed::mock_data());
        let monitor = LedgerMonitor::new(store, WsRegistry::new(), AppConfig::default());

        let report = monitor.check_once().await;
        assert!(report.negative_balances.is_empty());
        assert_eq!(report.totals.users, 5);
    }

    #[tokio::test]
    async fn test_check_once_after_max_recharges() {
        let store = Store::with_data(seed::mock_data());
        let ledger = FundLedger::new(store.clone());
        for id in ["U1", "U3"] {
            let headroom = i64::MAX - queries::user(&*store.read().await, id).unwrap().balance;
            ledger.recharge_balance(id, headroom).await.unwrap();
        }

        let monitor = LedgerMonitor::new(store, WsRegistry::new(), AppConfig::default());
        let report = monitor.check_once().await;
        assert_eq!(report.totals.total_balance, i64::MAX);
    }

    #[tokio::test]
    async fn test_reports_negative_balance() {
        let mut debtor = User::new("U9", "欠款用户", "debt@example.com");
        debtor.balance = -150;
        let store = Store::with_data(StoreData {
            users: vec![debtor, User::new("U10", "ok", "ok@example.com")],
            ..StoreData::default()
        });
        let registry = WsRegistry::new();
        let mut rx = registry.register("U10".into()).await;
        let monitor = LedgerMonitor::new(store, registry, AppConfig::default());

        let report = monitor.check_once().await;
        assert_eq!(report.negative_balances.len(), 1);
        assert_eq!(report.negative_balances[0].formatted_balance, "-¥1.50");

        monitor.notify_negative(&report).await;
        let msg = rx.recv().await.unwrap();
        assert!(msg.contains("negative_balance"));
        assert!(msg.contains("U9"));
    }
}
