//! # Fund Ledger Service
//!
//! The FundLedger owns every movement of money between the fields of a
//! user's account.
//!
//! ## Responsibilities
//!
//! - Top up the spendable balance
//! - Stake part of the balance as a deposit (保证金)
//! - Release settled earnings into the balance
//! - Pay out owed compensation
//! - Admin deductions
//! - Journal every mutation
//!
//! ## Flow Example: Recharge Deposit
//!
//! ```text
//! 1. User requests a deposit recharge via API
//!                ↓
//! 2. FundLedger.recharge_deposit() called
//!                ↓
//! 3. Store write guard taken
//!                ↓
//! 4. amount > 0 and balance >= amount checked
//!                ↓
//! 5. balance -= amount, deposit += amount
//!                ↓
//! 6. Journal entry appended, guard dropped
//!                ↓
//! 7. Updated account returned to the handler
//! ```

use tracing::{debug, info, warn};

use crate::models::{AccountResponse, FundOperationResponse};
use crate::store::queries;
use crate::store::{LedgerEntry, LedgerEntryKind, Store, StoreData, StoreError, User, UserRole};
use crate::utils::{format_yuan, FEN_PER_YUAN};

/// Quick-pick recharge amounts in fen (¥10, ¥50, ¥100, ¥500).
pub const RECHARGE_PRESETS: [i64; 4] = [
    10 * FEN_PER_YUAN,
    50 * FEN_PER_YUAN,
    100 * FEN_PER_YUAN,
    500 * FEN_PER_YUAN,
];

/// Errors that can occur in fund operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Zero or negative amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Spendable balance too small.
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: i64, requested: i64 },

    /// More than the settled earnings.
    #[error("Insufficient unfreezable balance: available {available}, requested {requested}")]
    InsufficientUnfreezable { available: i64, requested: i64 },

    /// More than the smaller of owed compensation and balance.
    #[error("Payout exceeds payable amount: payable {payable}, requested {requested}")]
    ExceedsPayable { payable: i64, requested: i64 },

    /// Caller is not an admin.
    #[error("Permission denied: {0} is not an admin")]
    NotAdmin(String),

    /// Arithmetic overflow.
    #[error("Amount overflow")]
    Overflow,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The service for user fund operations.
///
/// ## Usage
///
/// ```rust,ignore
/// let ledger = FundLedger::new(store);
///
/// // Stake ¥50 of the balance as deposit
/// let result = ledger.recharge_deposit("U1", 5_000).await?;
/// println!("Deposit: {}", result.account.formatted_deposit);
/// ```
#[derive(Clone)]
pub struct FundLedger {
    store: Store,
}

impl FundLedger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ==========================================
    // QUERIES
    // ==========================================

    /// Get a user's account.
    pub async fn account(&self, user_id: &str) -> Result<AccountResponse, LedgerError> {
        let data = self.store.read().await;
        let user = queries::user(&data, user_id)?;
        Ok(AccountResponse::from(user.clone()))
    }

    /// Journal entries for a user, newest first.
    ///
    /// `limit` is capped at 100.
    pub async fn ledger_history(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let data = self.store.read().await;
        queries::user(&data, user_id)?;
        Ok(queries::ledger_for_user(&data, user_id, limit.min(100), offset))
    }

    // ==========================================
    // MUTATIONS
    // ==========================================

    /// Top up the spendable balance.
    pub async fn recharge_balance(
        &self,
        user_id: &str,
        amount: i64,
    ) -> Result<FundOperationResponse, LedgerError> {
        info!("Recharge balance: {} for {}", format_yuan(amount), user_id);

        let mut data = self.store.write().await;
        apply(&mut data, user_id, LedgerEntryKind::RechargeBalance, amount, None, |u| {
            u.balance = u.balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
            Ok(())
        })
    }

    /// Move part of the balance into the deposit.
    ///
    /// Fails without changes when `balance < amount`.
    pub async fn recharge_deposit(
        &self,
        user_id: &str,
        amount: i64,
    ) -> Result<FundOperationResponse, LedgerError> {
        info!("Recharge deposit: {} for {}", format_yuan(amount), user_id);

        let mut data = self.store.write().await;
        apply(&mut data, user_id, LedgerEntryKind::RechargeDeposit, amount, None, |u| {
            if u.balance < amount {
                return Err(LedgerError::InsufficientBalance {
                    available: u.balance,
                    requested: amount,
                });
            }
            let deposit = u.deposit.checked_add(amount).ok_or(LedgerError::Overflow)?;
            u.balance -= amount;
            u.deposit = deposit;
            Ok(())
        })
    }

    /// Release settled earnings into the balance.
    pub async fn unfreeze(
        &self,
        user_id: &str,
        amount: i64,
    ) -> Result<FundOperationResponse, LedgerError> {
        info!("Unfreeze: {} for {}", format_yuan(amount), user_id);

        let mut data = self.store.write().await;
        apply(&mut data, user_id, LedgerEntryKind::Unfreeze, amount, None, |u| {
            if amount > u.unfreezable_balance {
                return Err(LedgerError::InsufficientUnfreezable {
                    available: u.unfreezable_balance,
                    requested: amount,
                });
            }
            let balance = u.balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
            u.unfreezable_balance -= amount;
            u.balance = balance;
            Ok(())
        })
    }

    /// Pay owed compensation out of the balance.
    ///
    /// The amount is bounded by both `to_be_paid` and `balance`, so neither
    /// can go below zero.
    pub async fn payout(
        &self,
        user_id: &str,
        amount: i64,
    ) -> Result<FundOperationResponse, LedgerError> {
        info!("Payout: {} for {}", format_yuan(amount), user_id);

        let mut data = self.store.write().await;
        apply(&mut data, user_id, LedgerEntryKind::Payout, amount, None, |u| {
            let payable = u.to_be_paid.min(u.balance);
            if amount > payable {
                return Err(LedgerError::ExceedsPayable {
                    payable,
                    requested: amount,
                });
            }
            let paid_out = u.paid_out.checked_add(amount).ok_or(LedgerError::Overflow)?;
            u.balance -= amount;
            u.to_be_paid -= amount;
            u.paid_out = paid_out;
            Ok(())
        })
    }

    /// Deduct from a user's balance on an admin's behalf.
    ///
    /// There is no lower bound: the balance may go negative. The ledger
    /// monitor reports such accounts.
    pub async fn admin_payout_deduction(
        &self,
        admin_id: &str,
        user_id: &str,
        amount: i64,
        reason: Option<String>,
    ) -> Result<FundOperationResponse, LedgerError> {
        info!(
            "Admin deduction: {} from {} by {}",
            format_yuan(amount),
            user_id,
            admin_id
        );

        let mut data = self.store.write().await;

        let admin = queries::user(&data, admin_id)?;
        if admin.role != UserRole::Admin {
            warn!("Rejected deduction by non-admin {}", admin_id);
            return Err(LedgerError::NotAdmin(admin_id.to_string()));
        }

        let result = apply(&mut data, user_id, LedgerEntryKind::AdminDeduction, amount, reason, |u| {
            u.balance = u.balance.checked_sub(amount).ok_or(LedgerError::Overflow)?;
            Ok(())
        })?;

        if result.account.user.balance < 0 {
            warn!(
                "Balance of {} is negative after deduction: {}",
                user_id, result.account.formatted_balance
            );
        }

        Ok(result)
    }
}

/// Run one validated mutation against a user and journal it.
///
/// `op` must check everything before touching the user, so an `Err`
/// leaves the account unchanged.
fn apply<F>(
    data: &mut StoreData,
    user_id: &str,
    kind: LedgerEntryKind,
    amount: i64,
    note: Option<String>,
    op: F,
) -> Result<FundOperationResponse, LedgerError>
where
    F: FnOnce(&mut User) -> Result<(), LedgerError>,
{
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }

    let user = queries::user_mut(data, user_id)?;
    let before = user.balance;
    op(user)?;
    let after = user.balance;
    let snapshot = user.clone();

    let entry = queries::append_ledger_entry(data, user_id, kind, amount, before, after, None, note);
    debug!("Journaled {:?} for {}: {} -> {}", kind, user_id, before, after);

    Ok(FundOperationResponse {
        account: AccountResponse::from(snapshot),
        entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(user: User) -> (FundLedger, Store) {
        let mut admin = User::new("ADMIN", "admin", "admin@example.com");
        admin.role = UserRole::Admin;
        let store = Store::with_data(StoreData {
            users: vec![user, admin],
            ..StoreData::default()
        });
        (FundLedger::new(store.clone()), store)
    }

    fn user(balance: i64, deposit: i64) -> User {
        let mut u = User::new("U1", "boss", "boss@example.com");
        u.balance = balance;
        u.deposit = deposit;
        u
    }

    #[tokio::test]
    async fn test_recharge_deposit_moves_balance() {
        let (ledger, _) = ledger_with(user(100, 0));

        let result = ledger.recharge_deposit("U1", 50).await.unwrap();
        assert_eq!(result.account.user.balance, 50);
        assert_eq!(result.account.user.deposit, 50);
        assert_eq!(result.entry.balance_before, 100);
        assert_eq!(result.entry.balance_after, 50);
    }

    #[tokio::test]
    async fn test_recharge_deposit_rejects_overdraw() {
        let (ledger, store) = ledger_with(user(100, 0));

        let err = ledger.recharge_deposit("U1", 200).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance { available: 100, requested: 200 }
        );

        let data = store.read().await;
        let u = queries::user(&data, "U1").unwrap();
        assert_eq!((u.balance, u.deposit), (100, 0));
        assert!(data.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let (ledger, _) = ledger_with(user(100, 0));

        assert_eq!(
            ledger.recharge_balance("U1", 0).await.unwrap_err(),
            LedgerError::InvalidAmount(0)
        );
        assert_eq!(
            ledger.unfreeze("U1", -5).await.unwrap_err(),
            LedgerError::InvalidAmount(-5)
        );
    }

    #[tokio::test]
    async fn test_unfreeze_bounded_by_unfreezable() {
        let mut u = user(0, 0);
        u.unfreezable_balance = 300;
        let (ledger, _) = ledger_with(u);

        assert!(matches!(
            ledger.unfreeze("U1", 301).await,
            Err(LedgerError::InsufficientUnfreezable { .. })
        ));

        let result = ledger.unfreeze("U1", 300).await.unwrap();
        assert_eq!(result.account.user.balance, 300);
        assert_eq!(result.account.user.unfreezable_balance, 0);
    }

    #[tokio::test]
    async fn test_payout_bounded_by_balance_and_owed() {
        let mut u = user(500, 0);
        u.to_be_paid = 800;
        let (ledger, _) = ledger_with(u);

        assert_eq!(
            ledger.payout("U1", 600).await.unwrap_err(),
            LedgerError::ExceedsPayable { payable: 500, requested: 600 }
        );

        let result = ledger.payout("U1", 500).await.unwrap();
        let u = &result.account.user;
        assert_eq!((u.balance, u.to_be_paid, u.paid_out), (0, 300, 500));
    }

    #[tokio::test]
    async fn test_admin_deduction_may_go_negative() {
        let (ledger, _) = ledger_with(user(100, 0));

        let result = ledger
            .admin_payout_deduction("ADMIN", "U1", 250, Some("超时赔付".into()))
            .await
            .unwrap();
        assert_eq!(result.account.user.balance, -150);
        assert_eq!(result.entry.kind, LedgerEntryKind::AdminDeduction);
        assert_eq!(result.entry.note.as_deref(), Some("超时赔付"));
    }

    #[tokio::test]
    async fn test_admin_deduction_requires_admin() {
        let (ledger, _) = ledger_with(user(100, 0));

        assert_eq!(
            ledger.admin_payout_deduction("U1", "U1", 10, None).await.unwrap_err(),
            LedgerError::NotAdmin("U1".into())
        );
    }

    #[tokio::test]
    async fn test_every_mutation_journals_once() {
        let (ledger, _) = ledger_with(user(1_000, 0));

        ledger.recharge_balance("U1", 500).await.unwrap();
        ledger.recharge_deposit("U1", 200).await.unwrap();
        let _ = ledger.recharge_deposit("U1", 10_000).await;

        let history = ledger.ledger_history("U1", 20, 0).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, LedgerEntryKind::RechargeDeposit);
        assert_eq!(history[0].balance_before, 1_500);
        assert_eq!(history[0].balance_after, 1_300);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (ledger, _) = ledger_with(user(0, 0));
        assert!(matches!(
            ledger.recharge_balance("nobody", 10).await,
            Err(LedgerError::Store(StoreError::NotFound { .. }))
        ));
    }
}
