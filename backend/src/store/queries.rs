//! # Store Queries
//!
//! Lookup and mutation helpers over [`StoreData`]. Services call these
//! while holding the store guard, so none of them lock anything.
//!
//! ## Query Categories
//!
//! - **Lookups**: `user`, `user_mut`, `order_mut`, ...
//! - **Listings**: `orders_by_status`, `order_hall`, `products_in_category`
//! - **Mutations**: `replace_*`, `remove_*`, `append_ledger_entry`
//! - **Analytics**: `platform_totals`

use chrono::Utc;
use uuid::Uuid;

use super::models::*;
use super::{StoreData, StoreError};

/// Category name that means "no filter" in the browse view.
pub const ALL_CATEGORIES: &str = "全部";

// ==========================================
// ID ALLOCATION
// ==========================================

/// Allocate a `prefix + timestamp` id that no collection already uses.
///
/// Two creations inside the same millisecond would otherwise collide, so
/// the numeric part is bumped until it is free.
pub fn allocate_id(data: &StoreData, prefix: &str) -> String {
    let mut n = Utc::now().timestamp_millis();
    loop {
        let candidate = format!("{}{}", prefix, n);
        if !id_in_use(data, &candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn id_in_use(data: &StoreData, id: &str) -> bool {
    data.products.iter().any(|p| p.id == id)
        || data.users.iter().any(|u| u.id == id)
        || data.orders.iter().any(|o| o.id == id)
        || data.bounties.iter().any(|b| b.id == id)
        || data.teams.iter().any(|t| t.id == id)
        || data.complaints.iter().any(|c| c.id == id)
        || data.announcements.iter().any(|a| a.id == id)
        || data.ad_slots.iter().any(|s| s.id == id)
}

// ==========================================
// USERS
// ==========================================

pub fn user<'a>(data: &'a StoreData, id: &str) -> Result<&'a User, StoreError> {
    data.users
        .iter()
        .find(|u| u.id == id)
        .ok_or_else(|| StoreError::not_found("User", id))
}

pub fn user_mut<'a>(data: &'a mut StoreData, id: &str) -> Result<&'a mut User, StoreError> {
    data.users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| StoreError::not_found("User", id))
}

pub fn remove_user(data: &mut StoreData, id: &str) -> Result<User, StoreError> {
    let idx = data
        .users
        .iter()
        .position(|u| u.id == id)
        .ok_or_else(|| StoreError::not_found("User", id))?;
    Ok(data.users.remove(idx))
}

// ==========================================
// PRODUCTS
// ==========================================

pub fn product<'a>(data: &'a StoreData, id: &str) -> Result<&'a Product, StoreError> {
    data.products
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| StoreError::not_found("Product", id))
}

/// Products in a category. `None` or [`ALL_CATEGORIES`] returns everything.
pub fn products_in_category(data: &StoreData, category: Option<&str>) -> Vec<Product> {
    match category {
        None | Some(ALL_CATEGORIES) | Some("") => data.products.clone(),
        Some(c) => data
            .products
            .iter()
            .filter(|p| p.category == c)
            .cloned()
            .collect(),
    }
}

/// Replace a product by id (full replace, as the admin form does).
pub fn replace_product(data: &mut StoreData, product: Product) -> Result<(), StoreError> {
    let slot = data
        .products
        .iter_mut()
        .find(|p| p.id == product.id)
        .ok_or_else(|| StoreError::not_found("Product", &product.id))?;
    *slot = product;
    Ok(())
}

pub fn remove_product(data: &mut StoreData, id: &str) -> Result<Product, StoreError> {
    let idx = data
        .products
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| StoreError::not_found("Product", id))?;
    Ok(data.products.remove(idx))
}

// ==========================================
// ORDERS
// ==========================================

pub fn order<'a>(data: &'a StoreData, id: &str) -> Result<&'a Order, StoreError> {
    data.orders
        .iter()
        .find(|o| o.id == id)
        .ok_or_else(|| StoreError::not_found("Order", id))
}

pub fn order_mut<'a>(data: &'a mut StoreData, id: &str) -> Result<&'a mut Order, StoreError> {
    data.orders
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| StoreError::not_found("Order", id))
}

/// Orders waiting for a hitter, optionally limited to one platform.
pub fn order_hall(data: &StoreData, platform: Option<Platform>) -> Vec<Order> {
    data.orders
        .iter()
        .filter(|o| o.status == OrderStatus::PendingAccept)
        .filter(|o| platform.is_none() || o.platform == platform)
        .cloned()
        .collect()
}

/// Orders filtered by status and/or accepting hitter.
pub fn orders_filtered(
    data: &StoreData,
    status: Option<OrderStatus>,
    hitter_id: Option<&str>,
) -> Vec<Order> {
    data.orders
        .iter()
        .filter(|o| status.map_or(true, |s| o.status == s))
        .filter(|o| hitter_id.map_or(true, |h| o.hitter_id.as_deref() == Some(h)))
        .cloned()
        .collect()
}

// ==========================================
// BOUNTIES
// ==========================================

pub fn bounty_mut<'a>(data: &'a mut StoreData, id: &str) -> Result<&'a mut Bounty, StoreError> {
    data.bounties
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| StoreError::not_found("Bounty", id))
}

// ==========================================
// BACK-OFFICE
// ==========================================

pub fn team_mut<'a>(data: &'a mut StoreData, id: &str) -> Result<&'a mut Team, StoreError> {
    data.teams
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| StoreError::not_found("Team", id))
}

pub fn remove_team(data: &mut StoreData, id: &str) -> Result<Team, StoreError> {
    let idx = data
        .teams
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| StoreError::not_found("Team", id))?;
    Ok(data.teams.remove(idx))
}

pub fn complaint_mut<'a>(data: &'a mut StoreData, id: &str) -> Result<&'a mut Complaint, StoreError> {
    data.complaints
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| StoreError::not_found("Complaint", id))
}

pub fn announcement_mut<'a>(
    data: &'a mut StoreData,
    id: &str,
) -> Result<&'a mut Announcement, StoreError> {
    data.announcements
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| StoreError::not_found("Announcement", id))
}

pub fn remove_announcement(data: &mut StoreData, id: &str) -> Result<Announcement, StoreError> {
    let idx = data
        .announcements
        .iter()
        .position(|a| a.id == id)
        .ok_or_else(|| StoreError::not_found("Announcement", id))?;
    Ok(data.announcements.remove(idx))
}

pub fn ad_slot_mut<'a>(data: &'a mut StoreData, id: &str) -> Result<&'a mut AdSlot, StoreError> {
    data.ad_slots
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| StoreError::not_found("AdSlot", id))
}

// ==========================================
// LEDGER JOURNAL
// ==========================================

/// Append one journal line and return a copy of it.
#[allow(clippy::too_many_arguments)]
pub fn append_ledger_entry(
    data: &mut StoreData,
    user_id: &str,
    kind: LedgerEntryKind,
    amount: i64,
    balance_before: i64,
    balance_after: i64,
    order_id: Option<&str>,
    note: Option<String>,
) -> LedgerEntry {
    let entry = LedgerEntry {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        kind,
        amount,
        balance_before,
        balance_after,
        order_id: order_id.map(str::to_string),
        note,
        created_at: Utc::now(),
    };
    data.ledger.push(entry.clone());
    entry
}

/// Journal entries for one user, newest first.
pub fn ledger_for_user(data: &StoreData, user_id: &str, limit: usize, offset: usize) -> Vec<LedgerEntry> {
    data.ledger
        .iter()
        .rev()
        .filter(|e| e.user_id == user_id)
        .skip(offset)
        .take(limit)
        .cloned()
        .collect()
}

// ==========================================
// ANALYTICS
// ==========================================

/// Sum the ledger fields of every user and count orders per status.
pub fn platform_totals(data: &StoreData) -> PlatformTotals {
    let mut totals = PlatformTotals {
        users: data.users.len(),
        ..PlatformTotals::default()
    };

    // Saturating: each field is individually in range, the sum need not be.
    for u in &data.users {
        totals.total_balance = totals.total_balance.saturating_add(u.balance);
        totals.total_deposit = totals.total_deposit.saturating_add(u.deposit);
        totals.total_freezing = totals.total_freezing.saturating_add(u.freezing_balance);
        totals.total_to_be_paid = totals.total_to_be_paid.saturating_add(u.to_be_paid);
        totals.total_paid_out = totals.total_paid_out.saturating_add(u.paid_out);
    }

    // completion_time is only set on Completed, and after-sales keeps it
    totals.after_sales_held = data
        .orders
        .iter()
        .filter(|o| o.status == OrderStatus::AfterSales && o.completion_time.is_none())
        .filter_map(|o| o.hitter_earnings)
        .fold(0i64, |acc, e| acc.saturating_add(e));

    totals.orders_by_status = OrderStatus::ALL
        .iter()
        .map(|s| (*s, data.orders.iter().filter(|o| o.status == *s).count()))
        .collect();

    totals.open_bounties = data
        .bounties
        .iter()
        .filter(|b| b.status == BountyStatus::InProgress)
        .count();

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed;

    #[test]
    fn test_allocate_id_skips_taken_ids() {
        let mut data = StoreData::default();
        let first = allocate_id(&data, "T");
        data.teams.push(Team {
            id: first.clone(),
            name: "x".into(),
            leader_name: "x".into(),
            leader_id: "U1".into(),
            member_count: 1,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        });
        let second = allocate_id(&data, "T");
        assert_ne!(first, second);
        assert!(second.starts_with('T'));
    }

    #[test]
    fn test_products_in_category() {
        let data = seed::mock_data();
        let all = products_in_category(&data, Some(ALL_CATEGORIES));
        assert_eq!(all.len(), data.products.len());

        let coaching = products_in_category(&data, Some("技能陪练"));
        assert!(!coaching.is_empty());
        assert!(coaching.iter().all(|p| p.category == "技能陪练"));

        assert!(products_in_category(&data, Some("不存在")).is_empty());
    }

    #[test]
    fn test_order_hall_only_pending_accept() {
        let data = seed::mock_data();
        let hall = order_hall(&data, None);
        assert!(!hall.is_empty());
        assert!(hall.iter().all(|o| o.status == OrderStatus::PendingAccept));
    }

    #[test]
    fn test_ledger_for_user_newest_first() {
        let mut data = StoreData::default();
        append_ledger_entry(&mut data, "U1", LedgerEntryKind::RechargeBalance, 100, 0, 100, None, None);
        append_ledger_entry(&mut data, "U2", LedgerEntryKind::RechargeBalance, 5, 0, 5, None, None);
        append_ledger_entry(&mut data, "U1", LedgerEntryKind::Payout, 30, 100, 70, None, None);

        let entries = ledger_for_user(&data, "U1", 10, 0);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, LedgerEntryKind::Payout);
        assert_eq!(entries[1].kind, LedgerEntryKind::RechargeBalance);

        assert_eq!(ledger_for_user(&data, "U1", 1, 1).len(), 1);
    }

    #[test]
    fn test_platform_totals() {
        let data = seed::mock_data();
        let totals = platform_totals(&data);
        let expected: i64 = data.users.iter().map(|u| u.balance).sum();
        assert_eq!(totals.total_balance, expected);
        assert_eq!(totals.orders_by_status.len(), OrderStatus::ALL.len());
        let counted: usize = totals.orders_by_status.iter().map(|(_, n)| n).sum();
        assert_eq!(counted, data.orders.len());
        assert_eq!(totals.after_sales_held, 0);
    }

    #[test]
    fn test_platform_totals_saturate() {
        let mut rich = User::new("U1", "a", "a@example.com");
        rich.balance = i64::MAX;
        rich.deposit = i64::MAX;
        let mut richer = User::new("U2", "b", "b@example.com");
        richer.balance = i64::MAX - 1;
        richer.deposit = 1;
        let mut debtor = User::new("U3", "c", "c@example.com");
        debtor.balance = -5;

        let data = StoreData {
            users: vec![rich, richer, debtor],
            ..StoreData::default()
        };
        let totals = platform_totals(&data);
        assert_eq!(totals.total_balance, i64::MAX - 5);
        assert_eq!(totals.total_deposit, i64::MAX);
    }

    #[test]
    fn test_after_sales_held_counts_unsettled_disputes() {
        let mut data = seed::mock_data();
        // O2 in progress (¥95.00 earnings), O1 already completed
        for id in ["O2", "O1"] {
            order_mut(&mut data, id).unwrap().status = OrderStatus::AfterSales;
        }

        let totals = platform_totals(&data);
        assert_eq!(totals.after_sales_held, 9_500);
    }
}
