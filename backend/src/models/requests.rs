//! # API Request Models
//!
//! Structures for incoming API request bodies and query strings.
//! Each struct represents the expected JSON body for an endpoint.
//!
//! ## Amounts
//!
//! Every amount is an integer number of fen:
//! - 1 yuan = 100 fen
//! - Example: ¥50 = 5,000

use serde::{Deserialize, Serialize};

use crate::store::{AccountStatus, ComplaintStatus, HitterIdentity, OrderStatus, Platform, SpecialType, UserRole};

// ==========================================
// FUND LEDGER
// ==========================================

/// Body of every single-amount fund operation.
///
/// Used by recharge-balance, recharge-deposit, unfreeze and payout.
///
/// ## Example JSON
///
/// ```json
/// {
///     "amount": 5000
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    /// Amount in fen. Must be greater than 0.
    pub amount: i64,
}

/// Admin deduction from a user's balance.
///
/// ## Example JSON
///
/// ```json
/// {
///     "adminId": "U5",
///     "amount": 3000,
///     "reason": "超时赔付"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionRequest {
    /// Id of the admin performing the deduction.
    pub admin_id: String,

    /// Amount in fen.
    pub amount: i64,

    /// Free-text reason, stored on the journal entry.
    pub reason: Option<String>,
}

/// Query parameters for the journal.
///
/// ## Example URL
///
/// ```text
/// GET /users/U1/ledger?limit=20&offset=0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    /// Default: 20, Max: 100
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

// ==========================================
// ORDERS
// ==========================================

/// Request to place an order for a catalog product.
///
/// ## Example JSON
///
/// ```json
/// {
///     "productId": "P1",
///     "userId": "U1",
///     "gameId": "player-8888",
///     "server": "微信区",
///     "notes": "晚上八点后"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub product_id: String,

    /// The boss placing the order.
    pub user_id: String,

    /// In-game account the hitter plays on.
    pub game_id: String,

    pub server: String,

    #[serde(default)]
    pub notes: String,
}

/// Request to accept an order from the hall.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOrderRequest {
    pub hitter_id: String,
}

/// Query parameters for the order hall.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHallQuery {
    pub platform: Option<Platform>,
}

/// Query parameters for the order listing.
///
/// ## Example URL
///
/// ```text
/// GET /orders?status=inProgress&hitterId=U2
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub hitter_id: Option<String>,
}

// ==========================================
// BOUNTIES
// ==========================================

/// Request to post a bounty.
///
/// ## Example JSON
///
/// ```json
/// {
///     "title": "急求大神带过最终BOSS",
///     "description": "卡关一天了",
///     "reward": 20000,
///     "maxParticipants": 3
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBountyRequest {
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Reward in fen.
    pub reward: i64,

    /// Defaults to the configured capacity when absent.
    pub max_participants: Option<u32>,

    pub platform: Option<Platform>,
}

/// Request for a generated bounty description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeRequest {
    pub title: String,
}

// ==========================================
// BACK-OFFICE
// ==========================================

/// Query parameters for product browsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Category name; "全部" or absent means all.
    pub category: Option<String>,
}

/// Product form submitted by the admin screen.
///
/// Used for both create and replace. On replace, the id and sales count
/// of the existing product are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,

    /// Price in fen. Must be greater than 0.
    pub price: i64,

    pub category: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub images: Vec<String>,

    pub badge: Option<String>,
    pub platform: Option<Platform>,
    pub special_type: Option<SpecialType>,
    pub grants_identity: Option<HitterIdentity>,

    /// Percentage in 1..=50. Defaults to 5.
    pub service_fee: Option<u8>,
}

/// Profile fields an admin may overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileUpdate {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub name: String,
    pub leader_name: String,
    pub leader_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    pub order_id: String,
    pub user_id: String,
    pub user_name: String,
    pub subject: String,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStatusUpdate {
    pub status: ComplaintStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    pub content: String,

    /// Defaults to true.
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdSlotUpdate {
    pub content: String,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_query_defaults() {
        let q: LedgerQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.limit, 20);
        assert_eq!(q.offset, 0);
    }

    #[test]
    fn test_order_list_query_camel_case() {
        let q: OrderListQuery =
            serde_json::from_str(r#"{"status":"pendingSettlement","hitterId":"U2"}"#).unwrap();
        assert_eq!(q.status, Some(OrderStatus::PendingSettlement));
        assert_eq!(q.hitter_id.as_deref(), Some("U2"));
    }

    #[test]
    fn test_place_order_notes_optional() {
        let req: PlaceOrderRequest = serde_json::from_str(
            r#"{"productId":"P1","userId":"U1","gameId":"g","server":"s"}"#,
        )
        .unwrap();
        assert!(req.notes.is_empty());
    }
}
