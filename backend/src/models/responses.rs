//! # API Response Models
//!
//! Structures for outgoing API response bodies.
//! All responses are wrapped in a standard format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{LedgerEntry, Order, User};
use crate::utils::format_yuan;

/// Standard API response wrapper.
///
/// All API responses follow this format:
///
/// ## Success Response
///
/// ```json
/// {
///     "success": true,
///     "data": { ... },
///     "error": null
/// }
/// ```
///
/// ## Error Response
///
/// ```json
/// {
///     "success": false,
///     "data": null,
///     "error": {
///         "code": "INSUFFICIENT_BALANCE",
///         "message": "Insufficient balance: available 100, requested 200"
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,

    /// Response data (null on error).
    pub data: Option<T>,

    /// Error information (null on success).
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// API error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Error code (e.g., "INSUFFICIENT_BALANCE").
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

/// A user with human-readable ledger figures.
///
/// Returned by `GET /users/:id` and every fund operation.
///
/// ## Example Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "id": "U1",
///         "name": "玩家_8888",
///         "balance": 50000,
///         "deposit": 0,
///         "formattedBalance": "¥500.00",
///         "formattedDeposit": "¥0.00",
///         ...
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[serde(flatten)]
    pub user: User,

    pub formatted_balance: String,
    pub formatted_deposit: String,
    pub formatted_unfreezable: String,
    pub formatted_freezing: String,
    pub formatted_to_be_paid: String,

    /// Display label of the hitter identity.
    pub identity_label: String,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        Self {
            formatted_balance: format_yuan(user.balance),
            formatted_deposit: format_yuan(user.deposit),
            formatted_unfreezable: format_yuan(user.unfreezable_balance),
            formatted_freezing: format_yuan(user.freezing_balance),
            formatted_to_be_paid: format_yuan(user.to_be_paid),
            identity_label: user.hitter_identity.label().to_string(),
            user,
        }
    }
}

/// Result of a fund operation: the updated account and its journal line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundOperationResponse {
    pub account: AccountResponse,
    pub entry: LedgerEntry,
}

/// Journal page for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerHistoryResponse {
    pub entries: Vec<LedgerEntry>,

    /// Current offset.
    pub offset: usize,

    /// Number of items requested.
    pub limit: usize,
}

/// Quick-pick recharge amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RechargePresetsResponse {
    /// Amounts in fen.
    pub presets: Vec<i64>,

    /// Same amounts, formatted.
    pub formatted: Vec<String>,
}

/// Order detail with the hitter's computed share.
///
/// ## Example Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "id": "O4",
///         "status": "pendingSettlement",
///         "amount": 12000,
///         "serviceFee": 10,
///         "earnings": 10800,
///         "formattedAmount": "¥120.00",
///         "formattedEarnings": "¥108.00",
///         "statusLabel": "待结算",
///         ...
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: Order,

    /// Platform fee percentage applied (0 when the product has none).
    pub service_fee: u8,

    /// Hitter's share in fen.
    pub earnings: i64,

    pub formatted_amount: String,
    pub formatted_earnings: String,
    pub status_label: String,
}

/// Generated bounty description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionResponse {
    pub description: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status: always "healthy" once the server answers.
    pub status: String,

    /// Number of accounts in the store.
    pub users: usize,

    /// Number of orders in the store.
    pub orders: usize,

    /// Open WebSocket connections.
    pub ws_connections: usize,

    /// Whether bounty descriptions come from the AI endpoint.
    pub description_ai: bool,

    /// Service version.
    pub version: String,

    /// Current timestamp.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let resp = ApiResponse::<()>::error("BOUNTY_FULL", "Bounty B3 is full");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], "BOUNTY_FULL");
    }

    #[test]
    fn test_account_response_flattens_user() {
        let mut user = User::new("U9", "测试", "t@example.com");
        user.balance = 1_250;
        let json = serde_json::to_value(AccountResponse::from(user)).unwrap();
        assert_eq!(json["id"], "U9");
        assert_eq!(json["balance"], 1_250);
        assert_eq!(json["formattedBalance"], "¥12.50");
        assert_eq!(json["identityLabel"], "无身份");
    }
}
