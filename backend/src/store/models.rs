//! # Store Models
//!
//! This module defines the records held by the in-memory store.
//! Each struct represents one element of a collection.
//!
//! ## Collection Overview
//!
//! | Collection | Description |
//! |------------|-------------|
//! | `products` | Service catalog (陪练, 上分, ...) |
//! | `users` | Accounts with their fund ledger |
//! | `orders` | Catalog purchases moving through the order lifecycle |
//! | `bounties` | Ad-hoc paid requests on the public board |
//! | `teams` | Hitter teams |
//! | `complaints` | Customer complaints against orders |
//! | `announcements` | Platform notices |
//! | `ad_slots` | Fixed advertising positions |
//! | `ledger` | Journal of every fund mutation |
//!
//! ## Money
//!
//! All amounts are `i64` fen (1 yuan = 100 fen). Signed because an admin
//! deduction can push a balance below zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// SHARED ENUMS
// ==========================================

/// Device platform a product, order or bounty targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    Mobile,
    Pc,
}

/// Active/frozen flag shared by users and teams.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AccountStatus {
    Active,
    Frozen,
}

impl AccountStatus {
    /// The opposite status, used by the admin toggle.
    pub fn toggled(self) -> Self {
        match self {
            AccountStatus::Active => AccountStatus::Frozen,
            AccountStatus::Frozen => AccountStatus::Active,
        }
    }
}

/// Hitter identity tiers. Some products grant one on purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum HitterIdentity {
    #[default]
    None,
    Normal,
    Vip,
    SuperVip,
    Auditor,
}

impl HitterIdentity {
    /// Display label used by the client.
    pub fn label(&self) -> &'static str {
        match self {
            HitterIdentity::None => "无身份",
            HitterIdentity::Normal => "普通打手",
            HitterIdentity::Vip => "VIP打手",
            HitterIdentity::SuperVip => "超级VIP打手",
            HitterIdentity::Auditor => "审核员",
        }
    }
}

// ==========================================
// PRODUCTS
// ==========================================

/// Special handling a product may carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SpecialType {
    VipCertification,
    Assessment,
}

/// A catalog product.
///
/// Replaced wholesale by the admin edit operation; never patched field by
/// field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Price in fen.
    pub price: i64,
    pub images: Vec<String>,
    pub sales: u32,
    pub category: String,
    pub description: String,
    pub badge: Option<String>,
    pub platform: Option<Platform>,
    pub special_type: Option<SpecialType>,
    /// Identity granted to the buyer, if any.
    pub grants_identity: Option<HitterIdentity>,
    /// Platform fee percentage (1-50).
    pub service_fee: Option<u8>,
}

// ==========================================
// ORDERS
// ==========================================

/// Order status.
///
/// The main sequence only moves forward:
///
/// ```text
/// PendingPayment → PendingAccept → InProgress → PendingSettlement → Completed
/// ```
///
/// `AfterSales` is a side state entered when a dispute is opened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    PendingPayment,
    PendingAccept,
    InProgress,
    PendingSettlement,
    Completed,
    AfterSales,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::PendingPayment,
        OrderStatus::PendingAccept,
        OrderStatus::InProgress,
        OrderStatus::PendingSettlement,
        OrderStatus::Completed,
        OrderStatus::AfterSales,
    ];

    /// Display label used by the client.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "待付款",
            OrderStatus::PendingAccept => "待接单",
            OrderStatus::InProgress => "服务中",
            OrderStatus::PendingSettlement => "待结算",
            OrderStatus::Completed => "已完成",
            OrderStatus::AfterSales => "售后中",
        }
    }
}

/// A catalog purchase.
///
/// ## Invariants
///
/// - `accept_time` is set exactly when the order enters `InProgress`
/// - `completion_time` is set exactly when the order enters `Completed`
/// - `hitter_id` and `hitter_earnings` are set together with `accept_time`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub status: OrderStatus,
    /// Amount paid by the boss, in fen.
    pub amount: i64,
    /// Boss who placed the order.
    pub user_id: String,
    pub user_name: String,
    /// Hitter who accepted the order.
    pub hitter_id: Option<String>,
    /// Hitter's share after the platform fee, fixed at acceptance.
    pub hitter_earnings: Option<i64>,
    pub platform: Option<Platform>,
    pub game_id: String,
    pub server: String,
    pub notes: String,
    pub text_id: String,
    pub order_time: DateTime<Utc>,
    pub accept_time: Option<DateTime<Utc>>,
    pub completion_time: Option<DateTime<Utc>>,
}

// ==========================================
// USERS
// ==========================================

/// Back-office role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    User,
}

/// A platform account and its fund ledger.
///
/// ## Ledger Fields
///
/// | Field | Meaning |
/// |-------|---------|
/// | balance | Spendable funds |
/// | deposit | Staked collateral (保证金) |
/// | frozen_balance | Funds frozen by the platform |
/// | unfreezable_balance | Settled earnings the user may release into `balance` |
/// | freezing_balance | Earnings of accepted, unsettled orders |
/// | to_be_paid | Compensation owed (待赔付) |
/// | paid_out | Compensation already paid (已赔付) |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: AccountStatus,
    pub balance: i64,
    pub deposit: i64,
    pub frozen_balance: i64,
    pub unfreezable_balance: i64,
    pub freezing_balance: i64,
    pub to_be_paid: i64,
    pub paid_out: i64,
    pub hitter_level: String,
    pub hitter_identity: HitterIdentity,
    pub vip_level: String,
    pub income_level: String,
    pub seniority_level: String,
    pub badges: Vec<String>,
    pub team_id: Option<String>,
    pub upline_user_id: Option<String>,
}

impl User {
    /// Create an active user with an empty ledger.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: UserRole::User,
            status: AccountStatus::Active,
            balance: 0,
            deposit: 0,
            frozen_balance: 0,
            unfreezable_balance: 0,
            freezing_balance: 0,
            to_be_paid: 0,
            paid_out: 0,
            hitter_level: String::new(),
            hitter_identity: HitterIdentity::None,
            vip_level: String::new(),
            income_level: String::new(),
            seniority_level: String::new(),
            badges: Vec::new(),
            team_id: None,
            upline_user_id: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

// ==========================================
// BOUNTIES
// ==========================================

/// Bounty status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BountyStatus {
    InProgress,
    Completed,
}

/// A posting on the bounty board.
///
/// `participants <= max_participants` holds after every sign-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bounty {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Reward in fen.
    pub reward: i64,
    pub status: BountyStatus,
    pub participants: u32,
    pub max_participants: u32,
    pub platform: Option<Platform>,
}

impl Bounty {
    pub fn is_full(&self) -> bool {
        self.participants >= self.max_participants
    }
}

// ==========================================
// BACK-OFFICE RECORDS
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub leader_name: String,
    pub leader_id: String,
    pub member_count: u32,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

/// Complaint handling status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    pub user_name: String,
    pub subject: String,
    pub details: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdSlot {
    pub id: String,
    pub name: String,
    pub content: String,
    pub link: String,
}

// ==========================================
// SETTINGS
// ==========================================

/// How a hitter identity is shown and which product certifies it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySetting {
    pub identity: HitterIdentity,
    pub name: String,
    pub required_product_id: Option<String>,
    pub icon_url: String,
}

/// One rung of a level table, reached at `required_income` fen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelSetting {
    pub name: String,
    pub required_income: i64,
    /// `#RRGGBB`
    pub halo_color: Option<String>,
}

impl LevelSetting {
    fn new(name: &str, required_income: i64, halo_color: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            required_income,
            halo_color: halo_color.map(str::to_string),
        }
    }
}

/// Display names of the platform, its modules and its two roles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NamingSettings {
    pub platform_name: String,
    pub home_module: String,
    pub category_module: String,
    pub bar_module: String,
    pub profile_module: String,
    pub boss_role: String,
    pub hitter_role: String,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            platform_name: "俱乐部平台".to_string(),
            home_module: "首页".to_string(),
            category_module: "分类".to_string(),
            bar_module: "酒吧".to_string(),
            profile_module: "我的".to_string(),
            boss_role: "老板".to_string(),
            hitter_role: "打手".to_string(),
        }
    }
}

/// Admin-editable platform configuration, replaced as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    pub identities: Vec<IdentitySetting>,
    pub hitter_levels: Vec<LevelSetting>,
    pub boss_levels: Vec<LevelSetting>,
    pub naming: NamingSettings,
    /// Percent taken on withdrawals, 0-100.
    pub withdrawal_fee: u8,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        let identities = [
            (HitterIdentity::Normal, None),
            (HitterIdentity::Vip, Some("P8")),
            (HitterIdentity::SuperVip, None),
            (HitterIdentity::Auditor, None),
        ]
        .into_iter()
        .map(|(identity, product)| IdentitySetting {
            identity,
            name: identity.label().to_string(),
            required_product_id: product.map(str::to_string),
            icon_url: String::new(),
        })
        .collect();

        Self {
            identities,
            hitter_levels: vec![
                LevelSetting::new("新手打手", 0, None),
                LevelSetting::new("精英打手", 100_000, Some("#3B82F6")),
                LevelSetting::new("大师打手", 500_000, Some("#A855F7")),
                LevelSetting::new("传奇打手", 2_000_000, Some("#F59E0B")),
            ],
            boss_levels: vec![
                LevelSetting::new("普通老板", 0, None),
                LevelSetting::new("白银老板", 50_000, Some("#9CA3AF")),
                LevelSetting::new("黄金老板", 200_000, Some("#EAB308")),
                LevelSetting::new("钻石老板", 1_000_000, Some("#22D3EE")),
            ],
            naming: NamingSettings::default(),
            withdrawal_fee: 5,
        }
    }
}

// ==========================================
// LEDGER JOURNAL
// ==========================================

/// Kind of fund mutation recorded in the journal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    /// Spendable balance topped up
    RechargeBalance,
    /// Balance moved into the deposit
    RechargeDeposit,
    /// Settled earnings released into the balance
    Unfreeze,
    /// Compensation paid from the balance
    Payout,
    /// Admin deduction from the balance
    AdminDeduction,
    /// Earnings of an accepted order started freezing
    OrderAccepted,
    /// Earnings of a settled order became unfreezable
    OrderSettled,
}

/// One journal line.
///
/// Every successful fund mutation appends exactly one entry; the journal
/// is never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: String,
    pub kind: LedgerEntryKind,
    /// Amount moved, always positive.
    pub amount: i64,
    /// Spendable balance before the mutation.
    pub balance_before: i64,
    /// Spendable balance after the mutation.
    pub balance_after: i64,
    pub order_id: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate figures reported by the ledger monitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformTotals {
    pub users: usize,
    pub total_balance: i64,
    pub total_deposit: i64,
    pub total_freezing: i64,
    pub total_to_be_paid: i64,
    pub total_paid_out: i64,
    /// Earnings still freezing on orders that went to after-sales before
    /// completion. No transition releases them.
    pub after_sales_held: i64,
    pub orders_by_status: Vec<(OrderStatus, usize)>,
    pub open_bounties: usize,
}
