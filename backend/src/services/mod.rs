//! # Services Module
//!
//! This module contains the business logic services of the club platform
//! backend. Each service handles a specific domain.
//!
//! ## Services Overview
//!
//! | Service | Responsibility |
//! |---------|---------------|
//! | `OrderManager` | Order lifecycle, hitter earnings |
//! | `FundLedger` | Recharge, deposit, unfreeze, payout, admin deduction |
//! | `BountyBoard` | Bounty postings and sign-ups |
//! | `Catalog` | Back-office data operations |
//! | `LedgerMonitor` | Totals, negative balance alerts |
//! | `DescriptionGenerator` | AI bounty descriptions with fallback |
//!
//! ## Service Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SERVICES LAYER                            │
//! │                                                                  │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │ OrderManager │  │  FundLedger  │  │ BountyBoard  │──┐        │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘  │        │
//! │         │                 │                 │          ▼        │
//! │         │   ┌─────────┐   │   ┌─────────┐   │   ┌────────────┐  │
//! │         │   │ Catalog │   │   │ Ledger  │   │   │Description │  │
//! │         │   └────┬────┘   │   │ Monitor │   │   │ Generator  │  │
//! │         │        │        │   └────┬────┘   │   └────────────┘  │
//! │         ▼        ▼        ▼        ▼        ▼                   │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │                     Store (in memory)                     │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod bounty_board;
pub mod catalog;
pub mod description_generator;
pub mod fund_ledger;
pub mod ledger_monitor;
pub mod order_lifecycle;

pub use bounty_board::{BountyBoard, BountyError};
pub use catalog::{Catalog, CatalogError};
pub use description_generator::{DescriptionGenerator, GeminiDescriptionGenerator};
pub use fund_ledger::{FundLedger, LedgerError, RECHARGE_PRESETS};
pub use ledger_monitor::LedgerMonitor;
pub use order_lifecycle::{OrderError, OrderManager};
