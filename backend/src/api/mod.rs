//! # REST API Module
//!
//! This module defines all HTTP endpoints of the club platform API.
//!
//! ## Endpoint Overview
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/products` | Browse the catalog |
//! | GET | `/orders/hall` | Orders waiting for a hitter |
//! | POST | `/orders` | Place an order |
//! | POST | `/orders/:id/{pay,accept,settle,complete,after-sales}` | Order transitions |
//! | GET | `/users/:id` | Account and ledger figures |
//! | POST | `/users/:id/{recharge-balance,recharge-deposit,unfreeze,payout}` | Fund operations |
//! | GET | `/users/:id/ledger` | Fund journal |
//! | GET/POST | `/bounties` | Bounty board |
//! | POST | `/bounties/:id/sign-up` | Take a place |
//! | * | `/admin/...` | Back-office data |
//! | GET | `/health` | Health check |
//!
//! ## Request/Response Format
//!
//! All requests and responses use camelCase JSON:
//!
//! ```json
//! // Success response
//! {
//!     "success": true,
//!     "data": { ... }
//! }
//!
//! // Error response
//! {
//!     "success": false,
//!     "error": {
//!         "code": "ERROR_CODE",
//!         "message": "Human readable message"
//!     }
//! }
//! ```

pub mod handlers;
pub mod routes;

pub use routes::configure_routes;
