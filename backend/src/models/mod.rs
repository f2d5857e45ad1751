//! # API Models
//!
//! Wire shapes of the REST API. Store records are returned as-is where they
//! fit; the types here cover request bodies, query strings and responses
//! that add formatted yuan amounts or labels.
//!
//! - `requests.rs` - bodies and query strings
//! - `responses.rs` - the `ApiResponse` envelope and enriched views

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
