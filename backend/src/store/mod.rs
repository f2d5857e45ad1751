//! # Store Module
//!
//! This module holds every entity of the platform in memory. There is no
//! database: collections are seeded at start-up and live for the lifetime
//! of the process.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         STORE LAYER                              │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │             Arc<RwLock<StoreData>> (tokio)                │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! │                              │                                   │
//! │     ┌──────────┬─────────────┼─────────────┬──────────┐         │
//! │     ▼          ▼             ▼             ▼          ▼         │
//! │  products    users        orders       bounties    ledger       │
//! │                                                                  │
//! │  teams · complaints · announcements · ad_slots                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Discipline
//!
//! A service takes the write guard once per operation, validates,
//! mutates and journals, then drops it. Validation always happens before
//! the first mutation, so an error never leaves a half-applied change.

pub mod models;
pub mod queries;
pub mod seed;

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

pub use models::*;

/// Store-level errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id in the named collection
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        StoreError::NotFound { kind, id: id.to_string() }
    }
}

/// All collections, guarded together by the store lock.
#[derive(Debug, Default, Clone)]
pub struct StoreData {
    pub products: Vec<Product>,
    pub users: Vec<User>,
    pub orders: Vec<Order>,
    pub bounties: Vec<Bounty>,
    pub teams: Vec<Team>,
    pub complaints: Vec<Complaint>,
    pub announcements: Vec<Announcement>,
    pub ad_slots: Vec<AdSlot>,
    pub ledger: Vec<LedgerEntry>,
    pub settings: PlatformSettings,
}

/// Shared handle to the in-memory collections.
///
/// Cloning is cheap; all clones see the same data.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<StoreData>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with the given collections.
    pub fn with_data(data: StoreData) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    /// Create a store loaded with the demo catalog.
    pub fn seeded() -> Self {
        let data = seed::mock_data();
        info!(
            "Seeded store: {} products, {} users, {} orders, {} bounties",
            data.products.len(),
            data.users.len(),
            data.orders.len(),
            data.bounties.len()
        );
        Self::with_data(data)
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, StoreData> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, StoreData> {
        self.inner.write().await
    }
}
