//! # Club Platform Backend Service
//!
//! Entry point of the club platform backend. It hosts the marketplace
//! state connecting bosses (buyers) and hitters (service providers):
//!
//! - REST API for orders, funds, bounties and back-office data
//! - WebSocket feed for real-time updates
//! - Background ledger monitor
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        BACKEND SERVICE                           │
//! │                                                                  │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  REST API   │  │  WebSocket  │  │   Background Services   │  │
//! │  │  (Actix)    │  │  /ws/:user  │  │  • Ledger Monitor       │  │
//! │  │  /orders    │  │             │  │                         │  │
//! │  │  /users     │  │             │  │                         │  │
//! │  │  /bounties  │  │             │  │                         │  │
//! │  │  /admin     │  │             │  │                         │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! │         │                │                     │                 │
//! │         └────────────────┴─────────────────────┘                 │
//! │                          │                                       │
//! │  ┌───────────────────────┴───────────────────────────────────┐  │
//! │  │                    SERVICE LAYER                           │  │
//! │  │  OrderManager · FundLedger · BountyBoard · Catalog        │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                       │
//! │  ┌───────────────────────┴───────────────────────────────────┐  │
//! │  │              Store (in memory, seeded at start)            │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! 1. Copy `.env.example` to `.env` and adjust
//! 2. Start the server: `cargo run`
//!
//! ## Environment Variables
//!
//! See `.env.example` for all options.

use std::str::FromStr;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod api;
mod config;
mod models;
mod services;
mod store;
mod utils;
mod websocket;

use config::AppConfig;
use services::{BountyBoard, Catalog, FundLedger, GeminiDescriptionGenerator, LedgerMonitor, OrderManager};
use store::Store;
use websocket::WsRegistry;

/// Application state shared across all handlers.
///
/// Every service holds a clone of the same [`Store`], so they all see one
/// set of collections.
pub struct AppState {
    /// In-memory collections
    pub store: Store,

    /// Order lifecycle service
    pub order_manager: OrderManager,

    /// User fund ledger service
    pub fund_ledger: FundLedger,

    /// Bounty board service
    pub bounty_board: BountyBoard,

    /// Back-office data service
    pub catalog: Catalog,

    /// WebSocket connection registry for real-time updates
    pub ws_registry: WsRegistry,
}

impl AppState {
    /// Wire every service to `store`.
    pub fn new(store: Store, config: AppConfig) -> Result<Self, reqwest::Error> {
        let generator = GeminiDescriptionGenerator::new(&config)?;

        Ok(Self {
            order_manager: OrderManager::new(store.clone()),
            fund_ledger: FundLedger::new(store.clone()),
            bounty_board: BountyBoard::new(store.clone(), config.clone(), Arc::new(generator)),
            catalog: Catalog::new(store.clone()),
            ws_registry: WsRegistry::new(),
            store,
        })
    }
}

/// Main entry point for the backend service.
///
/// This function:
/// 1. Loads configuration from environment
/// 2. Initializes logging
/// 3. Builds the store and services
/// 4. Starts the ledger monitor
/// 5. Launches the HTTP server
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // =========================================
    // STEP 1: Load Configuration
    // =========================================
    dotenvy::dotenv().ok(); // It's okay if .env doesn't exist

    let config = AppConfig::from_env().expect("Failed to load configuration");

    // =========================================
    // STEP 2: Initialize Logging
    // =========================================
    let level = Level::from_str(&config.log_level).unwrap_or(Level::DEBUG);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("🚀 Starting Club Platform Backend Service");
    info!("📋 Configuration loaded");
    info!("   Default bounty capacity: {}", config.default_bounty_capacity);
    info!("   Monitor interval: {}s", config.monitor_interval);
    if config.gemini_api_key.is_none() {
        warn!("   GEMINI_API_KEY not set, bounty descriptions use a placeholder");
    }

    // =========================================
    // STEP 3: Initialize Store
    // =========================================
    let store = if config.seed_mock_data {
        Store::seeded()
    } else {
        info!("🗄️  Starting with an empty store");
        Store::new()
    };

    // =========================================
    // STEP 4: Create Application State
    // =========================================
    let app_state = Arc::new(
        AppState::new(store, config.clone()).expect("Failed to build HTTP client"),
    );
    info!("🔧 Services initialized");

    // =========================================
    // STEP 5: Start Background Services
    // =========================================
    let monitor = LedgerMonitor::new(
        app_state.store.clone(),
        app_state.ws_registry.clone(),
        config.clone(),
    );
    tokio::spawn(async move {
        monitor.start().await;
    });

    info!("👁️  Ledger monitor started");

    // =========================================
    // STEP 6: Start HTTP Server
    // =========================================
    let server_host = config.server_host.clone();
    let server_port = config.server_port;

    info!("🌐 Starting HTTP server on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(api::configure_routes)
            .configure(websocket::configure_routes)
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
