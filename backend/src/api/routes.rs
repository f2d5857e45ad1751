//! # API Route Configuration
//!
//! This module sets up all the HTTP routes for the API.

use actix_web::web;

use super::handlers;

/// Configure all API routes.
///
/// ## Route Structure
///
/// ```text
/// /
/// ├── /health                      GET
/// ├── /products                    GET  ?category=
/// ├── /orders                      GET  ?status=&hitterId=   POST
/// │   ├── /hall                    GET  ?platform=
/// │   └── /:id                     GET
/// │       ├── /pay                 POST
/// │       ├── /accept              POST
/// │       ├── /settle              POST
/// │       ├── /complete            POST
/// │       └── /after-sales         POST
/// ├── /users/:id                   GET
/// │   ├── /ledger                  GET
/// │   ├── /recharge-balance        POST
/// │   ├── /recharge-deposit        POST
/// │   ├── /unfreeze                POST
/// │   └── /payout                  POST
/// ├── /ledger/presets              GET
/// ├── /bounties                    GET POST
/// │   ├── /describe                POST
/// │   └── /:id/{sign-up,close}     POST
/// └── /admin
///     ├── /products[/:id]          GET POST PUT DELETE
///     ├── /users[/:id]             GET PUT DELETE
///     │   └── /:id/{toggle-status,deduct}  POST
///     ├── /teams[/:id]             GET POST PUT DELETE
///     │   └── /:id/toggle-status   POST
///     ├── /complaints              GET POST
///     │   └── /:id/status          PUT
///     ├── /announcements[/:id]     GET POST PUT DELETE
///     ├── /ad-slots[/:id]          GET PUT
///     └── /settings                GET PUT
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(handlers::api_info))
        .route("/health", web::get().to(handlers::health_check))
        .route("/products", web::get().to(handlers::list_products))
        .route("/ledger/presets", web::get().to(handlers::recharge_presets))

        // Order lifecycle
        .service(
            web::scope("/orders")
                .route("", web::get().to(handlers::list_orders))
                .route("", web::post().to(handlers::place_order))
                // before /{id}
                .route("/hall", web::get().to(handlers::order_hall))
                .route("/{id}", web::get().to(handlers::get_order))
                .route("/{id}/pay", web::post().to(handlers::pay_order))
                .route("/{id}/accept", web::post().to(handlers::accept_order))
                .route("/{id}/settle", web::post().to(handlers::settle_order))
                .route("/{id}/complete", web::post().to(handlers::complete_order))
                .route("/{id}/after-sales", web::post().to(handlers::open_after_sales)),
        )

        // Fund ledger
        .service(
            web::scope("/users/{id}")
                .route("", web::get().to(handlers::get_user))
                .route("/ledger", web::get().to(handlers::get_ledger))
                .route("/recharge-balance", web::post().to(handlers::recharge_balance))
                .route("/recharge-deposit", web::post().to(handlers::recharge_deposit))
                .route("/unfreeze", web::post().to(handlers::unfreeze))
                .route("/payout", web::post().to(handlers::payout)),
        )

        // Bounty board
        .service(
            web::scope("/bounties")
                .route("", web::get().to(handlers::list_bounties))
                .route("", web::post().to(handlers::create_bounty))
                .route("/describe", web::post().to(handlers::describe_bounty))
                .route("/{id}/sign-up", web::post().to(handlers::sign_up))
                .route("/{id}/close", web::post().to(handlers::close_bounty)),
        )

        // Back-office
        .service(
            web::scope("/admin")
                .route("/products", web::get().to(handlers::list_products))
                .route("/products", web::post().to(handlers::create_product))
                .route("/products/{id}", web::get().to(handlers::get_product))
                .route("/products/{id}", web::put().to(handlers::replace_product))
                .route("/products/{id}", web::delete().to(handlers::delete_product))

                .route("/users", web::get().to(handlers::list_users))
                .route("/users/{id}", web::get().to(handlers::get_user))
                .route("/users/{id}", web::put().to(handlers::edit_user))
                .route("/users/{id}", web::delete().to(handlers::delete_user))
                .route("/users/{id}/toggle-status", web::post().to(handlers::toggle_user_status))
                .route("/users/{id}/deduct", web::post().to(handlers::admin_deduct))

                .route("/teams", web::get().to(handlers::list_teams))
                .route("/teams", web::post().to(handlers::create_team))
                .route("/teams/{id}", web::put().to(handlers::update_team))
                .route("/teams/{id}", web::delete().to(handlers::delete_team))
                .route("/teams/{id}/toggle-status", web::post().to(handlers::toggle_team_status))

                .route("/complaints", web::get().to(handlers::list_complaints))
                .route("/complaints", web::post().to(handlers::create_complaint))
                .route("/complaints/{id}/status", web::put().to(handlers::set_complaint_status))

                .route("/announcements", web::get().to(handlers::list_announcements))
                .route("/announcements", web::post().to(handlers::create_announcement))
                .route("/announcements/{id}", web::put().to(handlers::replace_announcement))
                .route("/announcements/{id}", web::delete().to(handlers::delete_announcement))

                .route("/ad-slots", web::get().to(handlers::list_ad_slots))
                .route("/ad-slots/{id}", web::put().to(handlers::update_ad_slot))

                .route("/settings", web::get().to(handlers::get_settings))
                .route("/settings", web::put().to(handlers::replace_settings)),
        );
}
