pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/listings/:id", get(handlers::listings::get_listing))
        .route(
            "/api/listings/:id/availability",
            get(handlers::listings::availability_calendar),
        )
        .route(
            "/api/listings/:id/availability/:date/windows",
            get(handlers::listings::hourly_windows),
        )
        .route("/api/listings/:id/quote", get(handlers::listings::quote))
        .route("/api/listings/:id/wizard", get(handlers::wizard::step_plan))
        .route(
            "/api/listings/:id/wizard/check",
            post(handlers::wizard::check_step),
        )
        .route(
            "/api/listings/:id/draft",
            get(handlers::wizard::get_draft).put(handlers::wizard::save_draft),
        )
        .route("/api/listings/:id/bookings", post(handlers::wizard::submit))
        .route("/api/bookings", get(handlers::bookings::list_bookings))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route("/api/bookings/:id/approve", post(handlers::bookings::approve))
        .route("/api/bookings/:id/decline", post(handlers::bookings::decline))
        .route("/api/bookings/:id/cancel", post(handlers::bookings::cancel))
        .route(
            "/api/bookings/:id/shopper-cancel",
            post(handlers::bookings::shopper_cancel),
        )
        .route("/api/bookings/:id/pay", post(handlers::bookings::pay))
        .route("/api/bookings/:id/confirm", post(handlers::bookings::confirm))
        .route("/api/bookings/:id/dispute", post(handlers::bookings::open_dispute))
        .route(
            "/api/bookings/:id/dispute/close",
            post(handlers::bookings::close_dispute),
        )
        .route(
            "/api/bookings/:id/deposit",
            post(handlers::bookings::settle_deposit),
        )
        .route("/api/hosts/stats", get(handlers::bookings::host_stats))
        .route("/webhook/payments", post(handlers::webhook::payments_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
