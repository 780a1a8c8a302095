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

use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/getBookings", get(handlers::bookings::get_bookings))
        .route("/api/addBooking", post(handlers::bookings::add_booking))
        .route(
            "/api/updateBookingStatus",
            post(handlers::bookings::update_booking_status),
        )
        .route("/api/estimatePrice", post(handlers::bookings::estimate_price))
        .route("/api/signup", post(handlers::auth::signup))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
        .route("/api/me", get(handlers::auth::me))
        .with_state(state)
}
