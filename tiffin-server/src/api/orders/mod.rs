//! Orders API Module
//!
//! Customer-side reads, cancel and reorder; restaurant-side accept,
//! decline, status advance and payment correction.

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/cancel", post(handler::cancel))
        .route("/reorder", post(handler::reorder))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/accept", post(handler::accept))
        .route("/{id}/decline", post(handler::decline))
        .route("/{id}/status", patch(handler::advance_status))
        .route("/{id}/payment-status", patch(handler::correct_payment_status))
}
