//! Kundeshop HTTP adapter library.
//!
//! Thin axum layer over `kundeshop-engine`: endpoint handlers, wire-shape
//! normalization, and the JSON error envelope. Exposed as a library so
//! the router can be exercised in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::{Router, routing::get, routing::post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/add-to-collection", post(routes::add_to_collection))
        .route("/remove-from-collection", post(routes::remove_from_collection))
        .route("/assign-variant", post(routes::assign_variant))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
