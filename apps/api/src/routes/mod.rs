//! Route handlers and router assembly.

pub mod customer;
pub mod health;
pub mod invoice;
pub mod product;
pub mod staff;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Builds the full application router.
///
/// Exposed from the library crate so integration tests can drive the exact
/// router the binary serves.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/invoices", get(invoice::list).post(invoice::create))
        .route(
            "/invoices/{id}",
            get(invoice::get)
                .put(invoice::update)
                .delete(invoice::cancel),
        )
        .route("/customers", get(customer::list).post(customer::create))
        .route(
            "/customers/{id}",
            get(customer::get)
                .put(customer::update)
                .delete(customer::remove),
        )
        .route("/products", get(product::list).post(product::create))
        .route("/products/bulk", axum::routing::post(product::create_bulk))
        .route(
            "/products/{id}",
            get(product::get)
                .put(product::update)
                .delete(product::remove),
        )
        .route("/staff", get(staff::list).post(staff::create))
        .route("/staff/{id}", get(staff::get))
        .route(
            "/staff/{id}/attendance",
            get(staff::list_attendance).post(staff::record_attendance),
        )
        .with_state(state)
}
