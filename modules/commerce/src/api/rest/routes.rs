use axum::{
    routing::{get, patch, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::{AccountsService, CatalogService, CheckoutService};

/// Build the commerce REST surface. The services ride along as extensions
/// so handlers stay plain functions.
pub fn router(
    catalog: Arc<CatalogService>,
    accounts: Arc<AccountsService>,
    checkout: Arc<CheckoutService>,
) -> Router {
    Router::new()
        // GET /products - list the catalog
        .route("/products", get(handlers::list_products))
        // PATCH /products/update-stock - bulk stock decrement
        .route("/products/update-stock", patch(handlers::update_stock))
        // GET /products/{id} - single product
        .route("/products/{id}", get(handlers::get_product))
        // POST /register - create an account
        .route("/register", post(handlers::register))
        // POST /login - check credentials
        .route("/login", post(handlers::login))
        // POST /orders - checkout; GET /orders?userId= - order history
        .route(
            "/orders",
            post(handlers::place_order).get(handlers::list_orders),
        )
        .layer(Extension(catalog))
        .layer(Extension(accounts))
        .layer(Extension(checkout))
}
