use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::problem::ProblemResponse;
use crate::api::rest::dto::{
    ListOrdersQuery, LoginReq, LoginRespDto, OrderCreatedDto, OrderSummaryDto, PlaceOrderReq,
    ProductDto, RegisterReq, StockUpdateDto, UpdateStockReq, UserSummaryDto,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::error::DomainError;
use crate::domain::{AccountsService, CatalogService, CheckoutService};

/// List the whole catalog
pub async fn list_products(
    Extension(catalog): Extension<Arc<CatalogService>>,
    uri: Uri,
) -> Result<Json<Vec<ProductDto>>, ProblemResponse> {
    match catalog.list_products().await {
        Ok(products) => Ok(Json(products.into_iter().map(ProductDto::from).collect())),
        Err(e) => {
            error!("Failed to list products: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a single product by id
pub async fn get_product(
    Extension(catalog): Extension<Arc<CatalogService>>,
    Path(id): Path<i64>,
    uri: Uri,
) -> Result<Json<ProductDto>, ProblemResponse> {
    match catalog.get_product(id).await {
        Ok(product) => Ok(Json(ProductDto::from(product))),
        Err(e) => {
            error!("Failed to get product {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Apply a batch of stock decrements
pub async fn update_stock(
    Extension(catalog): Extension<Arc<CatalogService>>,
    uri: Uri,
    Json(req): Json<UpdateStockReq>,
) -> Result<Json<StockUpdateDto>, ProblemResponse> {
    info!("Stock update requested");

    let items = match req.items {
        Some(items) => items.into_iter().map(Into::into).collect(),
        None => {
            let e = DomainError::validation("items are required");
            return Err(map_domain_error(&e, uri.path()));
        }
    };

    match catalog.adjust_stock(items).await {
        Ok(outcome) => Ok(Json(StockUpdateDto::from(outcome))),
        Err(e) => {
            error!("Failed to update stock: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Register a new account
pub async fn register(
    Extension(accounts): Extension<Arc<AccountsService>>,
    uri: Uri,
    Json(req): Json<RegisterReq>,
) -> Result<(StatusCode, Json<UserSummaryDto>), ProblemResponse> {
    info!("Registration requested");

    match accounts.register(req.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserSummaryDto::from(user)))),
        Err(e) => {
            error!("Failed to register account: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Log into an existing account
pub async fn login(
    Extension(accounts): Extension<Arc<AccountsService>>,
    uri: Uri,
    Json(req): Json<LoginReq>,
) -> Result<Json<LoginRespDto>, ProblemResponse> {
    info!("Login requested");

    match accounts.login(req.into()).await {
        Ok(user) => Ok(Json(LoginRespDto {
            user: UserSummaryDto::from(user),
        })),
        Err(e) => {
            error!("Failed login: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Convert a cart into an order
pub async fn place_order(
    Extension(checkout): Extension<Arc<CheckoutService>>,
    uri: Uri,
    Json(req): Json<PlaceOrderReq>,
) -> Result<(StatusCode, Json<OrderCreatedDto>), ProblemResponse> {
    info!("Checkout requested");

    let user_id = match req.user_id {
        Some(id) => id,
        None => {
            let e = DomainError::invalid_cart("userId is required");
            return Err(map_domain_error(&e, uri.path()));
        }
    };
    let items: Vec<_> = match req.items {
        Some(items) => items.into_iter().map(Into::into).collect(),
        None => {
            let e = DomainError::invalid_cart("cart must contain at least one item");
            return Err(map_domain_error(&e, uri.path()));
        }
    };

    match checkout.place_order(user_id, items).await {
        Ok(order) => Ok((StatusCode::CREATED, Json(OrderCreatedDto::from(order)))),
        Err(e) => {
            error!("Failed to place order for user {}: {}", user_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Order history of one user, newest first
pub async fn list_orders(
    Extension(checkout): Extension<Arc<CheckoutService>>,
    Query(query): Query<ListOrdersQuery>,
    uri: Uri,
) -> Result<Json<Vec<OrderSummaryDto>>, ProblemResponse> {
    let user_id = match query.user_id {
        Some(id) => id,
        None => {
            let e = DomainError::validation("userId query parameter is required");
            return Err(map_domain_error(&e, uri.path()));
        }
    };

    match checkout.list_orders_for_user(user_id).await {
        Ok(orders) => Ok(Json(orders.into_iter().map(OrderSummaryDto::from).collect())),
        Err(e) => {
            error!("Failed to list orders for user {}: {}", user_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
