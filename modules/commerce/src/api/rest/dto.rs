use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::contract::model::{
    CartItem, Credentials, NewUser, OrderSummary, PlacedOrder, Product, StockAdjustment,
    StockAdjustmentOutcome, User,
};

/// REST DTO for a catalog product. Also the schema of seed files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub category: Option<String>,
    pub stock: i32,
}

/// REST DTO for registration. Deliberately no Debug/Serialize: the plaintext
/// password must not end up in logs or responses.
#[derive(Clone, Deserialize)]
pub struct RegisterReq {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// REST DTO for login; same no-Debug rule as RegisterReq.
#[derive(Clone, Deserialize)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// REST DTO for an account, without credential material
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDto {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// REST DTO for a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRespDto {
    pub user: UserSummaryDto,
}

/// REST DTO for one cart line. `price` is accepted for wire compatibility
/// and discarded; the catalog price is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineReq {
    pub id: i64,
    pub quantity: i32,
    pub price: Option<Decimal>,
}

/// REST DTO for checkout. Presence of both fields is validated in the
/// handler so the failure surfaces as an INVALID_CART problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderReq {
    pub user_id: Option<i64>,
    pub items: Option<Vec<CartLineReq>>,
}

/// REST DTO for a created order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedDto {
    pub order_id: i64,
    pub total_price: Decimal,
}

/// REST DTO for one order history line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryDto {
    pub id: i64,
    pub order_date: DateTime<Utc>,
    pub total_price: Decimal,
}

/// REST DTO for query parameters of the order history endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub user_id: Option<i64>,
}

/// REST DTO for one requested stock decrement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLineReq {
    pub id: i64,
    pub quantity: i32,
}

/// REST DTO for a bulk stock adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockReq {
    pub items: Option<Vec<StockLineReq>>,
}

/// REST DTO for the outcome of a bulk stock adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateDto {
    pub updated: Vec<i64>,
    pub skipped: Vec<i64>,
}

// Conversion implementations between REST DTOs and contract models

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            image: product.image,
            rating: product.rating,
            review_count: product.review_count,
            category: product.category,
            stock: product.stock,
        }
    }
}

impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            price: dto.price,
            image: dto.image,
            rating: dto.rating,
            review_count: dto.review_count,
            category: dto.category,
            stock: dto.stock,
        }
    }
}

impl From<RegisterReq> for NewUser {
    fn from(req: RegisterReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

impl From<LoginReq> for Credentials {
    fn from(req: LoginReq) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

impl From<User> for UserSummaryDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<CartLineReq> for CartItem {
    fn from(line: CartLineReq) -> Self {
        Self {
            product_id: line.id,
            quantity: line.quantity,
        }
    }
}

impl From<PlacedOrder> for OrderCreatedDto {
    fn from(order: PlacedOrder) -> Self {
        Self {
            order_id: order.id,
            total_price: order.total_price,
        }
    }
}

impl From<OrderSummary> for OrderSummaryDto {
    fn from(summary: OrderSummary) -> Self {
        Self {
            id: summary.id,
            order_date: summary.order_date,
            total_price: summary.total_price,
        }
    }
}

impl From<StockLineReq> for StockAdjustment {
    fn from(line: StockLineReq) -> Self {
        Self {
            product_id: line.id,
            quantity: line.quantity,
        }
    }
}

impl From<StockAdjustmentOutcome> for StockUpdateDto {
    fn from(outcome: StockAdjustmentOutcome) -> Self {
        Self {
            updated: outcome.updated,
            skipped: outcome.skipped,
        }
    }
}
