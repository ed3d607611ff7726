use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Pure catalog product model for inter-module communication (no serde)
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub category: Option<String>,
    pub stock: i32,
}

/// Registered account, without any credential material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Data for registering a new account; `password` is plaintext and is
/// hashed before it ever reaches storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// One line of a client-submitted cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i32,
}

/// Result of a successful checkout
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub id: i64,
    pub total_price: Decimal,
}

/// One order as seen in a user's order history
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub id: i64,
    pub order_date: DateTime<Utc>,
    pub total_price: Decimal,
}

/// One requested stock decrement in a bulk adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: i64,
    pub quantity: i32,
}

/// Counts reported after seeding the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub inserted: usize,
    pub updated: usize,
}

/// Outcome of a bulk stock adjustment: which product ids were decremented
/// and which were skipped (unknown id or not enough stock)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockAdjustmentOutcome {
    pub updated: Vec<i64>,
    pub skipped: Vec<i64>,
}
