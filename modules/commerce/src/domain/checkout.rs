use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};

use crate::contract::model::{CartItem, OrderSummary, PlacedOrder};
use crate::domain::error::DomainError;
use crate::infra::storage::entity::{order_items, orders, products};
use crate::infra::storage::mapper;

/// Converts a validated cart into a persisted order. The whole checkout is
/// one transaction: order header, order lines and stock decrements all land
/// together or not at all.
#[derive(Clone)]
pub struct CheckoutService {
    db: DatabaseConnection,
}

impl CheckoutService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(name = "commerce.checkout.place_order", skip(self, items), fields(user_id = %user_id, lines = items.len()))]
    pub async fn place_order(
        &self,
        user_id: i64,
        items: Vec<CartItem>,
    ) -> Result<PlacedOrder, DomainError> {
        info!("Placing order");

        Self::validate_cart(user_id, &items)?;

        let txn = self.db.begin().await.map_err(DomainError::storage)?;
        match Self::place_order_in(&txn, user_id, &items).await {
            Ok(order) => {
                txn.commit().await.map_err(DomainError::storage)?;
                info!("Order {} placed, total {}", order.id, order.total_price);
                Ok(order)
            }
            Err(e) => {
                // keep the original failure; a rollback error is secondary
                let _ = txn.rollback().await;
                Err(e)
            }
        }
    }

    async fn place_order_in<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        items: &[CartItem],
    ) -> Result<PlacedOrder, DomainError> {
        // Authoritative prices come from the catalog rows read inside the
        // transaction, never from the client.
        let mut priced_lines = Vec::with_capacity(items.len());
        let mut total = Decimal::ZERO;
        for item in items {
            let product = products::find_by_id(conn, item.product_id)
                .await
                .map_err(DomainError::storage)?
                .ok_or_else(|| {
                    DomainError::insufficient_stock(item.product_id, item.quantity, 0)
                })?;
            if item.quantity > product.stock {
                return Err(DomainError::insufficient_stock(
                    item.product_id,
                    item.quantity,
                    product.stock,
                ));
            }
            total += product.price * Decimal::from(item.quantity);
            priced_lines.push((item.product_id, item.quantity, product.price));
        }

        let order = orders::insert(conn, user_id, Utc::now(), total)
            .await
            .map_err(DomainError::storage)?;

        for (product_id, quantity, price_per_unit) in priced_lines {
            order_items::insert(conn, order.id, product_id, quantity, price_per_unit)
                .await
                .map_err(DomainError::storage)?;

            // A concurrent checkout may have depleted the row since we read
            // it; the guarded UPDATE re-checks stock >= quantity.
            let applied = products::decrement_stock_guarded(conn, product_id, quantity)
                .await
                .map_err(DomainError::storage)?;
            if !applied {
                let available = products::find_by_id(conn, product_id)
                    .await
                    .map_err(DomainError::storage)?
                    .map(|p| p.stock)
                    .unwrap_or(0);
                return Err(DomainError::insufficient_stock(
                    product_id, quantity, available,
                ));
            }
        }

        Ok(PlacedOrder {
            id: order.id,
            total_price: total,
        })
    }

    #[instrument(name = "commerce.checkout.list_orders", skip(self), fields(user_id = %user_id))]
    pub async fn list_orders_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<OrderSummary>, DomainError> {
        debug!("Listing order history");

        let rows = orders::find_for_user_newest_first(&self.db, user_id)
            .await
            .map_err(DomainError::storage)?;
        Ok(rows.into_iter().map(mapper::order_to_summary).collect())
    }

    // --- validation helpers ---

    fn validate_cart(user_id: i64, items: &[CartItem]) -> Result<(), DomainError> {
        if user_id <= 0 {
            return Err(DomainError::invalid_cart("userId is required"));
        }
        if items.is_empty() {
            return Err(DomainError::invalid_cart(
                "cart must contain at least one item",
            ));
        }
        for item in items {
            if item.quantity <= 0 {
                return Err(DomainError::invalid_cart(format!(
                    "quantity must be positive for product {}",
                    item.product_id
                )));
            }
        }
        Ok(())
    }
}
