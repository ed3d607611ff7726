use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};

use crate::contract::model::{Product, SeedReport, StockAdjustment, StockAdjustmentOutcome};
use crate::domain::error::DomainError;
use crate::infra::storage::entity::products;
use crate::infra::storage::mapper;

/// Catalog reads plus the two write paths that exist for products:
/// bulk stock adjustment and seeding.
#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(name = "commerce.catalog.list_products", skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        debug!("Listing catalog");

        let rows = products::find_all(&self.db)
            .await
            .map_err(DomainError::storage)?;
        Ok(rows.into_iter().map(mapper::product_to_contract).collect())
    }

    #[instrument(name = "commerce.catalog.get_product", skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: i64) -> Result<Product, DomainError> {
        debug!("Getting product by id");

        let row = products::find_by_id(&self.db, id)
            .await
            .map_err(DomainError::storage)?
            .ok_or_else(|| DomainError::product_not_found(id))?;
        Ok(mapper::product_to_contract(row))
    }

    /// Apply a batch of stock decrements. Each line is guarded individually:
    /// lines whose product is unknown or short on stock are skipped and
    /// reported, the rest apply. The batch itself commits atomically.
    #[instrument(name = "commerce.catalog.adjust_stock", skip(self, items), fields(lines = items.len()))]
    pub async fn adjust_stock(
        &self,
        items: Vec<StockAdjustment>,
    ) -> Result<StockAdjustmentOutcome, DomainError> {
        info!("Adjusting stock");

        Self::validate_adjustments(&items)?;

        let txn = self.db.begin().await.map_err(DomainError::storage)?;
        match Self::adjust_stock_in(&txn, &items).await {
            Ok(outcome) => {
                txn.commit().await.map_err(DomainError::storage)?;
                info!(
                    "Stock adjusted: {} updated, {} skipped",
                    outcome.updated.len(),
                    outcome.skipped.len()
                );
                Ok(outcome)
            }
            Err(e) => {
                let _ = txn.rollback().await;
                Err(e)
            }
        }
    }

    async fn adjust_stock_in<C: ConnectionTrait>(
        conn: &C,
        items: &[StockAdjustment],
    ) -> Result<StockAdjustmentOutcome, DomainError> {
        let mut outcome = StockAdjustmentOutcome::default();
        for item in items {
            let applied =
                products::decrement_stock_guarded(conn, item.product_id, item.quantity)
                    .await
                    .map_err(DomainError::storage)?;
            if applied {
                outcome.updated.push(item.product_id);
            } else {
                outcome.skipped.push(item.product_id);
            }
        }
        Ok(outcome)
    }

    /// Insert-or-replace a batch of catalog rows by id, in one transaction.
    #[instrument(name = "commerce.catalog.seed_products", skip(self, catalog), fields(rows = catalog.len()))]
    pub async fn seed_products(&self, catalog: Vec<Product>) -> Result<SeedReport, DomainError> {
        info!("Seeding catalog");

        Self::validate_seed(&catalog)?;

        let txn = self.db.begin().await.map_err(DomainError::storage)?;
        match Self::seed_products_in(&txn, catalog).await {
            Ok(report) => {
                txn.commit().await.map_err(DomainError::storage)?;
                info!(
                    "Catalog seeded: {} inserted, {} updated",
                    report.inserted, report.updated
                );
                Ok(report)
            }
            Err(e) => {
                let _ = txn.rollback().await;
                Err(e)
            }
        }
    }

    async fn seed_products_in<C: ConnectionTrait>(
        conn: &C,
        catalog: Vec<Product>,
    ) -> Result<SeedReport, DomainError> {
        let mut report = SeedReport::default();
        for product in catalog {
            let row = mapper::product_to_entity(product);
            let existing = products::find_by_id(conn, row.id)
                .await
                .map_err(DomainError::storage)?;
            if existing.is_some() {
                products::replace(conn, row)
                    .await
                    .map_err(DomainError::storage)?;
                report.updated += 1;
            } else {
                products::insert(conn, row)
                    .await
                    .map_err(DomainError::storage)?;
                report.inserted += 1;
            }
        }
        Ok(report)
    }

    // --- validation helpers ---

    fn validate_adjustments(items: &[StockAdjustment]) -> Result<(), DomainError> {
        if items.is_empty() {
            return Err(DomainError::validation("items must not be empty"));
        }
        for item in items {
            if item.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "quantity must be positive for product {}",
                    item.product_id
                )));
            }
        }
        Ok(())
    }

    fn validate_seed(catalog: &[Product]) -> Result<(), DomainError> {
        for product in catalog {
            if product.id <= 0 {
                return Err(DomainError::validation(format!(
                    "product id must be positive, got {}",
                    product.id
                )));
            }
            if product.price.is_sign_negative() {
                return Err(DomainError::validation(format!(
                    "price must not be negative for product {}",
                    product.id
                )));
            }
            if product.stock < 0 {
                return Err(DomainError::validation(format!(
                    "stock must not be negative for product {}",
                    product.id
                )));
            }
        }
        Ok(())
    }
}
