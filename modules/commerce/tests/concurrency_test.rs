//! Concurrent checkout against a shared SQLite file.
//!
//! Several buyers race for the same scarce product. Whatever the interleaving,
//! stock must never go negative and every persisted order must be backed by
//! actually decremented stock.

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;

use commerce::{
    contract::model::{CartItem, NewUser},
    domain::{error::DomainError, ports::PasswordHasher, AccountsService, CheckoutService},
    infra::storage::entity::{order_items, orders, products},
    infra::storage::migrations::run_migrations,
};
use db::{ConnectOpts, DbHandle};

struct FakeHasher;

#[async_trait::async_trait]
impl PasswordHasher for FakeHasher {
    async fn hash(&self, plain: &str) -> Result<String, DomainError> {
        Ok(format!("hashed:{plain}"))
    }

    async fn verify(&self, plain: &str, hashed: &str) -> Result<bool, DomainError> {
        Ok(hashed == format!("hashed:{plain}"))
    }
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checkouts_never_oversell() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dsn = format!("sqlite://{}?mode=rwc", dir.path().join("store.db").display());
    let handle = DbHandle::connect(&dsn, ConnectOpts::default()).await?;
    let conn = handle.sea();
    run_migrations(&conn).await?;

    let accounts = AccountsService::new(conn.clone(), Arc::new(FakeHasher));
    let user = accounts
        .register(NewUser {
            name: "Buyer".to_string(),
            email: "buyer@example.com".to_string(),
            password: "pw123".to_string(),
        })
        .await?;

    const INITIAL_STOCK: i32 = 5;
    const QTY_PER_ORDER: i32 = 2;
    products::insert(
        &conn,
        products::Model {
            id: 1,
            name: "Limited Edition Keyboard".to_string(),
            price: dec("10.00"),
            image: None,
            rating: None,
            review_count: None,
            category: Some("Peripherals".to_string()),
            stock: INITIAL_STOCK,
        },
    )
    .await?;

    let checkout = Arc::new(CheckoutService::new(conn.clone()));

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let checkout = Arc::clone(&checkout);
        let user_id = user.id;
        tasks.push(tokio::spawn(async move {
            checkout
                .place_order(
                    user_id,
                    vec![CartItem {
                        product_id: 1,
                        quantity: QTY_PER_ORDER,
                    }],
                )
                .await
        }));
    }

    let mut successes = 0;
    for task in tasks {
        match task.await? {
            Ok(placed) => {
                assert_eq!(placed.total_price, dec("20.00"));
                successes += 1;
            }
            // Losers are either turned away by the stock guard or by SQLite
            // rejecting a second concurrent writer; both leave no trace.
            Err(DomainError::InsufficientStock { .. }) | Err(DomainError::Storage { .. }) => {}
            Err(other) => panic!("unexpected checkout error: {other}"),
        }
    }

    // stock 5 in units of 2 allows at most two full orders
    assert!((1..=2).contains(&successes), "successes = {successes}");

    let product = products::find_by_id(&conn, 1).await?.unwrap();
    assert_eq!(product.stock, INITIAL_STOCK - QTY_PER_ORDER * successes);
    assert!(product.stock >= 0);

    // every surviving order is fully backed by lines and decremented stock
    let history = orders::find_for_user_newest_first(&conn, user.id).await?;
    assert_eq!(history.len(), successes as usize);
    for order in &history {
        let lines = order_items::find_for_order(&conn, order.id).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, QTY_PER_ORDER);
    }

    handle.close().await;
    Ok(())
}
