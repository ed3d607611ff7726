pub mod model;

pub use model::{
    CartItem, Credentials, NewUser, OrderSummary, PlacedOrder, Product, SeedReport,
    StockAdjustment, StockAdjustmentOutcome, User,
};
