pub mod accounts;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod ports;

pub use accounts::AccountsService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use error::DomainError;
