// === PUBLIC CONTRACT ===
// Only the contract module should be public for other modules to consume
pub mod contract;

// Re-export the public contract components
pub use contract::model;

// === MODULE CONFIGURATION ===
pub mod config;
pub use config::CommerceConfig;

// === INTERNAL MODULES ===
// Exposed for the server binary (router assembly, migrations, seeding)
// and for comprehensive testing.
pub mod api;
pub mod domain;
pub mod infra;
