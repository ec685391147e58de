// Cashpoint - cash-dispensing front-end core
// One library consumed by any UI binding via the component contracts below;
// main.rs is the reference CLI binding.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod session;

// Re-export commonly used types
pub use client::{DeviceClient, UNKNOWN_ID};
pub use config::{Config, Credentials, DEFAULT_API_BASE_URL};
pub use engine::{
    map_remote_status, ReconciliationEngine, ReconciliationReport, WithdrawalRequest,
};
pub use error::{Error, Result};
pub use ledger::{
    TransactionLedger, TransactionRecord, TransactionStatus, ACCOUNT_CATEGORIES,
};
pub use session::SessionGate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
