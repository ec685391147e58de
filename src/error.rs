// Error taxonomy shared by every component.
//
// Validation and remote-business failures are recoverable values surfaced to
// the caller; nothing in this crate aborts the process. The worst case is a
// stale ledger entry that a later reconciliation pass retries.

use thiserror::Error;

/// Result type for cashpoint operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad local input, never touches the network
    #[error("validation error: {0}")]
    Validation(String),

    /// Connection, timeout, or HTTP-status failure
    #[error("connection error: {0}")]
    Transport(String),

    /// Well-formed failure response from the device
    #[error("device error: {0}")]
    Remote(String),

    /// Ledger lookup target missing
    #[error("no transaction with id {transaction_id}")]
    NotFound {
        /// Reconciliation key that matched nothing
        transaction_id: String,
    },

    /// Ledger or config file I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ledger row (de)serialization
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Config (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when retrying later could succeed without operator action.
    /// Transport failures during reconciliation are swallowed per record on
    /// this basis.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
