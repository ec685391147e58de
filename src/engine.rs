// ⚖️ ReconciliationEngine - withdrawal submission and lifecycle resolution
//
// State machine per transaction:
//
//   Submitted -> Pending -> { Completed | Failed }
//
// Submitted is transient - it exists only during the withdraw call. Once the
// device accepts, the record is persisted as Pending immediately. No
// write-ahead entry is made before the network call, so a crash between
// device acceptance and the local append leaves an orphaned remote
// transaction with no local record.

use crate::client::DeviceClient;
use crate::error::{Error, Result};
use crate::ledger::{TransactionLedger, TransactionRecord, TransactionStatus};
use chrono::Utc;
use tracing::{info, warn};

// ============================================================================
// REMOTE STATUS VOCABULARY
// ============================================================================

/// Remote statuses that resolve a pending withdrawal as completed
const COMPLETED_STATUSES: [&str; 2] = ["payment is completed", "Success"];

/// Remote statuses that resolve a pending withdrawal as failed
const FAILED_STATUSES: [&str; 3] = ["Payment Error", "user cancelled", "no change"];

/// Map a raw device status string to a terminal status, if it names one.
/// The vocabulary is a closed table: exact, case-sensitive matching, no
/// normalization. Unrecognized strings are expected intermediate states and
/// leave the record pending - they are not errors.
pub fn map_remote_status(raw: &str) -> Option<TransactionStatus> {
    if COMPLETED_STATUSES.contains(&raw) {
        Some(TransactionStatus::Completed)
    } else if FAILED_STATUSES.contains(&raw) {
        Some(TransactionStatus::Failed)
    } else {
        None
    }
}

// ============================================================================
// REQUEST / REPORT TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct WithdrawalRequest {
    pub operator_name: String,
    pub payee: String,
    pub account_category: String,
    /// Kept exactly as entered; must parse as a positive integer
    pub amount: String,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone)]
pub struct ReconciliationReport {
    /// Records that reached a terminal status this pass
    pub updated_count: usize,
    /// Records whose status query failed; left pending for the next pass
    pub query_failures: usize,
    /// The full post-pass record set, in ledger order
    pub records: Vec<TransactionRecord>,
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    client: DeviceClient,
    ledger: TransactionLedger,
}

impl ReconciliationEngine {
    pub fn new(client: DeviceClient, ledger: TransactionLedger) -> Self {
        ReconciliationEngine { client, ledger }
    }

    pub fn client(&self) -> &DeviceClient {
        &self.client
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Submit a withdrawal to the device and record it as pending.
    ///
    /// Validation failures never reach the network. A device failure
    /// propagates verbatim and persists nothing. On success the record is
    /// appended with the device-assigned id and returned.
    pub fn submit_withdrawal(&self, request: &WithdrawalRequest) -> Result<TransactionRecord> {
        validate_request(request)?;

        let transaction_id = self.client.withdraw(&request.amount)?;

        let record = TransactionRecord {
            timestamp: Utc::now(),
            operator_name: request.operator_name.clone(),
            payee: request.payee.clone(),
            account_category: request.account_category.clone(),
            amount: request.amount.clone(),
            transaction_id,
            status: TransactionStatus::Pending,
        };

        self.ledger.append(&record)?;

        info!(
            transaction_id = %record.transaction_id,
            amount = %record.amount,
            "withdrawal submitted"
        );

        Ok(record)
    }

    /// Resolve every non-terminal record by querying the device.
    ///
    /// Per-record query failures are swallowed: the record stays pending,
    /// the failure is counted, and the pass continues - one unreachable
    /// record never blocks reconciliation of the others. Changed records are
    /// persisted in a single write pass. Idempotent: re-running against
    /// unchanged remote state updates nothing and leaves the file
    /// byte-identical.
    pub fn reconcile_pending(&self) -> Result<ReconciliationReport> {
        let mut records = self.ledger.scan()?;
        let mut updated_count = 0;
        let mut query_failures = 0;

        for record in records.iter_mut() {
            if record.status.is_terminal() {
                continue;
            }

            let raw = match self.client.query_status(&record.transaction_id) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(
                        transaction_id = %record.transaction_id,
                        error = %err,
                        "status query failed, leaving record pending"
                    );
                    query_failures += 1;
                    continue;
                }
            };

            if let Some(status) = map_remote_status(&raw) {
                record.status = status;
                updated_count += 1;
            }
        }

        if updated_count > 0 {
            self.ledger.rewrite(&records)?;
        }

        info!(
            updated = updated_count,
            failures = query_failures,
            "reconciliation pass finished"
        );

        Ok(ReconciliationReport {
            updated_count,
            query_failures,
            records,
        })
    }
}

fn validate_request(request: &WithdrawalRequest) -> Result<()> {
    if request.operator_name.is_empty() {
        return Err(Error::Validation("operator name must not be empty".into()));
    }
    if request.payee.is_empty() {
        return Err(Error::Validation("payee must not be empty".into()));
    }

    match request.amount.parse::<i64>() {
        Ok(amount) if amount > 0 => Ok(()),
        Ok(_) => Err(Error::Validation(
            "amount must be greater than zero".into(),
        )),
        Err(_) => Err(Error::Validation(format!(
            "amount is not a number: {}",
            request.amount
        ))),
    }
}
