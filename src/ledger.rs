// 🧾 TransactionLedger - durable, ordered record store
//
// One CSV file, human-readable and appendable. The file is the sole source
// of truth for transaction history - no in-memory cache outlives a read.
// Column order and header names are an external contract: downstream export
// and reporting read this file directly.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Canonical account categories offered by UI bindings. The ledger column
/// itself stays free text so records written by other bindings round-trip.
pub const ACCOUNT_CATEGORIES: [&str; 5] =
    ["Meeting", "Travel", "Entertainment", "Supplies", "Other"];

// ============================================================================
// TRANSACTION STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Submitted to the device, terminal outcome not yet known
    Pending,
    /// Device confirmed the payout
    Completed,
    /// Device reported a terminal failure or cancellation
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Failed => "Failed",
        }
    }

    /// Terminal records are never revisited by reconciliation
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Failed
        )
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// One withdrawal attempt. Everything except `status` is immutable once
/// recorded; `status` moves Pending -> Completed or Pending -> Failed only,
/// and only the reconciliation engine moves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Creation time, set once. Persisted explicitly because the store may
    /// be reordered on read.
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "Operator_Name")]
    pub operator_name: String,

    #[serde(rename = "Payee")]
    pub payee: String,

    #[serde(rename = "Account_Category")]
    pub account_category: String,

    /// Operator input preserved verbatim, not a re-serialized number
    #[serde(rename = "Amount")]
    pub amount: String,

    /// Device-assigned identifier, the reconciliation key. Non-empty for
    /// every persisted record - submission only succeeds with one.
    #[serde(rename = "Transaction_Id")]
    pub transaction_id: String,

    #[serde(rename = "Status")]
    pub status: TransactionStatus,
}

// ============================================================================
// TRANSACTION LEDGER
// ============================================================================

pub struct TransactionLedger {
    path: PathBuf,
}

impl TransactionLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TransactionLedger { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header row first when the file does
    /// not yet exist. Prior records are never touched by an append.
    pub fn append(&self, record: &TransactionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let exists = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!exists)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        Ok(())
    }

    /// All records in file order. A missing or header-only file is an empty
    /// ledger, not an error.
    pub fn scan(&self) -> Result<Vec<TransactionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }

        Ok(records)
    }

    /// Find a record by its device-assigned id
    pub fn find(&self, transaction_id: &str) -> Result<TransactionRecord> {
        self.scan()?
            .into_iter()
            .find(|record| record.transaction_id == transaction_id)
            .ok_or_else(|| Error::NotFound {
                transaction_id: transaction_id.to_string(),
            })
    }

    /// Overwrite the status of the first record whose id matches, in scan
    /// order. Returns whether a match was found; no file write happens when
    /// nothing matched.
    ///
    /// Duplicate ids can only arise from the device's "Unknown" placeholder;
    /// the first match in scan order wins.
    pub fn update_status(
        &self,
        transaction_id: &str,
        new_status: TransactionStatus,
    ) -> Result<bool> {
        let mut records = self.scan()?;

        match records
            .iter_mut()
            .find(|record| record.transaction_id == transaction_id)
        {
            Some(record) => {
                record.status = new_status;
                self.rewrite(&records)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace the whole file in one pass. Reconciliation uses this to
    /// persist a batch of status changes with a single write.
    pub fn rewrite(&self, records: &[TransactionRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record(transaction_id: &str, status: TransactionStatus) -> TransactionRecord {
        TransactionRecord {
            timestamp: "2026-08-04T10:00:00Z".parse().unwrap(),
            operator_name: "Yamada".to_string(),
            payee: "Acme Corp".to_string(),
            account_category: "Supplies".to_string(),
            amount: "1000".to_string(),
            transaction_id: transaction_id.to_string(),
            status,
        }
    }

    fn temp_ledger(dir: &tempfile::TempDir) -> TransactionLedger {
        TransactionLedger::new(dir.path().join("transactions.csv"))
    }

    #[test]
    fn test_scan_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = temp_ledger(&dir);

        let records = ledger.scan().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_append_then_scan_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = temp_ledger(&dir);

        let first = test_record("abc-123", TransactionStatus::Pending);
        let second = test_record("def-456", TransactionStatus::Pending);

        ledger.append(&first).unwrap();
        ledger.append(&second).unwrap();

        let records = ledger.scan().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], first);
        assert_eq!(records[1], second);
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = temp_ledger(&dir);

        ledger
            .append(&test_record("abc-123", TransactionStatus::Pending))
            .unwrap();
        ledger
            .append(&test_record("def-456", TransactionStatus::Pending))
            .unwrap();

        let contents = std::fs::read_to_string(ledger.path()).unwrap();
        let header_lines = contents
            .lines()
            .filter(|line| line.starts_with("Timestamp"))
            .count();
        assert_eq!(header_lines, 1);
    }

    #[test]
    fn test_column_order_is_the_external_contract() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = temp_ledger(&dir);

        ledger
            .append(&test_record("abc-123", TransactionStatus::Pending))
            .unwrap();

        let contents = std::fs::read_to_string(ledger.path()).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(
            header,
            "Timestamp,Operator_Name,Payee,Account_Category,Amount,Transaction_Id,Status"
        );
    }

    #[test]
    fn test_update_status_found() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = temp_ledger(&dir);

        ledger
            .append(&test_record("abc-123", TransactionStatus::Pending))
            .unwrap();

        let updated = ledger
            .update_status("abc-123", TransactionStatus::Completed)
            .unwrap();
        assert!(updated);

        let records = ledger.scan().unwrap();
        assert_eq!(records[0].status, TransactionStatus::Completed);
    }

    #[test]
    fn test_update_status_missing_id_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = temp_ledger(&dir);

        ledger
            .append(&test_record("abc-123", TransactionStatus::Pending))
            .unwrap();
        let before = std::fs::read_to_string(ledger.path()).unwrap();

        let updated = ledger
            .update_status("nope", TransactionStatus::Failed)
            .unwrap();
        assert!(!updated);

        let after = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_status_duplicate_ids_first_match_wins() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = temp_ledger(&dir);

        // Two withdrawals that both got the "Unknown" placeholder id
        ledger
            .append(&test_record("Unknown", TransactionStatus::Pending))
            .unwrap();
        ledger
            .append(&test_record("Unknown", TransactionStatus::Pending))
            .unwrap();

        ledger
            .update_status("Unknown", TransactionStatus::Completed)
            .unwrap();

        let records = ledger.scan().unwrap();
        assert_eq!(records[0].status, TransactionStatus::Completed);
        assert_eq!(records[1].status, TransactionStatus::Pending);
    }

    #[test]
    fn test_find_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = temp_ledger(&dir);

        ledger
            .append(&test_record("abc-123", TransactionStatus::Pending))
            .unwrap();

        let found = ledger.find("abc-123").unwrap();
        assert_eq!(found.payee, "Acme Corp");

        let missing = ledger.find("ghost").unwrap_err();
        match missing {
            Error::NotFound { transaction_id } => assert_eq!(transaction_id, "ghost"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = temp_ledger(&dir);

        ledger
            .append(&test_record("abc-123", TransactionStatus::Pending))
            .unwrap();
        ledger
            .append(&test_record("def-456", TransactionStatus::Pending))
            .unwrap();

        let mut records = ledger.scan().unwrap();
        records[1].status = TransactionStatus::Failed;
        ledger.rewrite(&records).unwrap();

        let reread = ledger.scan().unwrap();
        assert_eq!(reread.len(), 2);
        assert_eq!(reread[0].status, TransactionStatus::Pending);
        assert_eq!(reread[1].status, TransactionStatus::Failed);
    }
}
