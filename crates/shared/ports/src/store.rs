use bourse_core::{AccountId, InstrumentCode, Quantity};
use std::collections::BTreeMap;

use crate::error::StoreResult;
use crate::records::{AccountRecord, InstrumentRecord, WriteOp};

/// Port for simulator persistence
///
/// This port abstracts the storage backend so the engine can run against:
/// - An in-memory store for tests
/// - A JSON snapshot file for local runs
/// - Any transactional database
///
/// Loads are immediate. Writes arrive as batches of [`WriteOp`] from the
/// write buffer and must be applied all-or-nothing: when `apply` returns an
/// error, none of the batch may be visible.
pub trait Store {
    /// All stored instruments (empty when storage is uninitialised)
    fn load_instruments(&self) -> StoreResult<Vec<InstrumentRecord>>;

    /// All stored accounts, in the order they were first stored
    fn load_accounts(&self) -> StoreResult<Vec<AccountRecord>>;

    /// Stored holdings of one account
    fn load_holdings(&self, account: &AccountId) -> StoreResult<BTreeMap<InstrumentCode, Quantity>>;

    /// Apply a batch atomically
    fn apply(&mut self, batch: &[WriteOp]) -> StoreResult<()>;

    /// Backend name for log lines
    fn name(&self) -> &str {
        "Store"
    }
}
