use bourse_core::{AccountId, InstrumentCode, Quantity};
use bourse_ports::{AccountRecord, InstrumentRecord, Store, StoreError, StoreResult, WriteOp};
use std::collections::BTreeMap;

use crate::state::StoreState;

/// In-memory store
///
/// Suitable for simulation and testing. Can be switched into a failing
/// mode where every batch is rejected, to exercise persistence failures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: StoreState,
    /// Batches committed so far
    commits: usize,
    failing: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing contents
    pub fn with_state(state: StoreState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Reject every subsequent batch while `failing` is set
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl Store for InMemoryStore {
    fn load_instruments(&self) -> StoreResult<Vec<InstrumentRecord>> {
        Ok(self.state.instrument_records())
    }

    fn load_accounts(&self) -> StoreResult<Vec<AccountRecord>> {
        Ok(self.state.account_records())
    }

    fn load_holdings(&self, account: &AccountId) -> StoreResult<BTreeMap<InstrumentCode, Quantity>> {
        Ok(self.state.holdings_of(account))
    }

    fn apply(&mut self, batch: &[WriteOp]) -> StoreResult<()> {
        if self.failing {
            return Err(StoreError::Backend("in-memory store is failing".to_string()));
        }
        self.state.apply_batch(batch);
        self.commits += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "InMemoryStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_commit_counts_only_successes() {
        let mut store = InMemoryStore::new();
        let batch = [WriteOp::UpsertInstrument(InstrumentRecord {
            code: "AAPL".into(),
            price: dec!(150),
            volatility: dec!(0.02),
        })];

        store.apply(&batch).unwrap();
        store.set_failing(true);
        assert!(store.apply(&batch).is_err());

        assert_eq!(store.commits(), 1);
        assert_eq!(store.load_instruments().unwrap().len(), 1);
    }
}
