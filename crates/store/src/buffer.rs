//! Write Buffer
//!
//! Coalesces storage writes from the engine into batches.
//! - Writes queue in arrival order
//! - The queue is flushed once it reaches the threshold, or on demand
//! - A flush is one atomic `Store::apply` call
//! - A failed flush is logged and its batch dropped; the engine's in-memory
//!   state stays authoritative and no retry is attempted

use bourse_core::{AccountId, InstrumentCode, Money, Price, Quantity};
use bourse_ports::{
    AccountRecord, AssetRecord, InstrumentRecord, PriceRecord, Store, StoreResult, WriteOp,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Result of a flush attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was queued
    Idle,
    /// Below threshold and not forced; the queue was kept
    Deferred,
    /// Batch of this many writes committed
    Committed(usize),
    /// Batch rejected by the store and discarded
    Dropped { writes: usize, error: String },
}

/// Running flush counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub batches_committed: usize,
    pub writes_committed: usize,
    pub batches_dropped: usize,
    pub writes_dropped: usize,
}

/// Buffers writes in front of a [`Store`]
pub struct WriteBuffer<S: Store> {
    store: S,
    /// Queue of pending writes (FIFO)
    pending: Vec<WriteOp>,
    /// Queue length that triggers a flush
    threshold: usize,
    stats: FlushStats,
}

impl<S: Store> WriteBuffer<S> {
    pub const DEFAULT_THRESHOLD: usize = 100;

    /// Create a buffer with the given flush threshold (zero is treated as one)
    pub fn new(store: S, threshold: usize) -> Self {
        Self {
            store,
            pending: Vec::new(),
            threshold: threshold.max(1),
            stats: FlushStats::default(),
        }
    }

    // Loads bypass the queue

    pub fn load_instruments(&self) -> StoreResult<Vec<InstrumentRecord>> {
        self.store.load_instruments()
    }

    pub fn load_accounts(&self) -> StoreResult<Vec<AccountRecord>> {
        self.store.load_accounts()
    }

    pub fn load_holdings(
        &self,
        account: &AccountId,
    ) -> StoreResult<BTreeMap<InstrumentCode, Quantity>> {
        self.store.load_holdings(account)
    }

    // Queued writes

    pub fn upsert_instrument(&mut self, code: &InstrumentCode, price: Price, volatility: Decimal) {
        self.push(WriteOp::UpsertInstrument(InstrumentRecord {
            code: code.clone(),
            price,
            volatility,
        }));
    }

    pub fn remove_instrument(&mut self, code: &InstrumentCode) {
        self.push(WriteOp::RemoveInstrument(code.clone()));
    }

    pub fn upsert_account(&mut self, account: &AccountId, balance: Money, strategy: &str) {
        self.push(WriteOp::UpsertAccount(AccountRecord {
            id: account.clone(),
            balance,
            strategy: strategy.to_string(),
        }));
    }

    pub fn remove_account(&mut self, account: &AccountId) {
        self.push(WriteOp::RemoveAccount(account.clone()));
    }

    pub fn set_instrument_price(&mut self, code: &InstrumentCode, price: Price) {
        self.push(WriteOp::SetInstrumentPrice {
            code: code.clone(),
            price,
        });
    }

    pub fn set_account_balance(&mut self, account: &AccountId, balance: Money) {
        self.push(WriteOp::SetAccountBalance {
            account: account.clone(),
            balance,
        });
    }

    pub fn set_holdings(
        &mut self,
        account: &AccountId,
        holdings: &BTreeMap<InstrumentCode, Quantity>,
    ) {
        self.push(WriteOp::SetHoldings {
            account: account.clone(),
            holdings: holdings.clone(),
        });
    }

    pub fn append_price_history(&mut self, records: Vec<PriceRecord>) {
        if !records.is_empty() {
            self.push(WriteOp::AppendPriceHistory(records));
        }
    }

    pub fn append_asset_history(&mut self, records: Vec<AssetRecord>) {
        if !records.is_empty() {
            self.push(WriteOp::AppendAssetHistory(records));
        }
    }

    fn push(&mut self, op: WriteOp) {
        log::trace!("[WriteBuffer] queued {}", op.kind());
        self.pending.push(op);
        if self.pending.len() >= self.threshold {
            self.flush(false);
        }
    }

    /// Flush the queue if it reached the threshold, or unconditionally when
    /// `force` is set
    pub fn flush(&mut self, force: bool) -> FlushOutcome {
        if self.pending.is_empty() {
            return FlushOutcome::Idle;
        }
        if !force && self.pending.len() < self.threshold {
            return FlushOutcome::Deferred;
        }

        let batch = std::mem::take(&mut self.pending);
        let writes = batch.len();
        match self.store.apply(&batch) {
            Ok(()) => {
                self.stats.batches_committed += 1;
                self.stats.writes_committed += writes;
                log::debug!(
                    "[WriteBuffer] Committed {} writes to {}",
                    writes,
                    self.store.name()
                );
                FlushOutcome::Committed(writes)
            }
            Err(e) => {
                self.stats.batches_dropped += 1;
                self.stats.writes_dropped += writes;
                log::error!(
                    "[WriteBuffer] Persistence failure on {}, dropping {} writes: {}",
                    self.store.name(),
                    writes,
                    e
                );
                FlushOutcome::Dropped {
                    writes,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Number of queued writes
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Force-flush and hand back the store
    pub fn into_inner(mut self) -> S {
        self.flush(true);
        self.store
    }
}
