//! Stored tables and the rules for applying write batches to them

use bourse_core::{AccountId, InstrumentCode, Quantity};
use bourse_ports::{AccountRecord, AssetRecord, InstrumentRecord, PriceRecord, WriteOp};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full contents of a store
///
/// Mirrors the relational layout: instruments, accounts, account holdings,
/// price history and asset history. Updates that reference a missing row
/// are skipped with a warning, like an SQL `UPDATE` matching no rows, so a
/// dropped batch never blocks the ones after it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub instruments: IndexMap<InstrumentCode, InstrumentRecord>,
    pub accounts: IndexMap<AccountId, AccountRecord>,
    pub holdings: BTreeMap<AccountId, BTreeMap<InstrumentCode, Quantity>>,
    pub price_history: Vec<PriceRecord>,
    pub asset_history: Vec<AssetRecord>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch in order
    pub fn apply_batch(&mut self, batch: &[WriteOp]) {
        for op in batch {
            self.apply(op);
        }
    }

    /// Apply a single operation in place
    pub fn apply(&mut self, op: &WriteOp) {
        match op {
            WriteOp::UpsertInstrument(record) => {
                self.instruments.insert(record.code.clone(), record.clone());
            }
            WriteOp::RemoveInstrument(code) => {
                self.instruments.shift_remove(code);
                for held in self.holdings.values_mut() {
                    held.remove(code);
                }
                self.price_history.retain(|r| &r.code != code);
            }
            WriteOp::UpsertAccount(record) => {
                self.accounts.insert(record.id.clone(), record.clone());
            }
            WriteOp::RemoveAccount(id) => {
                self.accounts.shift_remove(id);
                self.holdings.remove(id);
                self.asset_history.retain(|r| &r.account != id);
            }
            WriteOp::SetInstrumentPrice { code, price } => match self.instruments.get_mut(code) {
                Some(record) => record.price = *price,
                None => skipped(op.kind(), "instrument", code.as_str()),
            },
            WriteOp::SetAccountBalance { account, balance } => match self.accounts.get_mut(account) {
                Some(record) => record.balance = *balance,
                None => skipped(op.kind(), "account", account.as_str()),
            },
            WriteOp::SetHoldings { account, holdings } => {
                if !self.accounts.contains_key(account) {
                    skipped(op.kind(), "account", account.as_str());
                    return;
                }
                let instruments = &self.instruments;
                let rows = self.holdings.entry(account.clone()).or_default();
                rows.retain(|code, _| holdings.get(code).is_some_and(|q| *q > 0));
                for (code, quantity) in holdings.iter().filter(|(_, q)| **q > 0) {
                    if instruments.contains_key(code) {
                        rows.insert(code.clone(), *quantity);
                    } else {
                        skipped(op.kind(), "instrument", code.as_str());
                    }
                }
                if rows.is_empty() {
                    self.holdings.remove(account);
                }
            }
            WriteOp::AppendPriceHistory(records) => {
                self.price_history.extend(records.iter().cloned());
            }
            WriteOp::AppendAssetHistory(records) => {
                self.asset_history.extend(records.iter().cloned());
            }
        }
    }

    pub fn instrument_records(&self) -> Vec<InstrumentRecord> {
        self.instruments.values().cloned().collect()
    }

    pub fn account_records(&self) -> Vec<AccountRecord> {
        self.accounts.values().cloned().collect()
    }

    pub fn holdings_of(&self, account: &AccountId) -> BTreeMap<InstrumentCode, Quantity> {
        self.holdings.get(account).cloned().unwrap_or_default()
    }
}

fn skipped(kind: &str, table: &str, key: &str) {
    log::warn!("[StoreState] Skipping {}: {} '{}' does not exist", kind, table, key);
}
