use bourse_core::{AccountId, InstrumentCode, Money, Price, Quantity, Tick};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted instrument row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub code: InstrumentCode,
    pub price: Price,
    pub volatility: Decimal,
}

/// Persisted account row. The strategy is stored by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    pub balance: Money,
    pub strategy: String,
}

/// One price sample of an instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub code: InstrumentCode,
    pub tick: Tick,
    pub price: Price,
}

/// One asset-value sample of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub account: AccountId,
    pub tick: Tick,
    pub value: Money,
}

/// A single queued storage mutation
///
/// Batches of these are applied atomically by [`crate::Store::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WriteOp {
    UpsertInstrument(InstrumentRecord),
    /// Deletes the instrument with its price history and every holding of it
    RemoveInstrument(InstrumentCode),
    UpsertAccount(AccountRecord),
    /// Deletes the account with its holdings and asset history
    RemoveAccount(AccountId),
    SetInstrumentPrice {
        code: InstrumentCode,
        price: Price,
    },
    SetAccountBalance {
        account: AccountId,
        balance: Money,
    },
    /// Replace the account's stored holdings with `holdings`: missing rows
    /// are inserted, changed rows updated, rows absent here deleted
    SetHoldings {
        account: AccountId,
        holdings: BTreeMap<InstrumentCode, Quantity>,
    },
    AppendPriceHistory(Vec<PriceRecord>),
    AppendAssetHistory(Vec<AssetRecord>),
}

impl WriteOp {
    /// Short label for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::UpsertInstrument(_) => "upsert_instrument",
            WriteOp::RemoveInstrument(_) => "remove_instrument",
            WriteOp::UpsertAccount(_) => "upsert_account",
            WriteOp::RemoveAccount(_) => "remove_account",
            WriteOp::SetInstrumentPrice { .. } => "set_instrument_price",
            WriteOp::SetAccountBalance { .. } => "set_account_balance",
            WriteOp::SetHoldings { .. } => "set_holdings",
            WriteOp::AppendPriceHistory(_) => "append_price_history",
            WriteOp::AppendAssetHistory(_) => "append_asset_history",
        }
    }
}
