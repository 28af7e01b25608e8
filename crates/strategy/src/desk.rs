//! Trading desk - the view of the market a strategy trades through
//!
//! The engine implements [`TradingDesk`] over its live market and roster.
//! Intents are executed as soon as they are submitted, so a price shock
//! caused by one order is visible to the next read.

use bourse_core::{AccountId, InstrumentCode, Price, Quantity, Side};

/// A request to trade, executed immediately by the desk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    pub account: AccountId,
    pub code: InstrumentCode,
    pub side: Side,
    pub quantity: Quantity,
}

impl OrderIntent {
    pub fn buy(account: &AccountId, code: &InstrumentCode, quantity: Quantity) -> Self {
        Self {
            account: account.clone(),
            code: code.clone(),
            side: Side::Buy,
            quantity,
        }
    }

    pub fn sell(account: &AccountId, code: &InstrumentCode, quantity: Quantity) -> Self {
        Self {
            account: account.clone(),
            code: code.clone(),
            side: Side::Sell,
            quantity,
        }
    }
}

/// Live market access for strategies
pub trait TradingDesk {
    /// Codes of all listed instruments, in listing order
    fn instrument_codes(&self) -> Vec<InstrumentCode>;

    /// Current price, `None` if the instrument is not listed
    fn price(&self, code: &str) -> Option<Price>;

    /// Full price history, oldest first
    fn price_history(&self, code: &str) -> Option<&[Price]>;

    /// Shares of `code` held by `account` (zero when none)
    fn holding(&self, account: &AccountId, code: &str) -> Quantity;

    /// Execute an intent. Returns true when it filled; declined orders
    /// are reported by the desk itself.
    fn submit(&mut self, intent: OrderIntent) -> bool;
}
