//! Market: the instruments all agents trade
//!
//! Iteration follows insertion order, which is also the order strategies
//! visit instruments in.

mod instrument;

pub use instrument::Instrument;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::entities::{InstrumentCode, Side};
use crate::values::Price;

/// Structural market errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("Instrument already exists: {0}")]
    DuplicateInstrument(String),

    #[error("Instrument not found: {0}")]
    UnknownInstrument(String),

    #[error("Invalid instrument {code}: {reason}")]
    InvalidInstrument { code: String, reason: String },
}

/// Instrument code → instrument, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Market {
    instruments: IndexMap<InstrumentCode, Instrument>,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and add an instrument
    pub fn add(
        &mut self,
        code: impl Into<InstrumentCode>,
        price: Price,
        volatility: Decimal,
    ) -> Result<&Instrument, MarketError> {
        let instrument = Instrument::new(code, price, volatility)?;
        self.insert(instrument)
    }

    /// Add an already built instrument
    pub fn insert(&mut self, instrument: Instrument) -> Result<&Instrument, MarketError> {
        if self.instruments.contains_key(instrument.code().as_str()) {
            return Err(MarketError::DuplicateInstrument(instrument.code().to_string()));
        }
        let entry = self
            .instruments
            .entry(instrument.code().clone())
            .or_insert(instrument);
        Ok(&*entry)
    }

    /// Remove an instrument, preserving the order of the others
    pub fn remove(&mut self, code: &str) -> Result<Instrument, MarketError> {
        self.instruments
            .shift_remove(code)
            .ok_or_else(|| MarketError::UnknownInstrument(code.to_string()))
    }

    pub fn get(&self, code: &str) -> Option<&Instrument> {
        self.instruments.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.instruments.contains_key(code)
    }

    pub fn price(&self, code: &str) -> Option<Price> {
        self.instruments.get(code).map(Instrument::price)
    }

    /// Snapshot of the codes in insertion order
    pub fn codes(&self) -> Vec<InstrumentCode> {
        self.instruments.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.values()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Apply a trade-driven price shock to `code`, returning the new price
    pub fn apply_price_shock(
        &mut self,
        code: &str,
        side: Side,
        draw: Decimal,
    ) -> Result<Price, MarketError> {
        self.instruments
            .get_mut(code)
            .map(|instrument| instrument.apply_shock(side, draw))
            .ok_or_else(|| MarketError::UnknownInstrument(code.to_string()))
    }

    /// End-of-tick bookkeeping: every instrument records its current price
    pub fn record_close(&mut self) {
        for instrument in self.instruments.values_mut() {
            instrument.record_close();
        }
    }
}
