//! Bourse Core Domain
//!
//! Pure domain types for the Bourse market simulator.
//! This crate contains no I/O and no randomness: price shocks take their
//! random draw as an argument so every rule here is deterministic to test.

pub mod entities;
pub mod market;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Account, AccountId, AssetHistory, AssetPoint, InstrumentCode, Side};
pub use market::{Instrument, Market, MarketError};
pub use values::{Money, PRICE_DP, PRICE_FLOOR, Price, Quantity, Tick, round_price};
