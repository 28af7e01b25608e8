//! Read-only views for display
//!
//! Tables and chart series built from the engine's current state. None of
//! these mutate anything, so repeated calls without an intervening change
//! return equal results.

use bourse_core::{AccountId, AssetPoint, InstrumentCode, Money, Price};
use bourse_ports::Store;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{EngineError, Result};

/// One row of the instrument table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRow {
    pub code: InstrumentCode,
    pub price: Price,
    pub volatility: Decimal,
    /// Accounts holding a non-zero quantity
    pub holders: usize,
}

/// One row of the account table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRow {
    pub id: AccountId,
    pub balance: Money,
    pub strategy: String,
}

impl<S: Store> Engine<S> {
    /// Instruments in listing order
    pub fn instrument_table(&self) -> Vec<InstrumentRow> {
        self.desk
            .market
            .iter()
            .map(|instrument| InstrumentRow {
                code: instrument.code().clone(),
                price: instrument.price(),
                volatility: instrument.volatility(),
                holders: self
                    .desk
                    .agents
                    .values()
                    .filter(|a| a.account.holding(instrument.code().as_str()) > 0)
                    .count(),
            })
            .collect()
    }

    /// Accounts in registration order
    pub fn account_table(&self) -> Vec<AccountRow> {
        self.desk
            .agents
            .values()
            .map(|agent| AccountRow {
                id: agent.account.id().clone(),
                balance: agent.account.balance(),
                strategy: agent.strategy.name().to_string(),
            })
            .collect()
    }

    /// Price history of one instrument, oldest first
    pub fn price_series(&self, code: &str) -> Option<&[Price]> {
        self.desk.market.get(code).map(|i| i.price_history())
    }

    /// Price history of every instrument, in listing order
    pub fn price_series_all(&self) -> Vec<(InstrumentCode, Vec<Price>)> {
        self.desk
            .market
            .iter()
            .map(|i| (i.code().clone(), i.price_history().to_vec()))
            .collect()
    }

    /// Asset-value history of one account, oldest first
    pub fn asset_series(&self, id: &str) -> Option<Vec<AssetPoint>> {
        self.account(id)
            .map(|a| a.asset_history().iter().copied().collect())
    }

    /// `balance + Σ holding × price` for one account
    pub fn total_asset_value(&self, id: &str) -> Result<Money> {
        self.account(id)
            .map(|a| a.total_asset_value(&self.desk.market))
            .ok_or_else(|| EngineError::UnknownAccount(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimulationConfig;
    use crate::engine::Engine;
    use bourse_store::InMemoryStore;
    use rust_decimal_macros::dec;

    fn engine() -> Engine<InMemoryStore> {
        let config = SimulationConfig {
            trade_probability: 0.0,
            ..SimulationConfig::default().with_seed(3)
        };
        let mut engine = Engine::new(config, InMemoryStore::new());
        engine.add_instrument("AAPL", dec!(100), dec!(0)).unwrap();
        engine.add_instrument("GOOG", dec!(270), dec!(0)).unwrap();
        engine.add_account("A", dec!(1000), "TrendFollowing").unwrap();
        engine.add_account("B", dec!(1000), "Random").unwrap();
        engine
    }

    #[test]
    fn test_instrument_table_counts_holders() {
        let mut engine = engine();
        engine.buy("A", "AAPL", 1).unwrap();
        engine.buy("B", "AAPL", 2).unwrap();
        engine.buy("B", "GOOG", 1).unwrap();
        engine.sell("B", "GOOG", 1).unwrap();

        let table = engine.instrument_table();
        assert_eq!(table[0].code.as_str(), "AAPL");
        assert_eq!(table[0].holders, 2);
        assert_eq!(table[1].holders, 0);
    }

    #[test]
    fn test_account_table() {
        let engine = engine();
        let table = engine.account_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].strategy, "TrendFollowing");
        assert_eq!(table[1].balance, dec!(1000));
    }

    #[test]
    fn test_snapshots_are_idempotent() {
        let mut engine = engine();
        engine.buy("A", "AAPL", 2).unwrap();

        assert_eq!(engine.instrument_table(), engine.instrument_table());
        assert_eq!(engine.account_table(), engine.account_table());
        assert_eq!(engine.asset_series("A"), engine.asset_series("A"));
        assert_eq!(
            engine.total_asset_value("A").unwrap(),
            engine.total_asset_value("A").unwrap()
        );
    }

    #[test]
    fn test_total_asset_value() {
        let mut engine = engine();
        engine.buy("A", "AAPL", 3).unwrap();
        engine.buy("A", "GOOG", 1).unwrap();

        // 1000 - 300 - 270 cash, plus 3 × 100 + 1 × 270 in shares
        assert_eq!(engine.total_asset_value("A").unwrap(), dec!(1000));
        assert!(engine.total_asset_value("Ghost").is_err());
    }

    #[test]
    fn test_series() {
        let mut engine = engine();
        engine.run(2);

        assert_eq!(engine.price_series("AAPL").unwrap().len(), 3);
        assert!(engine.price_series("TSLA").is_none());
        assert_eq!(engine.price_series_all().len(), 2);
        assert_eq!(engine.asset_series("A").unwrap().len(), 3);
    }
}
