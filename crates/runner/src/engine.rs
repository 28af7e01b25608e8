//! Engine - the simulator handle
//!
//! Owns the market desk, the simulation clock, the bankruptcy flag and the
//! RNG behind trade gating and random strategies. There is no global
//! simulator: every operation goes through an `Engine` value.

use bourse_core::{Account, AccountId, Market, Price, Quantity, Tick};
use bourse_ports::Store;
use bourse_store::{FlushOutcome, FlushStats, WriteBuffer};
use bourse_strategy::Strategy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::config::SimulationConfig;
use crate::desk::{Execution, Liquidation, MarketDesk};
use crate::error::Result;

/// Id of the distinguished player account
pub const PLAYER_ID: &str = "Player";

/// Multi-agent market simulator
pub struct Engine<S: Store> {
    pub(crate) config: SimulationConfig,
    pub(crate) desk: MarketDesk<S>,
    /// Ticks executed since the engine started; never reset
    pub(crate) clock: Tick,
    /// First account found insolvent; halts every run until cleared
    pub(crate) bankrupt: Option<AccountId>,
    /// Drives the per-account trade gate and random strategies
    pub(crate) rng: StdRng,
}

impl<S: Store> Engine<S> {
    /// Create an engine with an empty market and roster.
    ///
    /// Uses `config.seed` when set, fresh entropy otherwise. Nothing is
    /// loaded from `store`; see [`Engine::bootstrap`] for that.
    pub fn new(config: SimulationConfig, store: S) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, store, rng)
    }

    /// Create an engine drawing all randomness from `rng`
    pub fn with_rng(config: SimulationConfig, store: S, mut rng: StdRng) -> Self {
        let shock_rng = StdRng::seed_from_u64(rng.r#gen());
        let buffer = WriteBuffer::new(store, config.flush_threshold);

        Self {
            config,
            desk: MarketDesk::new(buffer, shock_rng),
            clock: 0,
            bankrupt: None,
            rng,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn market(&self) -> &Market {
        &self.desk.market
    }

    /// Current tick (total ticks executed)
    pub fn clock(&self) -> Tick {
        self.clock
    }

    // ========================================================================
    // Instruments
    // ========================================================================

    pub fn add_instrument(&mut self, code: &str, price: Price, volatility: Decimal) -> Result<()> {
        self.desk.add_instrument(code, price, volatility)
    }

    /// Delist `code`, crediting each holder at the current price
    pub fn remove_instrument(&mut self, code: &str) -> Result<Vec<Liquidation>> {
        self.desk.remove_instrument(code)
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Add an account, rebuilding its strategy from `strategy_name`
    pub fn add_account(&mut self, id: &str, balance: Decimal, strategy_name: &str) -> Result<()> {
        let strategy = Strategy::from_name(strategy_name, &self.config.windows);
        self.add_account_with_strategy(id, balance, strategy)
    }

    pub fn add_account_with_strategy(
        &mut self,
        id: &str,
        balance: Decimal,
        strategy: Strategy,
    ) -> Result<()> {
        let account = self.new_account(id, balance);
        self.desk.add_account(account, strategy)
    }

    /// Remove an account without liquidating its holdings
    pub fn remove_account(&mut self, id: &str) -> Result<()> {
        self.desk.remove_account(id).map(|_| ())
    }

    pub(crate) fn new_account(&self, id: &str, balance: Decimal) -> Account {
        Account::with_history_capacity(id, balance, self.config.asset_history_cap)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.desk.agent(id).map(|a| &a.account)
    }

    pub fn strategy(&self, id: &str) -> Option<Strategy> {
        self.desk.agent(id).map(|a| a.strategy)
    }

    /// The distinguished player account, if present
    pub fn player(&self) -> Option<&Account> {
        self.account(PLAYER_ID)
    }

    /// Account ids in registration order
    pub fn account_ids(&self) -> Vec<AccountId> {
        self.desk.agents.keys().cloned().collect()
    }

    // ========================================================================
    // Orders
    // ========================================================================

    pub fn buy(&mut self, account: &str, code: &str, quantity: Quantity) -> Result<Execution> {
        self.desk.buy(account, code, quantity)
    }

    pub fn sell(&mut self, account: &str, code: &str, quantity: Quantity) -> Result<Execution> {
        self.desk.sell(account, code, quantity)
    }

    // ========================================================================
    // Bankruptcy and persistence
    // ========================================================================

    /// Account that halted simulation, if any
    pub fn bankrupt(&self) -> Option<&AccountId> {
        self.bankrupt.as_ref()
    }

    /// Clear the bankruptcy flag so runs can continue
    pub fn clear_bankruptcy(&mut self) -> Option<AccountId> {
        let cleared = self.bankrupt.take();
        if let Some(id) = &cleared {
            log::info!("[Engine] Cleared bankruptcy of {}", id);
        }
        cleared
    }

    /// Force-flush queued writes
    pub fn close(&mut self) -> FlushOutcome {
        log::info!("[Engine] Closing at tick {}", self.clock);
        self.desk.buffer.flush(true)
    }

    pub fn flush_stats(&self) -> FlushStats {
        self.desk.buffer.stats()
    }

    pub fn pending_writes(&self) -> usize {
        self.desk.buffer.pending_count()
    }

    pub fn store(&self) -> &S {
        self.desk.buffer.store()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.desk.buffer.store_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use bourse_store::InMemoryStore;
    use rust_decimal_macros::dec;

    fn engine() -> Engine<InMemoryStore> {
        Engine::new(SimulationConfig::default().with_seed(1), InMemoryStore::new())
    }

    #[test]
    fn test_add_account_by_name() {
        let mut engine = engine();
        engine.add_account("Alice", dec!(500), "TrendFollowing").unwrap();
        engine.add_account("Bob", dec!(500), "Something").unwrap();

        assert_eq!(
            engine.strategy("Alice"),
            Some(Strategy::TrendFollowing { window: 10 })
        );
        assert_eq!(engine.strategy("Bob"), Some(Strategy::None));
    }

    #[test]
    fn test_duplicate_account() {
        let mut engine = engine();
        engine.add_account("Alice", dec!(500), "Random").unwrap();
        assert!(matches!(
            engine.add_account("Alice", dec!(1), "Random"),
            Err(EngineError::DuplicateAccount(_))
        ));
        assert_eq!(engine.account("Alice").unwrap().balance(), dec!(500));
    }

    #[test]
    fn test_remove_unknown_account() {
        let mut engine = engine();
        assert!(matches!(
            engine.remove_account("Ghost"),
            Err(EngineError::UnknownAccount(_))
        ));
    }

    #[test]
    fn test_remove_account_keeps_order() {
        let mut engine = engine();
        for id in ["A", "B", "C"] {
            engine.add_account(id, dec!(1), "None").unwrap();
        }
        engine.remove_account("B").unwrap();
        let ids: Vec<String> = engine.account_ids().into_iter().map(|a| a.0).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[test]
    fn test_duplicate_instrument() {
        let mut engine = engine();
        engine.add_instrument("AAPL", dec!(150), dec!(0.02)).unwrap();
        assert!(matches!(
            engine.add_instrument("AAPL", dec!(1), dec!(0.02)),
            Err(EngineError::DuplicateInstrument(_))
        ));
    }

    #[test]
    fn test_invalid_instrument() {
        let mut engine = engine();
        assert!(matches!(
            engine.add_instrument("AAPL", dec!(-1), dec!(0.02)),
            Err(EngineError::InvalidInstrument { .. })
        ));
    }

    #[test]
    fn test_close_flushes() {
        let mut engine = engine();
        engine.add_instrument("AAPL", dec!(150), dec!(0.02)).unwrap();
        assert_eq!(engine.pending_writes(), 1);

        assert_eq!(engine.close(), FlushOutcome::Committed(1));
        assert_eq!(engine.store().state().instruments.len(), 1);
    }

    #[test]
    fn test_player_lookup() {
        let mut engine = engine();
        assert!(engine.player().is_none());
        engine.add_account(PLAYER_ID, dec!(10000), "MeanReversion").unwrap();
        assert_eq!(engine.player().unwrap().id().as_str(), PLAYER_ID);
    }
}
