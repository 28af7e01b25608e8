//! Market desk - order execution over the live market and roster
//!
//! Owns everything an order touches:
//! - The market (instruments, prices, price histories)
//! - The roster of agents (account + strategy), in registration order
//! - The write buffer every state change is reported to
//! - The RNG that drives trade-driven price shocks
//!
//! Every mutation is validated before anything changes; writes are queued
//! only after the in-memory change succeeded.

use bourse_core::{
    Account, AccountId, InstrumentCode, Market, Money, Price, Quantity, Side, Tick,
};
use bourse_ports::{AssetRecord, PriceRecord, Store};
use bourse_store::WriteBuffer;
use bourse_strategy::{OrderIntent, Strategy, TradingDesk};
use indexmap::IndexMap;
use rand::Rng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// An account paired with the strategy that trades it
#[derive(Debug, Clone)]
pub struct Agent {
    pub account: Account,
    pub strategy: Strategy,
}

/// A filled order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub account: AccountId,
    pub code: InstrumentCode,
    pub side: Side,
    pub quantity: Quantity,
    /// Price the order filled at (before its own shock)
    pub fill_price: Price,
    /// `fill_price × quantity`
    pub notional: Money,
    /// Price after the trade-driven shock
    pub new_price: Price,
    /// Account balance after the fill
    pub balance: Money,
    /// Account holding of `code` after the fill
    pub holding: Quantity,
}

/// Cash returned to one holder when an instrument is delisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Liquidation {
    pub account: AccountId,
    pub quantity: Quantity,
    pub proceeds: Money,
}

/// Fill/decline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderCounters {
    pub filled: u64,
    pub declined: u64,
}

/// Market, roster and write buffer behind the engine
pub struct MarketDesk<S: Store> {
    pub(crate) market: Market,
    pub(crate) agents: IndexMap<AccountId, Agent>,
    pub(crate) buffer: WriteBuffer<S>,
    shock_rng: StdRng,
    counters: OrderCounters,
}

impl<S: Store> MarketDesk<S> {
    pub fn new(buffer: WriteBuffer<S>, shock_rng: StdRng) -> Self {
        Self {
            market: Market::new(),
            agents: IndexMap::new(),
            buffer,
            shock_rng,
            counters: OrderCounters::default(),
        }
    }

    pub fn counters(&self) -> OrderCounters {
        self.counters
    }

    // ========================================================================
    // Instruments
    // ========================================================================

    /// List a new instrument and persist it
    pub fn add_instrument(
        &mut self,
        code: &str,
        price: Price,
        volatility: Decimal,
    ) -> Result<()> {
        let instrument = self.market.add(code, price, volatility)?;
        self.buffer
            .upsert_instrument(instrument.code(), instrument.price(), instrument.volatility());
        log::info!(
            "[Desk] Listed {} at {} (volatility {})",
            code,
            price,
            volatility
        );
        Ok(())
    }

    /// Delist an instrument, paying every holder `holding × price` first
    pub fn remove_instrument(&mut self, code: &str) -> Result<Vec<Liquidation>> {
        let price = self
            .market
            .price(code)
            .ok_or_else(|| EngineError::UnknownInstrument(code.to_string()))?;

        let mut liquidations = Vec::new();
        for agent in self.agents.values_mut() {
            let quantity = agent.account.take_holding(code);
            if quantity == 0 {
                continue;
            }
            let proceeds = price * Decimal::from(quantity);
            agent.account.credit(proceeds);
            self.buffer
                .set_account_balance(agent.account.id(), agent.account.balance());
            self.buffer
                .set_holdings(agent.account.id(), agent.account.holdings());
            liquidations.push(Liquidation {
                account: agent.account.id().clone(),
                quantity,
                proceeds,
            });
        }

        let removed = self.market.remove(code)?;
        self.buffer.remove_instrument(removed.code());
        log::info!(
            "[Desk] Delisted {} at {}, liquidated {} holders",
            code,
            price,
            liquidations.len()
        );
        Ok(liquidations)
    }

    // ========================================================================
    // Roster
    // ========================================================================

    /// Register an agent without persisting it (used when loading from storage)
    pub(crate) fn register(&mut self, account: Account, strategy: Strategy) -> Result<()> {
        if self.agents.contains_key(account.id().as_str()) {
            return Err(EngineError::DuplicateAccount(account.id().to_string()));
        }
        self.agents
            .insert(account.id().clone(), Agent { account, strategy });
        Ok(())
    }

    /// Register an agent and persist it
    pub fn add_account(&mut self, account: Account, strategy: Strategy) -> Result<()> {
        let id = account.id().clone();
        let balance = account.balance();
        self.register(account, strategy)?;
        self.buffer.upsert_account(&id, balance, strategy.name());
        log::info!(
            "[Desk] Added account {} ({}, balance {})",
            id,
            strategy.name(),
            balance
        );
        Ok(())
    }

    /// Drop an account. Holdings are not liquidated.
    pub fn remove_account(&mut self, id: &str) -> Result<Agent> {
        let agent = self
            .agents
            .shift_remove(id)
            .ok_or_else(|| EngineError::UnknownAccount(id.to_string()))?;
        self.buffer.remove_account(agent.account.id());
        log::info!("[Desk] Removed account {}", id);
        Ok(agent)
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    // ========================================================================
    // Order execution
    // ========================================================================

    pub fn buy(&mut self, account: &str, code: &str, quantity: Quantity) -> Result<Execution> {
        self.execute(account, code, Side::Buy, quantity)
    }

    pub fn sell(&mut self, account: &str, code: &str, quantity: Quantity) -> Result<Execution> {
        self.execute(account, code, Side::Sell, quantity)
    }

    /// Execute an order, counting and logging declines
    pub fn execute(
        &mut self,
        account: &str,
        code: &str,
        side: Side,
        quantity: Quantity,
    ) -> Result<Execution> {
        match self.fill(account, code, side, quantity) {
            Ok(execution) => {
                self.counters.filled += 1;
                log::debug!(
                    "[Desk] {} {} {} {} @ {} -> {}",
                    execution.account,
                    side,
                    quantity,
                    code,
                    execution.fill_price,
                    execution.new_price
                );
                Ok(execution)
            }
            Err(e) => {
                self.counters.declined += 1;
                log::debug!("[Desk] Declined {} {} {} {}: {}", account, side, quantity, code, e);
                Err(e)
            }
        }
    }

    fn fill(
        &mut self,
        account: &str,
        code: &str,
        side: Side,
        quantity: Quantity,
    ) -> Result<Execution> {
        if quantity == 0 {
            return Err(EngineError::InvalidQuantity);
        }
        let agent = self
            .agents
            .get_mut(account)
            .ok_or_else(|| EngineError::UnknownAccount(account.to_string()))?;
        let instrument = self
            .market
            .get(code)
            .ok_or_else(|| EngineError::UnknownInstrument(code.to_string()))?;
        let code = instrument.code().clone();
        let fill_price = instrument.price();
        let notional = fill_price * Decimal::from(quantity);

        let holding = match side {
            Side::Buy => {
                if !agent.account.debit(notional) {
                    return Err(EngineError::InsufficientFunds {
                        account: account.to_string(),
                        required: notional,
                        available: agent.account.balance(),
                    });
                }
                agent.account.add_holding(code.clone(), quantity)
            }
            Side::Sell => {
                let held = agent.account.holding(code.as_str());
                let remaining = agent
                    .account
                    .remove_holding(code.as_str(), quantity)
                    .ok_or_else(|| EngineError::InsufficientHoldings {
                        account: account.to_string(),
                        instrument: code.to_string(),
                        required: quantity,
                        held,
                    })?;
                agent.account.credit(notional);
                remaining
            }
        };

        let draw = unit_draw(&mut self.shock_rng);
        let new_price = self.market.apply_price_shock(code.as_str(), side, draw)?;

        self.buffer.set_instrument_price(&code, new_price);
        self.buffer
            .set_holdings(agent.account.id(), agent.account.holdings());
        self.buffer
            .set_account_balance(agent.account.id(), agent.account.balance());

        Ok(Execution {
            account: agent.account.id().clone(),
            code,
            side,
            quantity,
            fill_price,
            notional,
            new_price,
            balance: agent.account.balance(),
            holding,
        })
    }

    // ========================================================================
    // Tick bookkeeping
    // ========================================================================

    /// Append `(tick, value)` to every account and the current price to
    /// every instrument, collecting the rows for storage
    pub(crate) fn record_tick(
        &mut self,
        tick: Tick,
        prices: &mut Vec<PriceRecord>,
        assets: &mut Vec<AssetRecord>,
    ) {
        for agent in self.agents.values_mut() {
            let value = agent.account.record_asset_value(tick, &self.market);
            assets.push(AssetRecord {
                account: agent.account.id().clone(),
                tick,
                value,
            });
        }

        self.market.record_close();
        for instrument in self.market.iter() {
            prices.push(PriceRecord {
                code: instrument.code().clone(),
                tick,
                price: instrument.price(),
            });
        }
    }
}

/// Uniform sample in [0, 1) as a decimal
fn unit_draw(rng: &mut StdRng) -> Decimal {
    let sample: f64 = rng.r#gen();
    Decimal::from_f64(sample).unwrap_or(Decimal::ZERO)
}

impl<S: Store> TradingDesk for MarketDesk<S> {
    fn instrument_codes(&self) -> Vec<InstrumentCode> {
        self.market.codes()
    }

    fn price(&self, code: &str) -> Option<Price> {
        self.market.price(code)
    }

    fn price_history(&self, code: &str) -> Option<&[Price]> {
        self.market.get(code).map(|i| i.price_history())
    }

    fn holding(&self, account: &AccountId, code: &str) -> Quantity {
        self.agents
            .get(account.as_str())
            .map(|a| a.account.holding(code))
            .unwrap_or_default()
    }

    fn submit(&mut self, intent: OrderIntent) -> bool {
        self.execute(
            intent.account.as_str(),
            intent.code.as_str(),
            intent.side,
            intent.quantity,
        )
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bourse_store::InMemoryStore;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn desk() -> MarketDesk<InMemoryStore> {
        let buffer = WriteBuffer::new(InMemoryStore::new(), 100);
        MarketDesk::new(buffer, StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_buy_at_zero_volatility() {
        let mut desk = desk();
        desk.add_instrument("AAPL", dec!(100.00), dec!(0)).unwrap();
        desk.add_account(Account::new("A", dec!(1000.00)), Strategy::None)
            .unwrap();

        let execution = desk.buy("A", "AAPL", 5).unwrap();

        assert_eq!(execution.notional, dec!(500.00));
        assert_eq!(execution.balance, dec!(500.00));
        assert_eq!(execution.holding, 5);
        assert_eq!(execution.new_price, dec!(100.00));
        assert_eq!(desk.market.get("AAPL").unwrap().price_history().len(), 2);
    }

    #[test]
    fn test_buy_declined_leaves_state() {
        let mut desk = desk();
        desk.add_instrument("AAPL", dec!(100), dec!(0.02)).unwrap();
        desk.add_account(Account::new("A", dec!(499.99)), Strategy::None)
            .unwrap();
        desk.buffer.flush(true);

        let err = desk.buy("A", "AAPL", 5).unwrap_err();

        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        assert!(err.is_decline());
        let agent = desk.agent("A").unwrap();
        assert_eq!(agent.account.balance(), dec!(499.99));
        assert!(agent.account.holdings().is_empty());
        assert_eq!(desk.market.price("AAPL"), Some(dec!(100)));
        assert!(!desk.buffer.has_pending());
        assert_eq!(desk.counters().declined, 1);
    }

    #[test]
    fn test_sell_more_than_held() {
        let mut desk = desk();
        desk.add_instrument("AAPL", dec!(100), dec!(0.02)).unwrap();
        desk.add_account(Account::new("A", dec!(1000)), Strategy::None)
            .unwrap();
        desk.buy("A", "AAPL", 2).unwrap();

        let err = desk.sell("A", "AAPL", 3).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientHoldings {
                required: 3,
                held: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_sell_credits_fill_price_and_lowers_price() {
        let mut desk = desk();
        desk.add_instrument("AAPL", dec!(100), dec!(0.5)).unwrap();
        desk.add_account(Account::new("A", dec!(1000)), Strategy::None)
            .unwrap();
        desk.buy("A", "AAPL", 2).unwrap();
        let before = desk.agent("A").unwrap().account.balance();
        let price = desk.market.price("AAPL").unwrap();

        let execution = desk.sell("A", "AAPL", 2).unwrap();

        assert_eq!(execution.balance, before + price * dec!(2));
        assert!(execution.new_price <= price);
        assert_eq!(execution.holding, 0);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut desk = desk();
        desk.add_instrument("AAPL", dec!(100), dec!(0)).unwrap();
        desk.add_account(Account::new("A", dec!(1000)), Strategy::None)
            .unwrap();
        assert!(matches!(
            desk.buy("A", "AAPL", 0),
            Err(EngineError::InvalidQuantity)
        ));
    }

    #[test]
    fn test_unknown_references() {
        let mut desk = desk();
        desk.add_instrument("AAPL", dec!(100), dec!(0)).unwrap();
        assert!(matches!(
            desk.buy("Ghost", "AAPL", 1),
            Err(EngineError::UnknownAccount(_))
        ));
        desk.add_account(Account::new("A", dec!(1000)), Strategy::None)
            .unwrap();
        assert!(matches!(
            desk.buy("A", "TSLA", 1),
            Err(EngineError::UnknownInstrument(_))
        ));
    }

    #[test]
    fn test_fill_queues_price_holdings_balance() {
        let mut desk = desk();
        desk.add_instrument("AAPL", dec!(100), dec!(0)).unwrap();
        desk.add_account(Account::new("A", dec!(1000)), Strategy::None)
            .unwrap();
        desk.buffer.flush(true);

        desk.buy("A", "AAPL", 1).unwrap();
        assert_eq!(desk.buffer.pending_count(), 3);
    }

    #[test]
    fn test_remove_instrument_liquidates() {
        let mut desk = desk();
        desk.add_instrument("AAPL", dec!(100), dec!(0)).unwrap();
        desk.add_account(Account::new("A", dec!(1000)), Strategy::None)
            .unwrap();
        desk.add_account(Account::new("B", dec!(1000)), Strategy::None)
            .unwrap();
        desk.buy("A", "AAPL", 3).unwrap();
        desk.buy("B", "AAPL", 1).unwrap();

        let liquidations = desk.remove_instrument("AAPL").unwrap();

        assert_eq!(liquidations.len(), 2);
        assert_eq!(desk.agent("A").unwrap().account.balance(), dec!(1000));
        assert_eq!(desk.agent("B").unwrap().account.balance(), dec!(1000));
        assert!(!desk.market.contains("AAPL"));
    }
}
