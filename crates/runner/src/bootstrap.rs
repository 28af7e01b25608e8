//! Bootstrap - market and roster setup
//!
//! Handles initial setup of the simulation:
//! - Loading instruments from storage, or listing the configured defaults
//! - Loading accounts with their holdings and rebuilding their strategies
//! - Creating the player when storage holds no accounts
//! - Topping up the roster with trend followers and random traders

use bourse_core::Instrument;
use bourse_ports::Store;
use bourse_strategy::Strategy;

use crate::config::SimulationConfig;
use crate::engine::{Engine, PLAYER_ID};
use crate::error::Result;

/// Id of the `index`-th synthesized trend follower
pub fn trend_follower_id(index: usize) -> String {
    format!("TrendFollower_{}", index)
}

/// Id of the `index`-th synthesized random trader
pub fn random_trader_id(index: usize) -> String {
    format!("RandomTrader_{}", index)
}

impl<S: Store> Engine<S> {
    /// Build an engine from whatever `store` holds, filling in defaults
    pub fn bootstrap(config: SimulationConfig, store: S) -> Result<Self> {
        let mut engine = Self::new(config, store);

        engine.load_market()?;
        let loaded = engine.load_roster()?;
        engine.complete_roster(loaded == 0)?;
        engine.desk.buffer.flush(true);

        log::info!(
            "[Bootstrap] Ready: {} instruments, {} accounts ({} loaded)",
            engine.desk.market.len(),
            engine.desk.agents.len(),
            loaded
        );
        Ok(engine)
    }

    fn load_market(&mut self) -> Result<()> {
        let records = self.desk.buffer.load_instruments()?;
        if records.is_empty() {
            log::info!("[Bootstrap] No stored instruments, listing defaults");
            let defaults = self.config.instruments.clone();
            for instrument in defaults {
                self.add_instrument(&instrument.code, instrument.price, instrument.volatility)?;
            }
            return Ok(());
        }

        for record in records {
            let instrument = Instrument::new(record.code, record.price, record.volatility)?;
            self.desk.market.insert(instrument)?;
        }
        Ok(())
    }

    /// Returns the number of accounts loaded
    fn load_roster(&mut self) -> Result<usize> {
        let records = self.desk.buffer.load_accounts()?;
        let loaded = records.len();

        for record in records {
            let holdings = self.desk.buffer.load_holdings(&record.id)?;
            let listed = holdings.into_iter().filter(|(code, quantity)| {
                let known = self.desk.market.contains(code.as_str());
                if !known {
                    log::warn!(
                        "[Bootstrap] Dropping {} shares of unlisted {} held by {}",
                        quantity,
                        code,
                        record.id
                    );
                }
                known
            });
            let account = self
                .new_account(record.id.as_str(), record.balance)
                .with_holdings(listed.collect::<Vec<_>>());
            let strategy = Strategy::from_name(&record.strategy, &self.config.windows);
            self.desk.register(account, strategy)?;
        }
        Ok(loaded)
    }

    fn complete_roster(&mut self, storage_empty: bool) -> Result<()> {
        let balance = self.config.initial_balance;
        let windows = self.config.windows;

        if storage_empty {
            self.add_account_with_strategy(
                PLAYER_ID,
                balance,
                Strategy::MeanReversion {
                    window: windows.reversion_window,
                },
            )?;
        }

        for i in 0..self.config.num_trend_followers {
            let id = trend_follower_id(i);
            if self.account(&id).is_none() {
                self.add_account_with_strategy(
                    &id,
                    balance,
                    Strategy::TrendFollowing {
                        window: windows.trend_window,
                    },
                )?;
            }
        }

        for i in 0..self.config.num_random_traders {
            let id = random_trader_id(i);
            if self.account(&id).is_none() {
                self.add_account_with_strategy(&id, balance, Strategy::Random)?;
            }
        }
        Ok(())
    }
}
