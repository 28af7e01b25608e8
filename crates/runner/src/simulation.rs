//! Simulation - the tick loop
//!
//! Each tick:
//! - Stops if a bankruptcy is already recorded
//! - Visits accounts in registration order; each passes the trade gate with
//!   the configured probability and then runs its strategy
//! - Records the first account left with a balance at or below zero and
//!   skips the remaining accounts
//! - Advances the clock, then samples every account's asset value and every
//!   instrument's price
//!
//! The run's history rows are handed to storage in bulk at the end, followed
//! by a forced flush.

use bourse_core::{AccountId, Tick};
use bourse_ports::Store;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;

/// Outcome of [`Engine::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ticks asked for
    pub requested: u64,
    /// Ticks actually executed (fewer when a bankruptcy halted the run)
    pub ticks_executed: u64,
    /// Clock after the run
    pub tick: Tick,
    /// Account that halted the run, if any
    pub bankrupt: Option<AccountId>,
    /// Strategy passes executed
    pub strategy_calls: u64,
    pub orders_filled: u64,
    pub orders_declined: u64,
}

impl<S: Store> Engine<S> {
    /// Run up to `ticks` ticks. `run(0)` does nothing at all.
    pub fn run(&mut self, ticks: u64) -> RunSummary {
        let mut summary = RunSummary {
            requested: ticks,
            tick: self.clock,
            bankrupt: self.bankrupt.clone(),
            ..Default::default()
        };
        if ticks == 0 {
            return summary;
        }

        let counters_before = self.desk.counters();
        let mut price_rows = Vec::new();
        let mut asset_rows = Vec::new();

        log::info!(
            "[Simulation] Running {} ticks from tick {} ({} accounts, {} instruments)",
            ticks,
            self.clock,
            self.desk.agents.len(),
            self.desk.market.len()
        );

        for _ in 0..ticks {
            if let Some(id) = &self.bankrupt {
                log::warn!("[Simulation] {} is bankrupt, stopping", id);
                break;
            }

            summary.strategy_calls += self.trade_round();

            self.clock += 1;
            self.desk
                .record_tick(self.clock, &mut price_rows, &mut asset_rows);
            summary.ticks_executed += 1;
        }

        self.desk.buffer.append_asset_history(asset_rows);
        self.desk.buffer.append_price_history(price_rows);
        self.desk.buffer.flush(true);

        let counters = self.desk.counters();
        summary.tick = self.clock;
        summary.bankrupt = self.bankrupt.clone();
        summary.orders_filled = counters.filled - counters_before.filled;
        summary.orders_declined = counters.declined - counters_before.declined;

        log::info!(
            "[Simulation] Ran {}/{} ticks, now at tick {} ({} filled, {} declined)",
            summary.ticks_executed,
            ticks,
            summary.tick,
            summary.orders_filled,
            summary.orders_declined
        );
        summary
    }

    /// One pass over the roster. Returns how many strategies ran.
    fn trade_round(&mut self) -> u64 {
        let mut calls = 0;
        let ids: Vec<AccountId> = self.desk.agents.keys().cloned().collect();

        for id in ids {
            let gate: f64 = self.rng.r#gen();
            if gate >= self.config.trade_probability {
                continue;
            }
            let Some(strategy) = self.desk.agent(id.as_str()).map(|a| a.strategy) else {
                continue;
            };

            if strategy.is_active() {
                strategy.decide(&id, &mut self.desk, &mut self.rng);
                calls += 1;
            } else {
                log::debug!("[Simulation] {} has no strategy", id);
            }

            let insolvent = self
                .desk
                .agent(id.as_str())
                .is_some_and(|a| a.account.is_bankrupt());
            if insolvent {
                log::warn!("[Simulation] {} went bankrupt at tick {}", id, self.clock + 1);
                self.bankrupt = Some(id);
                break;
            }
        }
        calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use bourse_store::InMemoryStore;
    use bourse_strategy::Strategy;
    use rust_decimal_macros::dec;

    fn config(trade_probability: f64) -> SimulationConfig {
        SimulationConfig {
            trade_probability,
            ..SimulationConfig::default().with_seed(42)
        }
    }

    fn engine(trade_probability: f64) -> Engine<InMemoryStore> {
        let mut engine = Engine::new(config(trade_probability), InMemoryStore::new());
        engine.add_instrument("AAPL", dec!(150), dec!(0.02)).unwrap();
        engine.add_instrument("MSFT", dec!(300), dec!(0.025)).unwrap();
        engine
    }

    /// One listed instrument whose price was pushed above its last close,
    /// with one-tick trend followers registered behind a passive account
    fn trend_chase(followers: &[&str]) -> Engine<InMemoryStore> {
        let config = SimulationConfig {
            instruments: Vec::new(),
            ..config(1.0)
        };
        let mut engine = Engine::new(config, InMemoryStore::new());
        engine.add_instrument("AAPL", dec!(100), dec!(0.05)).unwrap();
        engine.add_account("Setup", dec!(1000), "None").unwrap();
        engine.buy("Setup", "AAPL", 1).unwrap();
        for id in followers {
            engine
                .add_account_with_strategy(id, dec!(10000), Strategy::TrendFollowing { window: 1 })
                .unwrap();
        }
        engine
    }

    #[test]
    fn test_run_zero_is_noop() {
        let mut engine = engine(1.0);
        engine.add_account("A", dec!(1000), "Random").unwrap();
        engine.close();
        let commits = engine.store().commits();

        let summary = engine.run(0);

        assert_eq!(summary.ticks_executed, 0);
        assert_eq!(engine.clock(), 0);
        assert_eq!(engine.account("A").unwrap().asset_history().len(), 1);
        assert_eq!(engine.market().get("AAPL").unwrap().price_history().len(), 1);
        assert_eq!(engine.store().commits(), commits);
        assert_eq!(engine.pending_writes(), 0);
    }

    #[test]
    fn test_tick_records_history() {
        let mut engine = engine(0.0);
        engine.add_account("A", dec!(1000), "Random").unwrap();

        let summary = engine.run(3);

        assert_eq!(summary.ticks_executed, 3);
        assert_eq!(summary.tick, 3);
        assert_eq!(summary.strategy_calls, 0);
        let ticks: Vec<Tick> = engine
            .account("A")
            .unwrap()
            .asset_history()
            .iter()
            .map(|p| p.tick)
            .collect();
        assert_eq!(ticks, vec![0, 1, 2, 3]);
        assert_eq!(
            engine.market().get("AAPL").unwrap().price_history(),
            &[dec!(150); 4]
        );
    }

    #[test]
    fn test_clock_accumulates_across_runs() {
        let mut engine = engine(0.5);
        engine.add_account("A", dec!(1000), "Random").unwrap();
        engine.run(4);
        engine.run(6);
        assert_eq!(engine.clock(), 10);
    }

    #[test]
    fn test_history_persisted_at_run_end() {
        let mut engine = engine(0.0);
        engine.add_account("A", dec!(1000), "None").unwrap();
        engine.run(5);

        let state = engine.store().state();
        assert_eq!(state.asset_history.len(), 5);
        assert_eq!(state.price_history.len(), 10);
        assert_eq!(engine.pending_writes(), 0);
    }

    #[test]
    fn test_bankrupt_account_halts_run() {
        let mut engine = engine(1.0);
        // Zero balance: insolvent as soon as its (inactive) strategy is visited
        engine.add_account("Broke", dec!(0), "None").unwrap();
        engine.add_account("Trader", dec!(1000), "Random").unwrap();

        let summary = engine.run(10);

        assert_eq!(summary.bankrupt, Some(AccountId::new("Broke")));
        assert_eq!(summary.ticks_executed, 1);
        assert_eq!(summary.strategy_calls, 0);
        assert_eq!(engine.clock(), 1);

        let again = engine.run(5);
        assert_eq!(again.ticks_executed, 0);
        assert_eq!(engine.clock(), 1);
    }

    #[test]
    fn test_clear_bankruptcy_resumes() {
        let mut engine = engine(1.0);
        engine.add_account("Broke", dec!(0), "None").unwrap();
        engine.run(1);
        engine.remove_account("Broke").unwrap();

        assert_eq!(engine.clear_bankruptcy(), Some(AccountId::new("Broke")));
        let summary = engine.run(3);
        assert_eq!(summary.ticks_executed, 3);
        assert_eq!(summary.bankrupt, None);
    }

    #[test]
    fn test_gate_skips_trading() {
        let mut engine = engine(0.0);
        engine
            .add_account_with_strategy("A", dec!(1000), Strategy::Random)
            .unwrap();
        let summary = engine.run(20);
        assert_eq!(summary.orders_filled + summary.orders_declined, 0);
        assert_eq!(engine.account("A").unwrap().balance(), dec!(1000));
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let build = || {
            let mut engine = engine(0.5);
            engine.add_account("R1", dec!(1000), "Random").unwrap();
            engine.add_account("R2", dec!(1000), "Random").unwrap();
            engine.add_account("T", dec!(1000), "TrendFollowing").unwrap();
            engine
        };
        let mut a = build();
        let mut b = build();

        assert_eq!(a.run(50), b.run(50));
        assert_eq!(
            a.market().get("AAPL").unwrap().price_history(),
            b.market().get("AAPL").unwrap().price_history()
        );
        assert_eq!(
            a.account("R1").unwrap().balance(),
            b.account("R1").unwrap().balance()
        );
    }

    #[test]
    fn test_balances_never_negative() {
        let mut engine = engine(1.0);
        for i in 0..5 {
            engine
                .add_account(&format!("R{}", i), dec!(200), "Random")
                .unwrap();
        }
        engine.run(100);
        for id in engine.account_ids() {
            assert!(engine.account(id.as_str()).unwrap().balance() >= dec!(0));
        }
    }

    #[test]
    fn test_later_account_sees_earlier_shock() {
        let mut leader_only = trend_chase(&["Leader"]);
        leader_only.run(1);
        let after_leader = leader_only.market().price("AAPL").unwrap();

        let mut engine = trend_chase(&["Leader", "Follower"]);
        let summary = engine.run(1);

        assert_eq!(summary.orders_filled, 2);
        let leader = engine.account("Leader").unwrap();
        assert_eq!(
            leader.balance(),
            leader_only.account("Leader").unwrap().balance()
        );
        let leader_fill = (dec!(10000) - leader.balance()) / dec!(5);
        let follower_fill =
            (dec!(10000) - engine.account("Follower").unwrap().balance()) / dec!(5);

        assert_eq!(follower_fill, after_leader);
        assert!(follower_fill > leader_fill);
    }
}
