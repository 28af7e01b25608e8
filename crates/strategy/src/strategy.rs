//! Strategy variants and dispatch
//!
//! Strategies form a closed set dispatched by `match`. Each one is stored by
//! name and rebuilt from that name plus [`StrategyParams`].

use bourse_core::{AccountId, Quantity, Side};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::desk::{OrderIntent, TradingDesk};
use crate::signals::{crossover_signal, reversion_signal, trend_signal};

/// Shares traded per signal by the moving-average strategies
pub const TRADE_SIZE: Quantity = 5;

/// Upper bound (inclusive) of a random trader's order size
pub const RANDOM_MAX_QUANTITY: Quantity = 5;

/// Window parameters used when rebuilding strategies by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub short_window: usize,
    pub long_window: usize,
    pub trend_window: usize,
    pub reversion_window: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            short_window: 5,
            long_window: 20,
            trend_window: 10,
            reversion_window: 10,
        }
    }
}

/// Agent trading strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Short/long SMA crossover
    MovingAverageCrossover {
        short_window: usize,
        long_window: usize,
    },
    /// Buy, sell or hold each instrument with equal probability
    Random,
    /// Buy strength, sell weakness
    TrendFollowing { window: usize },
    /// Buy weakness, sell strength
    MeanReversion { window: usize },
    /// Never trades
    None,
}

impl Strategy {
    pub const MOVING_AVERAGE_CROSSOVER: &'static str = "MovingAverageCrossover";
    pub const RANDOM: &'static str = "Random";
    pub const TREND_FOLLOWING: &'static str = "TrendFollowing";
    pub const MEAN_REVERSION: &'static str = "MeanReversion";
    pub const NONE: &'static str = "None";

    /// Persisted name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::MovingAverageCrossover { .. } => Self::MOVING_AVERAGE_CROSSOVER,
            Strategy::Random => Self::RANDOM,
            Strategy::TrendFollowing { .. } => Self::TREND_FOLLOWING,
            Strategy::MeanReversion { .. } => Self::MEAN_REVERSION,
            Strategy::None => Self::NONE,
        }
    }

    /// Rebuild a strategy from its persisted name. Unknown names become
    /// [`Strategy::None`].
    pub fn from_name(name: &str, params: &StrategyParams) -> Self {
        match name {
            Self::MOVING_AVERAGE_CROSSOVER => Strategy::MovingAverageCrossover {
                short_window: params.short_window,
                long_window: params.long_window,
            },
            Self::RANDOM => Strategy::Random,
            Self::TREND_FOLLOWING => Strategy::TrendFollowing {
                window: params.trend_window,
            },
            Self::MEAN_REVERSION => Strategy::MeanReversion {
                window: params.reversion_window,
            },
            Self::NONE | "" => Strategy::None,
            other => {
                log::warn!("[Strategy] Unknown strategy '{}', agent will not trade", other);
                Strategy::None
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Strategy::None)
    }

    /// Run one decision pass for `account` over every listed instrument.
    ///
    /// Instrument codes are snapshotted up front; price, history and
    /// holding are re-read per instrument so each decision sees the effect
    /// of earlier fills. Returns the number of filled orders.
    pub fn decide<D, R>(&self, account: &AccountId, desk: &mut D, rng: &mut R) -> usize
    where
        D: TradingDesk + ?Sized,
        R: Rng,
    {
        if !self.is_active() {
            return 0;
        }

        let mut filled = 0;
        for code in desk.instrument_codes() {
            let intent = match self {
                Strategy::Random => random_intent(account, &code, rng),
                _ => {
                    let Some(price) = desk.price(code.as_str()) else {
                        continue;
                    };
                    let holding = desk.holding(account, code.as_str());
                    let Some(history) = desk.price_history(code.as_str()) else {
                        continue;
                    };
                    let signal = match *self {
                        Strategy::MovingAverageCrossover {
                            short_window,
                            long_window,
                        } => crossover_signal(history, holding, short_window, long_window),
                        Strategy::TrendFollowing { window } => {
                            trend_signal(history, price, holding, window)
                        }
                        Strategy::MeanReversion { window } => {
                            reversion_signal(history, price, holding, window)
                        }
                        Strategy::Random | Strategy::None => None,
                    };
                    signal.map(|side| match side {
                        Side::Buy => OrderIntent::buy(account, &code, TRADE_SIZE),
                        Side::Sell => OrderIntent::sell(account, &code, TRADE_SIZE),
                    })
                }
            };

            if let Some(intent) = intent
                && desk.submit(intent)
            {
                filled += 1;
            }
        }
        filled
    }
}

fn random_intent<R: Rng>(
    account: &AccountId,
    code: &bourse_core::InstrumentCode,
    rng: &mut R,
) -> Option<OrderIntent> {
    match rng.gen_range(0..3u8) {
        0 => Some(OrderIntent::buy(
            account,
            code,
            rng.gen_range(1..=RANDOM_MAX_QUANTITY),
        )),
        1 => Some(OrderIntent::sell(
            account,
            code,
            rng.gen_range(1..=RANDOM_MAX_QUANTITY),
        )),
        _ => None,
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bourse_core::{InstrumentCode, Price};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    /// Desk over fixed histories that fills everything and tracks holdings
    #[derive(Default)]
    struct MockDesk {
        histories: Vec<(InstrumentCode, Vec<Price>)>,
        holdings: BTreeMap<String, Quantity>,
        submitted: Vec<OrderIntent>,
        reject_all: bool,
    }

    impl MockDesk {
        fn with_history(code: &str, history: Vec<Price>) -> Self {
            Self {
                histories: vec![(InstrumentCode::new(code), history)],
                ..Default::default()
            }
        }
    }

    impl TradingDesk for MockDesk {
        fn instrument_codes(&self) -> Vec<InstrumentCode> {
            self.histories.iter().map(|(c, _)| c.clone()).collect()
        }

        fn price(&self, code: &str) -> Option<Price> {
            self.price_history(code).and_then(|h| h.last().copied())
        }

        fn price_history(&self, code: &str) -> Option<&[Price]> {
            self.histories
                .iter()
                .find(|(c, _)| c.as_str() == code)
                .map(|(_, h)| h.as_slice())
        }

        fn holding(&self, _account: &AccountId, code: &str) -> Quantity {
            self.holdings.get(code).copied().unwrap_or_default()
        }

        fn submit(&mut self, intent: OrderIntent) -> bool {
            self.submitted.push(intent.clone());
            if self.reject_all {
                return false;
            }
            let held = self.holdings.entry(intent.code.0.clone()).or_default();
            match intent.side {
                Side::Buy => *held += intent.quantity,
                Side::Sell => *held = held.saturating_sub(intent.quantity),
            }
            true
        }
    }

    fn account() -> AccountId {
        AccountId::new("Agent")
    }

    #[test]
    fn test_names_round_trip() {
        let params = StrategyParams::default();
        for name in ["MovingAverageCrossover", "Random", "TrendFollowing", "MeanReversion", "None"] {
            assert_eq!(Strategy::from_name(name, &params).name(), name);
        }
    }

    #[test]
    fn test_unknown_name_is_inactive() {
        let strategy = Strategy::from_name("Arbitrage", &StrategyParams::default());
        assert_eq!(strategy, Strategy::None);
        assert!(!strategy.is_active());
    }

    #[test]
    fn test_from_name_uses_params() {
        let params = StrategyParams {
            trend_window: 7,
            ..Default::default()
        };
        assert_eq!(
            Strategy::from_name("TrendFollowing", &params),
            Strategy::TrendFollowing { window: 7 }
        );
    }

    #[test]
    fn test_trend_following_skips_short_history() {
        let mut desk = MockDesk::with_history("AAPL", vec![dec!(1), dec!(2), dec!(3)]);
        let strategy = Strategy::TrendFollowing { window: 4 };
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(strategy.decide(&account(), &mut desk, &mut rng), 0);
        assert!(desk.submitted.is_empty());
    }

    #[test]
    fn test_trend_following_acts_at_exact_window() {
        let mut desk = MockDesk::with_history("AAPL", vec![dec!(1), dec!(2), dec!(6)]);
        let strategy = Strategy::TrendFollowing { window: 3 };
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(strategy.decide(&account(), &mut desk, &mut rng), 1);
        assert_eq!(
            desk.submitted,
            vec![OrderIntent::buy(&account(), &InstrumentCode::new("AAPL"), TRADE_SIZE)]
        );
    }

    #[test]
    fn test_mean_reversion_sells_strength_when_holding() {
        let mut desk = MockDesk::with_history("MSFT", vec![dec!(10), dec!(10), dec!(13)]);
        desk.holdings.insert("MSFT".to_string(), 5);
        let strategy = Strategy::MeanReversion { window: 3 };
        let mut rng = StdRng::seed_from_u64(1);

        strategy.decide(&account(), &mut desk, &mut rng);
        assert_eq!(desk.submitted.len(), 1);
        assert_eq!(desk.submitted[0].side, Side::Sell);
        assert_eq!(desk.holdings["MSFT"], 0);
    }

    #[test]
    fn test_crossover_visits_every_instrument() {
        let rising: Vec<Price> = (1..=20).map(Price::from).collect();
        let mut desk = MockDesk::default();
        desk.histories.push((InstrumentCode::new("AAPL"), rising.clone()));
        desk.histories.push((InstrumentCode::new("GOOG"), rising));
        let strategy = Strategy::MovingAverageCrossover {
            short_window: 5,
            long_window: 20,
        };
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(strategy.decide(&account(), &mut desk, &mut rng), 2);
        let codes: Vec<&str> = desk.submitted.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["AAPL", "GOOG"]);
    }

    #[test]
    fn test_declined_orders_not_counted() {
        let mut desk = MockDesk::with_history("AAPL", vec![dec!(1), dec!(2), dec!(6)]);
        desk.reject_all = true;
        let strategy = Strategy::TrendFollowing { window: 3 };
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(strategy.decide(&account(), &mut desk, &mut rng), 0);
        assert_eq!(desk.submitted.len(), 1);
    }

    #[test]
    fn test_random_quantities_in_range() {
        let mut desk = MockDesk::default();
        for code in ["A", "B", "C", "D", "E", "F", "G", "H"] {
            desk.histories.push((InstrumentCode::new(code), vec![dec!(10)]));
        }
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            Strategy::Random.decide(&account(), &mut desk, &mut rng);
        }

        assert!(!desk.submitted.is_empty());
        assert!(
            desk.submitted
                .iter()
                .all(|i| (1..=RANDOM_MAX_QUANTITY).contains(&i.quantity))
        );
        assert!(desk.submitted.iter().any(|i| i.side == Side::Buy));
        assert!(desk.submitted.iter().any(|i| i.side == Side::Sell));
    }

    #[test]
    fn test_none_never_trades() {
        let mut desk = MockDesk::with_history("AAPL", vec![dec!(1), dec!(2), dec!(6)]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Strategy::None.decide(&account(), &mut desk, &mut rng), 0);
        assert!(desk.submitted.is_empty());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Strategy::TrendFollowing { window: 10 }).unwrap();
        let back: Strategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Strategy::TrendFollowing { window: 10 });
    }
}
