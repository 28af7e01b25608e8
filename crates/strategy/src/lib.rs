//! Bourse Strategy Framework
//!
//! Provides the pieces agents trade with:
//! - Trading desk seam over the live market (engine implements it)
//! - Simple moving-average indicators
//! - Moving-average signals (crossover, trend, reversion)
//! - The closed set of built-in strategies
//!
//! ## Architecture
//!
//! ```text
//!   Engine (market + roster)
//!          │ implements
//!          ▼
//!   ┌──────────────┐   reads price / history / holding
//!   │ TradingDesk  │◄──────────────────────────────┐
//!   └──────┬───────┘                               │
//!          │ submit(OrderIntent) → filled?   ┌─────┴────┐
//!          └────────────────────────────────►│ Strategy │
//!                                            └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bourse_strategy::{Strategy, StrategyParams};
//!
//! let strategy = Strategy::from_name("TrendFollowing", &StrategyParams::default());
//! let fills = strategy.decide(&account_id, &mut desk, &mut rng);
//! ```

pub mod desk;
pub mod indicators;
pub mod signals;
pub mod strategy;

// Re-export main types
pub use desk::{OrderIntent, TradingDesk};
pub use indicators::{sma, trailing_sma};
pub use strategy::{RANDOM_MAX_QUANTITY, Strategy, StrategyParams, TRADE_SIZE};
