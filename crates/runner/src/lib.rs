//! Bourse Runner - Multi-Agent Market Simulation
//!
//! Orchestrates the simulated market:
//!
//! - **Bootstrap**: Loading or synthesizing instruments and agents
//! - **Desk**: Order execution with solvency checks and price shocks
//! - **Simulation**: The tick loop with trade gating and bankruptcy halt
//! - **Snapshot**: Read-only tables and chart series
//!
//! ## Architecture
//!
//! ```text
//!               ┌──────────────────────────────────────────┐
//!               │                 Engine                   │
//!               │  clock · bankruptcy flag · gate RNG      │
//!               │                                          │
//!               │   ┌─────────────┐      ┌─────────────┐   │
//!               │   │  Strategy   │─────►│ MarketDesk  │   │
//!               │   │ (per agent) │ buy/ │ market +    │   │
//!               │   └─────────────┘ sell │ roster      │   │
//!               │                        └──────┬──────┘   │
//!               └───────────────────────────────┼──────────┘
//!                                               │ WriteOp
//!                                               ▼
//!                                     ┌───────────────────┐
//!                                     │   WriteBuffer     │
//!                                     │ (flush at N/force)│
//!                                     └─────────┬─────────┘
//!                                               ▼
//!                                        Store (memory/JSON)
//! ```

pub mod bootstrap;
pub mod config;
pub mod desk;
pub mod engine;
pub mod error;
pub mod simulation;
pub mod snapshot;

// Re-export main types
pub use bootstrap::{random_trader_id, trend_follower_id};
pub use config::{ConfigError, InstrumentConfig, SimulationConfig};
pub use desk::{Agent, Execution, Liquidation, MarketDesk, OrderCounters};
pub use engine::{Engine, PLAYER_ID};
pub use error::{EngineError, Result};
pub use simulation::RunSummary;
pub use snapshot::{AccountRow, InstrumentRow};

// Re-export Strategy for convenience
pub use bourse_strategy::Strategy;
