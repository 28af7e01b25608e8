//! Bourse Ports
//!
//! Port definitions (traits) for the Bourse market simulator.
//! These define the boundary between the simulation engine and storage.

mod error;
mod records;
mod store;

pub use error::{StoreError, StoreResult};
pub use records::{AccountRecord, AssetRecord, InstrumentRecord, PriceRecord, WriteOp};
pub use store::Store;
