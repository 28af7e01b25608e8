//! Bourse Store
//!
//! Persistence for the simulator:
//! - **WriteBuffer**: batches engine writes and flushes them atomically
//! - **InMemoryStore**: store for tests and throwaway runs
//! - **JsonFileStore**: snapshot file store for runs that resume
//!
//! Both stores share [`StoreState`], which holds the stored tables and
//! applies write batches to them.

pub mod buffer;
pub mod json_file;
pub mod memory;
pub mod state;

// Re-export main types
pub use buffer::{FlushOutcome, FlushStats, WriteBuffer};
pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;
pub use state::StoreState;
