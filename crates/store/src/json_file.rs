//! JSON snapshot file store
//!
//! Keeps the whole store in memory and rewrites a single JSON file on every
//! committed batch. The file is replaced through a temporary sibling and a
//! rename, so a crash mid-write leaves the previous snapshot intact.

use bourse_core::{AccountId, InstrumentCode, Quantity};
use bourse_ports::{AccountRecord, InstrumentRecord, Store, StoreError, StoreResult, WriteOp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::state::StoreState;

/// On-disk layout
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    updated_at: DateTime<Utc>,
    #[serde(flatten)]
    state: StoreState,
}

/// File-backed store
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: StoreState,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            let snapshot: Snapshot = serde_json::from_str(&content)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            log::info!(
                "[JsonFileStore] Loaded {} (saved {}): {} instruments, {} accounts",
                path.display(),
                snapshot.updated_at,
                snapshot.state.instruments.len(),
                snapshot.state.accounts.len()
            );
            snapshot.state
        } else {
            log::info!("[JsonFileStore] {} not found, starting empty", path.display());
            StoreState::default()
        };

        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    fn write(&self, state: &StoreState) -> StoreResult<()> {
        #[derive(Serialize)]
        struct SnapshotRef<'a> {
            updated_at: DateTime<Utc>,
            #[serde(flatten)]
            state: &'a StoreState,
        }

        let json = serde_json::to_string_pretty(&SnapshotRef {
            updated_at: Utc::now(),
            state,
        })
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

impl Store for JsonFileStore {
    fn load_instruments(&self) -> StoreResult<Vec<InstrumentRecord>> {
        Ok(self.state.instrument_records())
    }

    fn load_accounts(&self) -> StoreResult<Vec<AccountRecord>> {
        Ok(self.state.account_records())
    }

    fn load_holdings(&self, account: &AccountId) -> StoreResult<BTreeMap<InstrumentCode, Quantity>> {
        Ok(self.state.holdings_of(account))
    }

    fn apply(&mut self, batch: &[WriteOp]) -> StoreResult<()> {
        // Applied to a copy so a failed write leaves the loaded state as on disk
        let mut next = self.state.clone();
        next.apply_batch(batch);
        self.write(&next)?;
        self.state = next;
        Ok(())
    }

    fn name(&self) -> &str {
        "JsonFileStore"
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
