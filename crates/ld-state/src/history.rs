//! Draw history persistence

use ld_engine::DrawRecord;

use crate::error::StateResult;
use crate::store::KeyValueStore;

/// Versioned key for the committed draw list
pub const HISTORY_KEY: &str = "LOTTERY_HISTORY_V2";

/// Saves and loads the ledger's history
#[derive(Debug)]
pub struct HistoryStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Empty when nothing has been saved yet
    pub fn load(&self) -> StateResult<Vec<DrawRecord>> {
        let history: Vec<DrawRecord> = self.store.get(HISTORY_KEY)?.unwrap_or_default();
        log::info!("Loaded {} draw records", history.len());
        Ok(history)
    }

    pub fn save(&self, history: &[DrawRecord]) -> StateResult<()> {
        self.store.set(HISTORY_KEY, &history)?;
        log::debug!("Saved {} draw records", history.len());
        Ok(())
    }

    pub fn clear(&self) -> StateResult<()> {
        self.store.remove(HISTORY_KEY)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Forget every draw of the session. Audio preferences are kept.
pub fn reset_session<S: KeyValueStore>(store: &S) -> StateResult<()> {
    store.remove(HISTORY_KEY)?;
    log::info!("Session history cleared");
    Ok(())
}
