//! Session wiring: configuration, persisted state and the orchestrator

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ld_engine::{
    CueDispatcher, DrawOrchestrator, EngineConfig, LogAudio, PoolSet, Sampler, TimingProfile,
};
use ld_state::{AudioPreferences, HistoryStore, JsonFileStore};

/// Where configuration comes from
pub struct SessionOptions {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub profile: TimingProfile,
    pub pools: Option<PathBuf>,
    pub seed: Option<u64>,
}

pub struct Session {
    pub store: JsonFileStore,
    pub prefs: AudioPreferences,
    pub orchestrator: DrawOrchestrator,
}

impl Session {
    /// Load config, pools and saved history; the ledger is restored before
    /// anything else touches it.
    pub fn open(opts: &SessionOptions) -> Result<Self> {
        let config = match &opts.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => {
                let config = EngineConfig::from_profile(opts.profile);
                config.validate().context("Built-in profile is invalid")?;
                config
            }
        };

        let pools = match &opts.pools {
            Some(path) => PoolSet::load(path)
                .with_context(|| format!("Failed to load pools {}", path.display()))?,
            None => PoolSet::festival(),
        };

        let store = match &opts.data_dir {
            Some(dir) => JsonFileStore::new(dir),
            None => JsonFileStore::open_default().context("Cannot resolve data directory")?,
        };
        log::info!("Session data in {}", store.dir().display());

        let sampler = opts.seed.map_or_else(Sampler::new, Sampler::seeded);
        let mut orchestrator = DrawOrchestrator::new(config, pools).with_sampler(sampler);

        match HistoryStore::new(&store).load() {
            Ok(history) => orchestrator
                .restore_history(history)
                .context("Saved history does not fit the configured pools")?,
            Err(e) => log::error!("Saved history unreadable, starting fresh: {}", e),
        }

        let prefs = AudioPreferences::load(&store);
        Ok(Self {
            store,
            prefs,
            orchestrator,
        })
    }

    /// Attach the audio cue listener with the saved levels
    pub fn enable_audio(&mut self) {
        let cues = CueDispatcher::new(Box::new(LogAudio))
            .with_levels(self.prefs.muted, self.prefs.volume);
        self.orchestrator.add_listener(Box::new(cues));
    }

    pub fn save_history(&self) -> Result<()> {
        HistoryStore::new(&self.store)
            .save(self.orchestrator.ledger().history())
            .context("Failed to save draw history")
    }

    pub fn data_dir(&self) -> &Path {
        self.store.dir()
    }
}
