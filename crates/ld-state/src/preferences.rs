//! Audio preferences

use serde::{Deserialize, Serialize};

use crate::error::StateResult;
use crate::store::KeyValueStore;

pub const MUTED_KEY: &str = "lottery_audio_muted";
pub const VOLUME_KEY: &str = "lottery_audio_volume";

/// Mute flag and master volume, persisted across sessions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioPreferences {
    pub muted: bool,
    /// Master volume in `[0, 1]`
    pub volume: f64,
}

impl Default for AudioPreferences {
    fn default() -> Self {
        Self {
            muted: false,
            volume: 0.5,
        }
    }
}

impl AudioPreferences {
    /// Missing or unreadable values fall back to the defaults
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let defaults = Self::default();
        let muted = store.get::<bool>(MUTED_KEY).unwrap_or_else(|e| {
            log::warn!("Ignoring stored mute flag: {}", e);
            None
        });
        let volume = store.get::<f64>(VOLUME_KEY).unwrap_or_else(|e| {
            log::warn!("Ignoring stored volume: {}", e);
            None
        });

        let mut prefs = Self {
            muted: muted.unwrap_or(defaults.muted),
            volume: defaults.volume,
        };
        prefs.set_volume(volume.unwrap_or(defaults.volume));
        prefs
    }

    pub fn save<S: KeyValueStore>(&self, store: &S) -> StateResult<()> {
        store.set(MUTED_KEY, &self.muted)?;
        store.set(VOLUME_KEY, &self.volume)?;
        Ok(())
    }

    /// Clamped to `[0, 1]`; NaN is treated as silence
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }
}
