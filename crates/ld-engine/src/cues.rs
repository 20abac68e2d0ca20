//! Audio cues driven by stage events
//!
//! The engine never talks to an audio device. [`CueDispatcher`] is a stage
//! listener that owns an [`AudioService`] and turns draw stages into cues,
//! applying the session's mute flag and master volume.

use serde::{Deserialize, Serialize};

use ld_stage::{Stage, StageEvent};

use crate::listener::StageListener;

/// Sounds the presentation layer knows how to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Background loop while nothing is being drawn
    IdleMusic,
    /// Loop while the sphere rolls and reveals
    RollingMusic,
    /// Short noise burst when the sphere spins up
    RollingTick,
    /// Descending sweep as a card leaves the sphere
    CardFly,
    /// Chime when a card lands face up
    CardReveal,
    /// Result modal
    Fanfare,
}

impl Cue {
    /// Cue-specific gain before the master volume is applied
    pub fn base_gain(&self) -> f64 {
        match self {
            Cue::IdleMusic => 0.7,
            Cue::RollingMusic => 0.8,
            Cue::RollingTick => 0.1,
            Cue::CardFly => 0.3,
            Cue::CardReveal => 0.6,
            Cue::Fanfare => 0.6,
        }
    }

    /// Music beds loop until replaced
    pub fn is_looping(&self) -> bool {
        matches!(self, Cue::IdleMusic | Cue::RollingMusic)
    }
}

/// Output device abstraction
pub trait AudioService {
    /// Play a cue at an absolute gain in `[0, 1]`. Looping cues replace the
    /// current loop.
    fn play(&mut self, cue: Cue, gain: f64);

    /// Silence every loop
    fn stop_loops(&mut self);
}

/// Audio service that only logs, for headless sessions
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioService for LogAudio {
    fn play(&mut self, cue: Cue, gain: f64) {
        log::debug!("cue {:?} at gain {:.2}", cue, gain);
    }

    fn stop_loops(&mut self) {
        log::debug!("loops stopped");
    }
}

/// Maps stages to cues; honours mute and volume
pub struct CueDispatcher {
    service: Box<dyn AudioService>,
    muted: bool,
    volume: f64,
}

impl CueDispatcher {
    pub const DEFAULT_VOLUME: f64 = 0.5;

    pub fn new(service: Box<dyn AudioService>) -> Self {
        Self {
            service,
            muted: false,
            volume: Self::DEFAULT_VOLUME,
        }
    }

    /// Builder: initial mute flag and volume
    pub fn with_levels(mut self, muted: bool, volume: f64) -> Self {
        self.muted = muted;
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Muting also stops running loops
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.service.stop_loops();
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    /// Clamped to `[0, 1]`
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }

    fn emit(&mut self, cue: Cue) {
        if self.muted {
            return;
        }
        self.service.play(cue, cue.base_gain() * self.volume);
    }

    /// Cues for one stage, in play order
    pub fn cues_for(stage: &Stage) -> &'static [Cue] {
        match stage {
            Stage::RollStart { .. } => &[Cue::RollingMusic, Cue::RollingTick],
            Stage::WinnerReveal { .. } => &[Cue::CardFly, Cue::CardReveal],
            Stage::Celebrate { .. } => &[Cue::Fanfare],
            Stage::DrawComplete { .. } | Stage::SessionReset => &[Cue::IdleMusic],
            _ => &[],
        }
    }
}

impl StageListener for CueDispatcher {
    fn on_stage(&mut self, event: &StageEvent) {
        for &cue in Self::cues_for(&event.stage) {
            self.emit(cue);
        }
    }
}
