//! Dynamics model — turns a winner count into reveal duration and friction
//!
//! The sphere decelerates for exactly as long as the reveal phase lasts, so
//! the last card leaves the sphere as it settles at idle speed:
//!
//! ```text
//! D       = Σ_{i<n} (base + (i/n)·span) + buffer        (ms)
//! frames  = D · fps / 1000
//! friction = (idle / max)^(1 / frames)   ⇒   max · friction^frames = idle
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, PhysicsConfig};
use crate::timing::TimingConfig;

/// Physical parameters for one draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsResult {
    /// Per-frame velocity decay while revealing, within the configured clamp
    pub friction_coefficient: f64,
    /// Reveals plus trailing buffer (ms)
    pub reveal_phase_duration_ms: u64,
}

/// Pure functions of the timing and physics constants
#[derive(Debug, Clone)]
pub struct DynamicsModel {
    timing: TimingConfig,
    physics: PhysicsConfig,
}

impl DynamicsModel {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            timing: config.timing.clone(),
            physics: config.physics.clone(),
        }
    }

    /// Wait after revealing winner `index` of `count` (ms)
    pub fn reveal_delay_ms(&self, index: usize, count: usize) -> f64 {
        self.timing.reveal_delay_ms(index, count)
    }

    /// Strictly serial reveal: each winner's delay summed, plus the buffer.
    /// Zero winners take no time at all.
    pub fn reveal_phase_duration_ms(&self, winner_count: usize) -> u64 {
        self.reveal_phase_span_ms(winner_count).round() as u64
    }

    /// Unrounded reveal phase, the span the reveal timer actually covers
    fn reveal_phase_span_ms(&self, winner_count: usize) -> f64 {
        if winner_count == 0 {
            return 0.0;
        }
        let reveals: f64 = (0..winner_count)
            .map(|i| self.reveal_delay_ms(i, winner_count))
            .sum();
        reveals + self.timing.reveal_buffer_ms
    }

    /// Nominal frames spanned by the reveal phase
    pub fn frames_for(&self, winner_count: usize) -> f64 {
        self.reveal_phase_span_ms(winner_count) * self.physics.fps / 1000.0
    }

    /// Per-frame decay that takes `max_speed` to `idle_speed` over the reveal
    /// phase, clamped to `[min_friction, max_friction]`.
    pub fn friction_coefficient(&self, winner_count: usize) -> f64 {
        let p = &self.physics;
        if winner_count == 0 {
            return p.idle_friction;
        }

        let frames = self.frames_for(winner_count);
        if !frames.is_finite() || frames <= 0.0 {
            return p.min_friction;
        }

        let friction = p.speed_ratio().powf(1.0 / frames);
        if friction.is_nan() {
            return p.min_friction;
        }
        friction.clamp(p.min_friction, p.max_friction)
    }

    /// Both parameters for one draw
    pub fn dynamics(&self, winner_count: usize) -> DynamicsResult {
        DynamicsResult {
            friction_coefficient: self.friction_coefficient(winner_count),
            reveal_phase_duration_ms: self.reveal_phase_duration_ms(winner_count),
        }
    }
}
