//! Rotation simulator — the sphere's angle and angular velocity over time
//!
//! Per-frame constants are defined against a nominal frame of
//! `1000 / fps` ms. Every update scales by the elapsed frame count, so a
//! renderer running at 30, 60 or 144 Hz sees the same motion per second.

use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;

/// Which velocity law applies
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "snake_case")]
pub enum RotationRegime {
    /// Exponential approach to idle speed
    #[default]
    Idle,
    /// Linear ramp to top speed
    Accelerating,
    /// Geometric decay, floored at idle speed
    Decelerating { friction: f64 },
}

/// Snapshot handed to renderers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    /// Always in `[0, 360)`
    pub angle_degrees: f64,
    /// Degrees per nominal frame
    pub angular_velocity: f64,
}

/// Free-running sphere rotation
#[derive(Debug, Clone)]
pub struct RotationSimulator {
    physics: PhysicsConfig,
    regime: RotationRegime,
    angle: f64,
    velocity: f64,
}

impl RotationSimulator {
    /// Starts idle, at idle speed
    pub fn new(physics: PhysicsConfig) -> Self {
        let velocity = physics.idle_speed;
        Self {
            physics,
            regime: RotationRegime::Idle,
            angle: 0.0,
            velocity,
        }
    }

    pub fn accelerate(&mut self) {
        self.regime = RotationRegime::Accelerating;
    }

    pub fn decelerate(&mut self, friction: f64) {
        self.regime = RotationRegime::Decelerating { friction };
    }

    pub fn settle(&mut self) {
        self.regime = RotationRegime::Idle;
    }

    pub fn regime(&self) -> RotationRegime {
        self.regime
    }

    pub fn state(&self) -> RotationState {
        RotationState {
            angle_degrees: self.angle,
            angular_velocity: self.velocity,
        }
    }

    /// Advance by `dt_ms` of wall time. Non-positive or non-finite deltas
    /// are ignored.
    pub fn step(&mut self, dt_ms: f64) -> RotationState {
        if !(dt_ms.is_finite() && dt_ms > 0.0) {
            return self.state();
        }
        let frames = dt_ms / self.physics.frame_ms();
        let p = &self.physics;

        self.velocity = match self.regime {
            RotationRegime::Accelerating => (self.velocity + p.acceleration * frames).min(p.max_speed),
            RotationRegime::Decelerating { friction } => {
                (self.velocity * friction.powf(frames)).max(p.idle_speed)
            }
            RotationRegime::Idle => {
                p.idle_speed + (self.velocity - p.idle_speed) * (1.0 - p.idle_lerp).powf(frames)
            }
        };

        self.angle = (self.angle + self.velocity * frames).rem_euclid(360.0);
        self.state()
    }

    /// Advance by exactly one nominal frame
    pub fn step_frame(&mut self) -> RotationState {
        self.step(self.physics.frame_ms())
    }
}
