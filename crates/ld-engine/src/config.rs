//! Engine configuration
//!
//! Built once at startup (from a profile or a file), validated, then shared
//! read-only by the dynamics model, the rotation simulator and the orchestrator.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::timing::{RevealFlow, TimingConfig, TimingProfile};

/// Sphere rotation parameters. Speeds are degrees per nominal frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Nominal display rate the per-frame constants refer to
    pub fps: f64,

    /// Slow rotation while nothing is being drawn
    pub idle_speed: f64,

    /// Top speed while rolling
    pub max_speed: f64,

    /// Velocity gained per frame while rolling
    pub acceleration: f64,

    /// Exponential smoothing factor toward idle speed (0-1)
    pub idle_lerp: f64,

    /// Lower clamp for the derived friction (fastest allowed decay)
    pub min_friction: f64,

    /// Upper clamp for the derived friction (slowest allowed decay)
    pub max_friction: f64,

    /// Friction used when no deceleration is needed (zero winners)
    pub idle_friction: f64,
}

impl PhysicsConfig {
    /// Paired with [`TimingConfig::standard`]: top speed is reached within
    /// `(max - idle) / acceleration` = 77 frames, well inside the pre-roll.
    pub fn standard() -> Self {
        Self {
            fps: 60.0,
            idle_speed: 0.3,
            max_speed: 8.0,
            acceleration: 0.1,
            idle_lerp: 0.1,
            min_friction: 0.9,
            max_friction: 0.9999,
            idle_friction: 0.96,
        }
    }

    /// Paired with [`TimingConfig::classic`]
    pub fn classic() -> Self {
        Self {
            fps: 60.0,
            idle_speed: 0.05,
            max_speed: 5.0,
            acceleration: 0.8,
            idle_lerp: 0.1,
            min_friction: 0.9,
            max_friction: 0.9999,
            idle_friction: 0.96,
        }
    }

    /// Length of one nominal frame (ms)
    pub fn frame_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    /// `idle_speed / max_speed`, the overall decay a reveal phase must produce
    pub fn speed_ratio(&self) -> f64 {
        self.idle_speed / self.max_speed
    }

    /// Frames needed to ramp from idle to top speed
    pub fn ramp_frames(&self) -> f64 {
        ((self.max_speed - self.idle_speed) / self.acceleration).ceil()
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub timing: TimingConfig,
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub flow: RevealFlow,
}

impl EngineConfig {
    pub fn standard() -> Self {
        Self {
            timing: TimingConfig::standard(),
            physics: PhysicsConfig::standard(),
            flow: RevealFlow::default(),
        }
    }

    pub fn classic() -> Self {
        Self {
            timing: TimingConfig::classic(),
            physics: PhysicsConfig::classic(),
            flow: RevealFlow::default(),
        }
    }

    /// Standard at quarter length; acceleration is quadrupled so the ramp
    /// still completes inside the shortened pre-roll.
    pub fn rehearsal() -> Self {
        let mut physics = PhysicsConfig::standard();
        physics.acceleration *= 4.0;
        Self {
            timing: TimingConfig::rehearsal(),
            physics,
            flow: RevealFlow::default(),
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Standard | TimingProfile::Custom => Self::standard(),
            TimingProfile::Classic => Self::classic(),
            TimingProfile::Rehearsal => Self::rehearsal(),
        }
    }

    /// Check every constant once; the config is immutable afterwards
    pub fn validate(&self) -> ConfigResult<()> {
        let p = &self.physics;
        let t = &self.timing;

        if !(p.fps.is_finite() && p.fps > 0.0) {
            return Err(ConfigError::InvalidParam(format!("fps must be > 0, got {}", p.fps)));
        }
        if !(p.idle_speed > 0.0 && p.idle_speed < p.max_speed) {
            return Err(ConfigError::InvalidParam(format!(
                "need 0 < idle_speed < max_speed, got {} / {}",
                p.idle_speed, p.max_speed
            )));
        }
        if p.acceleration <= 0.0 {
            return Err(ConfigError::InvalidParam("acceleration must be > 0".into()));
        }
        if !(p.idle_lerp > 0.0 && p.idle_lerp <= 1.0) {
            return Err(ConfigError::InvalidParam(format!(
                "idle_lerp must be in (0, 1], got {}",
                p.idle_lerp
            )));
        }
        if !(0.0 < p.min_friction && p.min_friction <= p.max_friction && p.max_friction < 1.0) {
            return Err(ConfigError::InvalidParam(format!(
                "need 0 < min_friction <= max_friction < 1, got [{}, {}]",
                p.min_friction, p.max_friction
            )));
        }
        if !(p.min_friction..=p.max_friction).contains(&p.idle_friction) {
            return Err(ConfigError::InvalidParam(
                "idle_friction must lie within the friction clamp".into(),
            ));
        }

        let durations = [
            ("pre_roll_ms", t.pre_roll_ms),
            ("reveal_base_delay_ms", t.reveal_base_delay_ms),
            ("reveal_span_ms", t.reveal_span_ms),
            ("reveal_buffer_ms", t.reveal_buffer_ms),
        ];
        for (name, value) in durations {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidParam(format!("{name} must be >= 0, got {value}")));
            }
        }
        // Friction is derived from a deceleration that starts at top speed
        let ramp_ms = p.ramp_frames() * p.frame_ms();
        if ramp_ms > t.pre_roll_ms {
            return Err(ConfigError::InvalidParam(format!(
                "pre_roll_ms ({}) ends before the sphere reaches max_speed ({:.0} ms)",
                t.pre_roll_ms, ramp_ms
            )));
        }
        if t.reveal_base_delay_ms < t.card.total_ms() {
            return Err(ConfigError::InvalidParam(format!(
                "reveal_base_delay_ms ({}) shorter than one card flight ({})",
                t.reveal_base_delay_ms,
                t.card.total_ms()
            )));
        }

        Ok(())
    }

    /// Parse JSON
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&content)?,
            _ => Self::from_json(&content)?,
        };
        log::info!(
            "Loaded engine config from {} ({:?} timing)",
            path.display(),
            config.timing.profile
        );
        Ok(config)
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for config in [
            EngineConfig::standard(),
            EngineConfig::classic(),
            EngineConfig::from_profile(TimingProfile::Rehearsal),
        ] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_ramp_fits_inside_pre_roll() {
        for config in [
            EngineConfig::standard(),
            EngineConfig::classic(),
            EngineConfig::rehearsal(),
        ] {
            let ramp_ms = config.physics.ramp_frames() * config.physics.frame_ms();
            assert!(ramp_ms < config.timing.pre_roll_ms);
        }
    }

    #[test]
    fn test_rejects_inverted_speeds() {
        let mut config = EngineConfig::standard();
        config.physics.idle_speed = 10.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidParam(_))));
    }

    #[test]
    fn test_rejects_pre_roll_shorter_than_ramp() {
        let mut config = EngineConfig::standard();
        config.timing.pre_roll_ms = 300.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidParam(_))));

        // Quarter-length timing only passes with the rehearsal acceleration
        let mut scaled = EngineConfig::standard();
        scaled.timing = scaled.timing.scaled(0.25);
        assert!(scaled.validate().is_err());
        EngineConfig::rehearsal().validate().unwrap();
    }

    #[test]
    fn test_rejects_overlapping_flights() {
        let mut config = EngineConfig::standard();
        config.timing.reveal_base_delay_ms = 1000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_keeps_derived_total() {
        let json = EngineConfig::classic().to_json().unwrap();
        let config = EngineConfig::from_json(&json).unwrap();
        assert_eq!(config, EngineConfig::classic());
        assert_eq!(config.timing.card.total_ms(), 500.0);
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r#"
timing:
  profile: custom
  pre_roll_ms: 2000
  reveal_base_delay_ms: 1200
  reveal_span_ms: 300
  reveal_buffer_ms: 400
  card:
    fly_to_center_ms: 300
    show_in_center_ms: 600
    fly_to_grid_ms: 300
physics:
  fps: 60
  idle_speed: 0.3
  max_speed: 8
  acceleration: 0.1
  idle_lerp: 0.1
  min_friction: 0.9
  max_friction: 0.9999
  idle_friction: 0.96
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.timing.profile, TimingProfile::Custom);
        assert_eq!(config.flow, RevealFlow::default());
    }
}
