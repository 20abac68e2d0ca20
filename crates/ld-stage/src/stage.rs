//! Stage — The core enum defining all canonical draw moments
//!
//! A Stage is NOT an animation, NOT a timer callback.
//! A Stage is the SEMANTIC MEANING of a moment in the draw flow.

use serde::{Deserialize, Serialize};

/// Phase of the draw state machine.
///
/// The terminal phase of one draw is the initial phase of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrawPhase {
    /// Waiting for a start request
    #[default]
    Idle,
    /// Sphere accelerating, winners already sampled but hidden
    Rolling,
    /// Sphere decelerating, winners disclosed one at a time
    Revealing,
}

impl DrawPhase {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Rolling => "Rolling",
            Self::Revealing => "Revealing",
        }
    }

    /// A draw is in flight in every phase except `Idle`
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Canonical draw stage — the universal language of the draw flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // DRAW LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// A pool was chosen as the target of the next draw
    PoolSelected {
        pool_id: String,
        /// Units still available in the pool
        remaining: u32,
    },

    /// Start accepted, winners sampled, sphere begins to accelerate
    RollStart {
        pool_id: String,
        /// Number of winners that will be revealed
        winner_count: u32,
    },

    /// Pre-roll elapsed, sphere begins to decelerate
    RevealStart {
        winner_count: u32,
        /// Planned length of the reveal phase (reveals plus trailing buffer)
        duration_ms: u64,
        /// Per-frame velocity decay applied while revealing
        friction: f64,
    },

    /// One winner card leaves the sphere
    WinnerReveal {
        /// Position in reveal order (0-indexed)
        index: u32,
        participant_id: String,
        name: String,
        /// Specific prize unit bound to this winner
        item: String,
    },

    /// Last winner revealed, trailing buffer running
    RevealComplete { winner_count: u32 },

    /// Result committed, orchestrator back to idle
    DrawComplete {
        pool_id: String,
        pool_name: String,
        winner_count: u32,
        /// Pool flagged for distinct presentation (grand prize)
        headline: bool,
    },

    /// Celebration effects should fire
    Celebrate { headline: bool },

    // ═══════════════════════════════════════════════════════════════════════
    // CONTROL
    // ═══════════════════════════════════════════════════════════════════════
    /// A start request was refused; nothing changed
    Rejected {
        /// User-facing notice
        reason: String,
    },

    /// Explicit user-confirmed reset; pending timers cancelled
    SessionReset,
}

impl Stage {
    /// Get the canonical type name (snake_case)
    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::PoolSelected { .. } => "pool_selected",
            Stage::RollStart { .. } => "roll_start",
            Stage::RevealStart { .. } => "reveal_start",
            Stage::WinnerReveal { .. } => "winner_reveal",
            Stage::RevealComplete { .. } => "reveal_complete",
            Stage::DrawComplete { .. } => "draw_complete",
            Stage::Celebrate { .. } => "celebrate",
            Stage::Rejected { .. } => "rejected",
            Stage::SessionReset => "session_reset",
        }
    }

    /// Phase the orchestrator is in once this stage has been emitted,
    /// for stages that mark a transition.
    pub fn phase_after(&self) -> Option<DrawPhase> {
        match self {
            Stage::RollStart { .. } => Some(DrawPhase::Rolling),
            Stage::RevealStart { .. } => Some(DrawPhase::Revealing),
            Stage::DrawComplete { .. } | Stage::SessionReset => Some(DrawPhase::Idle),
            _ => None,
        }
    }

    /// Get all canonical type names
    pub fn all_type_names() -> &'static [&'static str] {
        &[
            "pool_selected",
            "roll_start",
            "reveal_start",
            "winner_reveal",
            "reveal_complete",
            "draw_complete",
            "celebrate",
            "rejected",
            "session_reset",
        ]
    }

    /// Check if a type name is a known stage
    pub fn is_valid_type_name(name: &str) -> bool {
        Self::all_type_names().contains(&name.to_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_are_registered() {
        let stages = [
            Stage::PoolSelected {
                pool_id: "first".into(),
                remaining: 1,
            },
            Stage::RevealComplete { winner_count: 2 },
            Stage::Celebrate { headline: true },
            Stage::SessionReset,
        ];
        for stage in &stages {
            assert!(Stage::is_valid_type_name(stage.type_name()));
        }
        assert!(Stage::is_valid_type_name("WINNER_REVEAL"));
        assert!(!Stage::is_valid_type_name("spin_start"));
    }

    #[test]
    fn test_phase_transitions() {
        let roll = Stage::RollStart {
            pool_id: "lucky".into(),
            winner_count: 3,
        };
        assert_eq!(roll.phase_after(), Some(DrawPhase::Rolling));
        assert_eq!(
            Stage::Rejected {
                reason: "no pool selected".into()
            }
            .phase_after(),
            None
        );
        assert!(DrawPhase::Revealing.is_busy());
        assert!(!DrawPhase::Idle.is_busy());
    }

    #[test]
    fn test_stage_serialization_is_tagged() {
        let stage = Stage::WinnerReveal {
            index: 0,
            participant_id: "7".into(),
            name: "Li Lei".into(),
            item: "Smart Watch".into(),
        };
        let json = serde_json::to_string(&stage).unwrap();
        assert!(json.contains("\"type\":\"winner_reveal\""));

        let back: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stage);
    }
}
