//! StageTrace — A complete sequence of stage events for one draw or session
//!
//! A trace captures the full timeline of a draw so it can be inspected,
//! replayed by a presentation layer, or asserted on in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::StageEvent;
use crate::stage::{DrawPhase, Stage};

/// A complete trace of stage events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTrace {
    /// Unique identifier for this trace
    pub trace_id: String,

    /// All events in emission order
    pub events: Vec<StageEvent>,

    /// When this trace was recorded
    pub recorded_at: DateTime<Utc>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl StageTrace {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            events: Vec::new(),
            recorded_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn push(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Get total duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }

    /// Get events by stage type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.type_name() == type_name)
            .collect()
    }

    /// Check if trace contains a specific stage type
    pub fn has_stage(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.stage.type_name() == type_name)
    }

    /// All winner reveal events, in reveal order
    pub fn reveals(&self) -> Vec<&StageEvent> {
        self.events_by_type("winner_reveal")
    }

    /// Timestamps of consecutive reveals subtracted pairwise
    pub fn reveal_gaps_ms(&self) -> Vec<f64> {
        self.reveals()
            .windows(2)
            .map(|pair| pair[1].timestamp_ms - pair[0].timestamp_ms)
            .collect()
    }

    /// Phase reached after replaying every transition in the trace
    pub fn final_phase(&self) -> DrawPhase {
        self.events
            .iter()
            .filter_map(|e| e.stage.phase_after())
            .last()
            .unwrap_or_default()
    }

    /// Validate trace has required stages in a sane order
    pub fn validate(&self) -> TraceValidation {
        let reveal_indices: Vec<u32> = self
            .events
            .iter()
            .filter_map(|e| match &e.stage {
                Stage::WinnerReveal { index, .. } => Some(*index),
                _ => None,
            })
            .collect();

        let announced = self.events.iter().find_map(|e| match &e.stage {
            Stage::RollStart { winner_count, .. } => Some(*winner_count),
            _ => None,
        });

        TraceValidation {
            has_roll_start: self.has_stage("roll_start"),
            has_reveal_start: self.has_stage("reveal_start"),
            has_draw_complete: self.has_stage("draw_complete"),
            reveal_count: reveal_indices.len() as u32,
            announced_winners: announced.unwrap_or(0),
            reveals_in_order: reveal_indices
                .iter()
                .enumerate()
                .all(|(i, &idx)| idx as usize == i),
            timestamps_monotonic: self
                .events
                .windows(2)
                .all(|pair| pair[1].timestamp_ms >= pair[0].timestamp_ms),
        }
    }

    /// Get summary of trace
    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            trace_id: self.trace_id.clone(),
            event_count: self.events.len(),
            duration_ms: self.duration_ms(),
            reveal_count: self.reveals().len(),
            rejected_count: self.events_by_type("rejected").len(),
        }
    }
}

/// Validation result for a trace
#[derive(Debug, Clone, Default)]
pub struct TraceValidation {
    pub has_roll_start: bool,
    pub has_reveal_start: bool,
    pub has_draw_complete: bool,
    pub reveal_count: u32,
    pub announced_winners: u32,
    pub reveals_in_order: bool,
    pub timestamps_monotonic: bool,
}

impl TraceValidation {
    /// Check if trace describes one complete draw
    pub fn is_valid(&self) -> bool {
        self.has_roll_start
            && self.has_reveal_start
            && self.has_draw_complete
            && self.reveal_count == self.announced_winners
            && self.reveals_in_order
            && self.timestamps_monotonic
    }

    /// Get list of warnings
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();

        if !self.has_roll_start {
            warnings.push("Missing ROLL_START event");
        }
        if !self.has_reveal_start {
            warnings.push("Missing REVEAL_START event");
        }
        if !self.has_draw_complete {
            warnings.push("Missing DRAW_COMPLETE event");
        }
        if self.reveal_count != self.announced_winners {
            warnings.push("Reveal count differs from announced winner count");
        }
        if !self.reveals_in_order {
            warnings.push("Winners revealed out of order");
        }
        if !self.timestamps_monotonic {
            warnings.push("Event timestamps go backwards");
        }

        warnings
    }
}

/// Summary of a trace for quick overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub event_count: usize,
    pub duration_ms: f64,
    pub reveal_count: usize,
    pub rejected_count: usize,
}
