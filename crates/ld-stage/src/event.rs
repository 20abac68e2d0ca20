//! StageEvent — A stage occurrence with metadata
//!
//! Wraps a Stage with timing and payload.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A stage event with full metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    /// The canonical stage
    pub stage: Stage,

    /// Timestamp in milliseconds on the session clock
    pub timestamp_ms: f64,

    /// Additional payload data
    #[serde(default)]
    pub payload: StagePayload,

    /// Custom tags for filtering/routing
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StageEvent {
    pub fn new(stage: Stage, timestamp_ms: f64) -> Self {
        Self {
            stage,
            timestamp_ms,
            payload: StagePayload::default(),
            tags: Vec::new(),
        }
    }

    pub fn with_payload(stage: Stage, timestamp_ms: f64, payload: StagePayload) -> Self {
        Self {
            stage,
            timestamp_ms,
            payload,
            tags: Vec::new(),
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }
}

/// Additional payload data for a stage event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagePayload {
    /// Sphere angle when the event fired (degrees)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_degrees: Option<f64>,

    /// Sphere angular velocity when the event fired (degrees per frame)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_velocity: Option<f64>,

    /// Participants still eligible after this event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates_remaining: Option<u32>,

    /// Department of the revealed winner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Arbitrary JSON for layer-specific data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

impl StagePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with rotation snapshot
    pub fn with_rotation(angle_degrees: f64, angular_velocity: f64) -> Self {
        Self {
            angle_degrees: Some(angle_degrees),
            angular_velocity: Some(angular_velocity),
            ..Default::default()
        }
    }

    /// Builder: set remaining candidate count
    pub fn candidates_remaining(mut self, count: u32) -> Self {
        self.candidates_remaining = Some(count);
        self
    }

    /// Builder: set department
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Builder: set custom data
    pub fn custom(mut self, data: serde_json::Value) -> Self {
        self.custom = Some(data);
        self
    }
}
