//! Participants and the transient winner annotation

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Participant identifier as it appears in the source sheet (number or text)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParticipantId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParticipantId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One eligible person. Identity is `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub department: String,
}

impl Participant {
    pub fn new(
        id: impl Into<ParticipantId>,
        name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
        }
    }
}

// Two participants with the same name are still different people.
impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Participant {}

impl Hash for Participant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Reveal state of a winner card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevealMark {
    /// Sampled but still hidden in the sphere
    #[default]
    Pending,
    /// Card has left the sphere
    Revealed,
}

/// A participant bound to a specific prize unit for one draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    #[serde(flatten)]
    pub participant: Participant,
    /// Specific prize unit (falls back to the pool name for item-less pools)
    pub assigned_item: String,
    #[serde(default)]
    pub revealing: RevealMark,
}

impl Winner {
    pub fn new(participant: Participant, assigned_item: impl Into<String>) -> Self {
        Self {
            participant,
            assigned_item: assigned_item.into(),
            revealing: RevealMark::Pending,
        }
    }

    pub fn id(&self) -> &ParticipantId {
        &self.participant.id
    }

    pub fn is_revealed(&self) -> bool {
        self.revealing == RevealMark::Revealed
    }
}
