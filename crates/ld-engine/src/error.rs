//! Error types for the draw engine

use thiserror::Error;

/// A start request the orchestrator refused.
///
/// `Display` is the notice shown to the operator. Nothing is mutated when one
/// of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("no pool selected")]
    NoPoolSelected,

    #[error("unknown pool: {0}")]
    UnknownPool(String),

    #[error("a draw is already in progress")]
    DrawInProgress,

    #[error("no participants left to draw from")]
    NoCandidates,

    #[error("pool exhausted: {0}")]
    PoolExhausted(String),

    #[error("invalid winner count: {0}")]
    InvalidCount(usize),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Ledger contract violations.
///
/// The orchestrator clamps to capacity before sampling, so any of these in a
/// running session points at a bug upstream of the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown pool: {0}")]
    UnknownPool(String),

    #[error("pool {pool_id}: {requested} winners exceed remaining capacity {remaining}")]
    CapacityExceeded {
        pool_id: String,
        requested: usize,
        remaining: usize,
    },

    #[error("pool {pool_id}: {winners} winners but {items} assigned items")]
    ItemMismatch {
        pool_id: String,
        winners: usize,
        items: usize,
    },
}

/// Invalid or unreadable engine configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DrawResult<T> = Result<T, DrawError>;
pub type LedgerResult<T> = Result<T, LedgerError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
