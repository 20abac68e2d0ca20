//! # ld-engine — Draw-and-Reveal Timing Engine for Lucky Sphere
//!
//! Selects winners fairly, drives the rotating sphere, and sequences the
//! reveal of individual winners on a deterministic timeline.
//!
//! ## Features
//!
//! - **Sampler**: uniform selection without replacement, uniform item shuffle
//! - **Inventory Ledger**: prize pools, remaining capacity, append-only history
//! - **Dynamics Model**: reveal duration and deceleration derived from winner count
//! - **Rotation Simulator**: free-running idle/accelerating/decelerating sphere
//! - **Draw Orchestrator**: `Idle → Rolling → Revealing → Idle` state machine
//! - **Timing Profiles**: Standard, Classic, Rehearsal
//!
//! ## Architecture
//!
//! ```text
//! DrawOrchestrator
//!     │
//!     ├── InventoryLedger (pools, history)
//!     ├── Sampler (winners, item units)
//!     ├── DynamicsModel (friction, reveal duration)
//!     ├── RotationSimulator (angle per frame)
//!     └── RevealTimer (one pending step)
//!           │
//!           v
//!     StageEvent → StageListener (render, audio, persistence)
//! ```

pub mod config;
pub mod cues;
pub mod dynamics;
pub mod error;
pub mod ledger;
pub mod listener;
pub mod orchestrator;
pub mod participant;
pub mod pool;
pub mod rotation;
pub mod sampler;
pub mod timer;
pub mod timing;

pub use config::*;
pub use cues::*;
pub use dynamics::*;
pub use error::*;
pub use ledger::*;
pub use listener::*;
pub use orchestrator::*;
pub use participant::*;
pub use pool::*;
pub use rotation::*;
pub use sampler::*;
pub use timer::*;
pub use timing::*;
