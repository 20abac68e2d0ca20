//! # ld-stage — Lucky Sphere Stage System
//!
//! Defines the canonical moments of a draw that every presentation layer maps to.
//! Render, audio cues and persistence hooks consume stages, not engine state.
//!
//! ## Philosophy
//!
//! Every draw, regardless of pool or winner count, passes through the same phases:
//! - Draw starts → Sphere rolls → Winners revealed one by one → Draw completes
//!
//! This crate defines these stages, the timestamped events that carry them, and
//! traces that record a full draw for inspection.

pub mod event;
pub mod stage;
pub mod trace;

pub use event::*;
pub use stage::*;
pub use trace::*;
