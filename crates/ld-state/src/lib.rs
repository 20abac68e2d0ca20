//! ld-state: Session persistence
//!
//! Draw history and audio preferences survive a restart through a small
//! key/value store. Keys are versioned so an incompatible format can move to
//! a new key instead of misreading old data.

mod error;
mod history;
mod preferences;
mod store;

pub use error::*;
pub use history::*;
pub use preferences::*;
pub use store::*;
