//! ld-file: Participant import and result export
//!
//! Sheets travel as JSON arrays of row objects keyed by column header, the
//! shape spreadsheet tools produce when a worksheet is converted to JSON.
//! Headers are mapped through a [`ColumnMap`], so both the Chinese
//! template ("序号", "姓名", "部门") and an English one are understood.

mod columns;
mod error;
mod export;
mod source;

pub use columns::*;
pub use error::*;
pub use export::*;
pub use source::*;
