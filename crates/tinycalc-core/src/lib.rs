//! tinycalc-core - UI-agnostic sheet model + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{Cell, CellId, CellStore, Sheet};
pub use error::{CoreError, Result};

pub use tinycalc_engine::engine::{CellRef, ErrorKind, Value};
