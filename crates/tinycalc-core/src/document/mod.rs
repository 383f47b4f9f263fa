//! Sheet state and recalculation logic (UI-agnostic).

mod eval;
mod io;
mod ops;
mod state;
mod store;

pub use state::Sheet;
pub use store::{Cell, CellId, CellStore};
