//! tinycalc_engine - formula language for the tinycalc spreadsheet.

pub mod builtins;
pub mod engine;
