//! Sheet files and exports.
//!
//! A sheet file holds one line per non-empty cell, `<Col><Row>:<content>`,
//! separated by `\r\n`. Content is stored exactly as entered, including any
//! leading `=` or `'`.

pub mod md;
pub mod parser;
pub mod writer;

pub use md::{markdown_content, write_markdown};
pub use parser::{parse_sheet, parse_sheet_content};
pub use writer::{write_sheet, write_sheet_content};
