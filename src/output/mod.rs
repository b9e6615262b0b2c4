//! Spreadsheet output.

mod xlsx;

pub use xlsx::{OutputConfig, XlsxWriter};
