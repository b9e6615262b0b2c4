//! Data models for datasheet-extract.

mod attribute;
mod summary;

pub use attribute::{AttributeRow, Cell, DocumentRows, ATTRIBUTE_HEADERS};
pub use summary::{ProcessingStatus, ProcessingSummary};
