//! Attribute rows produced by structuring a data sheet.

use serde::{Deserialize, Serialize};

/// Spreadsheet column headers, in cell order.
pub const ATTRIBUTE_HEADERS: [&str; 11] = [
    "Field",
    "TPLNR",
    "CLASS",
    "KLART",
    "POSNUMMER",
    "ATNAM",
    "ATWRT",
    "Characteristics UoM",
    "Remarks",
    "Additional",
    "REF",
];

/// One equipment characteristic tied to its source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRow {
    pub functional_location: String,
    pub class_number: String,
    pub class_type: String,
    /// 1-based, unique and increasing within one document.
    pub position: u32,
    pub characteristic_name: String,
    pub characteristic_value: String,
    pub description: String,
    pub unit_of_measure: String,
    pub remarks: String,
    pub additional_info: String,
    pub document_reference: String,
}

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(u32),
}

impl AttributeRow {
    /// Cells in `ATTRIBUTE_HEADERS` order.
    pub fn cells(&self) -> [Cell<'_>; 11] {
        [
            Cell::Text(&self.functional_location),
            Cell::Text(&self.class_number),
            Cell::Text(&self.class_type),
            Cell::Number(self.position),
            Cell::Text(&self.characteristic_name),
            Cell::Text(&self.characteristic_value),
            Cell::Text(&self.description),
            Cell::Text(&self.unit_of_measure),
            Cell::Text(&self.remarks),
            Cell::Text(&self.additional_info),
            Cell::Text(&self.document_reference),
        ]
    }
}

/// Rows structured from one document, tagged with the document's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRows {
    /// File stem of the source document.
    pub source: String,
    pub rows: Vec<AttributeRow>,
}

impl DocumentRows {
    pub fn new(source: impl Into<String>, rows: Vec<AttributeRow>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
