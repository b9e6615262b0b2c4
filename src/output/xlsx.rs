//! Attribute table spreadsheets via `rust_xlsxwriter`.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::{Deserialize, Serialize};

use crate::models::{AttributeRow, Cell, DocumentRows, ATTRIBUTE_HEADERS};

/// Sheet and column naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub sheet_name: String,
    pub combined_sheet_name: String,
    /// Extra trailing column in combined output holding the document name.
    pub source_column: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sheet_name: "ATTRIBUTES".to_string(),
            combined_sheet_name: "COMBINED_ATTRIBUTES".to_string(),
            source_column: "Source_PDF".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Writes attribute rows to `.xlsx` files.
#[derive(Debug, Clone, Default)]
pub struct XlsxWriter {
    config: OutputConfig,
}

impl XlsxWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// One document's rows on a single sheet.
    pub fn write_attributes(&self, rows: &[AttributeRow], path: &Path) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.config.sheet_name)?;

        write_header(sheet, &ATTRIBUTE_HEADERS)?;
        for (i, row) in rows.iter().enumerate() {
            write_row(sheet, i as u32 + 1, row)?;
        }

        workbook.save(path)?;
        tracing::info!(rows = rows.len(), path = %path.display(), "Wrote spreadsheet");
        Ok(())
    }

    /// Rows from many documents on one sheet, tagged with their source.
    pub fn write_combined(&self, documents: &[DocumentRows], path: &Path) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.config.combined_sheet_name)?;

        let mut headers: Vec<&str> = ATTRIBUTE_HEADERS.to_vec();
        headers.push(&self.config.source_column);
        write_header(sheet, &headers)?;

        let source_col = ATTRIBUTE_HEADERS.len() as u16;
        let mut row_num: u32 = 1;
        for document in documents {
            for row in &document.rows {
                write_row(sheet, row_num, row)?;
                sheet.write_string(row_num, source_col, &document.source)?;
                row_num += 1;
            }
        }

        workbook.save(path)?;
        tracing::info!(
            rows = row_num - 1,
            documents = documents.len(),
            path = %path.display(),
            "Wrote combined spreadsheet"
        );
        Ok(())
    }
}

fn write_header(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    Ok(())
}

fn write_row(sheet: &mut Worksheet, row_num: u32, row: &AttributeRow) -> Result<(), XlsxError> {
    for (col, cell) in row.cells().into_iter().enumerate() {
        let col = col as u16;
        match cell {
            Cell::Number(n) => {
                sheet.write_number(row_num, col, f64::from(n))?;
            }
            // blank cells stay unwritten
            Cell::Text("") => {}
            Cell::Text(s) => {
                sheet.write_string(row_num, col, s)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use tempfile::TempDir;

    fn row(position: u32, name: &str) -> AttributeRow {
        AttributeRow {
            functional_location: "11-18-XTGD-5403".to_string(),
            class_number: "FG-FGAS".to_string(),
            class_type: "003".to_string(),
            position,
            characteristic_name: name.to_string(),
            characteristic_value: "24 VDC".to_string(),
            description: "Power Requirement".to_string(),
            unit_of_measure: "V".to_string(),
            remarks: String::new(),
            additional_info: String::new(),
            document_reference: "P11569-11-99-40-2619-1".to_string(),
        }
    }

    fn text(cell: &Data) -> String {
        match cell {
            Data::String(s) => s.clone(),
            other => panic!("expected string cell, got {:?}", other),
        }
    }

    #[test]
    fn test_write_attributes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.xlsx");
        XlsxWriter::default()
            .write_attributes(&[row(1, "NACC01"), row(2, "POWREQ")], &path)
            .unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), ["ATTRIBUTES"]);
        let range = workbook.worksheet_range("ATTRIBUTES").unwrap();
        let rows: Vec<&[Data]> = range.rows().collect();

        assert_eq!(rows.len(), 3);
        let headers: Vec<String> = rows[0].iter().map(text).collect();
        assert_eq!(headers, ATTRIBUTE_HEADERS);
        assert_eq!(rows[1][3], Data::Float(1.0));
        assert_eq!(text(&rows[2][4]), "POWREQ");
        assert_eq!(text(&rows[2][10]), "P11569-11-99-40-2619-1");
    }

    #[test]
    fn test_write_combined_adds_source_column() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("combined.xlsx");
        let documents = vec![
            DocumentRows::new("first", vec![row(1, "NACC01"), row(2, "CALR01")]),
            DocumentRows::new("second", vec![row(1, "NACC01")]),
        ];
        XlsxWriter::default().write_combined(&documents, &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("COMBINED_ATTRIBUTES").unwrap();
        let rows: Vec<&[Data]> = range.rows().collect();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].len(), 12);
        assert_eq!(text(&rows[0][11]), "Source_PDF");
        let sources: Vec<String> = rows[1..].iter().map(|r| text(&r[11])).collect();
        assert_eq!(sources, ["first", "first", "second"]);
        assert_eq!(rows[3][3], Data::Float(1.0));
    }

    #[test]
    fn test_custom_sheet_name() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.xlsx");
        let writer = XlsxWriter::new(OutputConfig {
            sheet_name: "CHARACTERISTICS".to_string(),
            ..OutputConfig::default()
        });
        writer.write_attributes(&[row(1, "NACC01")], &path).unwrap();

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), ["CHARACTERISTICS"]);
    }
}
