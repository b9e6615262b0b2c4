//! Turning extracted text into attribute rows.
//!
//! Every structured document gets the catalog's template rows followed by
//! one synthesized row per technical line found in the text. When nothing
//! can be structured, the catalog's sample table stands in so a document
//! never contributes zero rows.

use super::ProcessingError;
use crate::catalog::{AttributeCatalog, AttributeTemplate, CatalogError, CompiledPatterns};
use crate::models::AttributeRow;

/// Rows produced for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredRows {
    pub rows: Vec<AttributeRow>,
    /// True when the rows came from the sample table.
    pub used_sample: bool,
}

/// Applies an [`AttributeCatalog`] to extracted text.
pub struct StructuringEngine {
    catalog: AttributeCatalog,
    patterns: CompiledPatterns,
}

impl StructuringEngine {
    pub fn new(catalog: AttributeCatalog) -> Result<Self, CatalogError> {
        let patterns = catalog.patterns.compile()?;
        Ok(Self { catalog, patterns })
    }

    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    /// Structure text into rows. Returns nothing for blank text.
    pub fn structure(&self, text: &str, document_name: Option<&str>) -> Vec<AttributeRow> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            tracing::warn!("No text to process");
            return Vec::new();
        }

        let mut document_reference = match document_name {
            Some(name) => self.reference_from_name(name),
            None => self.catalog.default_document_reference.clone(),
        };
        if let Some(found) = self.reference_in_text(&lines) {
            document_reference = found;
        }

        let functional_location = self
            .functional_location(&lines)
            .unwrap_or_else(|| self.catalog.default_functional_location.clone());

        let builder = RowBuilder {
            catalog: &self.catalog,
            functional_location: &functional_location,
            document_reference: &document_reference,
        };

        let mut rows = Vec::new();
        let mut position: u32 = 1;

        for template in &self.catalog.templates {
            if template.value.is_empty() && position % 3 == 0 {
                continue;
            }
            rows.push(builder.template_row(position, template));
            position += 1;
        }

        for line in &lines {
            if let Some(row) = self.scan_line(&builder, position, line) {
                rows.push(row);
                position += 1;
            }
        }

        tracing::info!(rows = rows.len(), "Structured attribute rows");
        rows
    }

    /// The fixed sample table, tagged with a reference derived from the name.
    pub fn sample_rows(&self, document_name: &str) -> Vec<AttributeRow> {
        let document_reference = self.reference_from_name(document_name);
        let builder = RowBuilder {
            catalog: &self.catalog,
            functional_location: &self.catalog.sample_functional_location,
            document_reference: &document_reference,
        };

        let rows: Vec<AttributeRow> = self
            .catalog
            .sample_templates
            .iter()
            .zip(1u32..)
            .map(|(template, position)| builder.template_row(position, template))
            .collect();

        tracing::info!(rows = rows.len(), document = document_name, "Generated sample attributes");
        rows
    }

    /// Structure text, falling back to the sample table when that yields nothing.
    pub fn structure_or_sample(
        &self,
        text: &str,
        document_name: &str,
    ) -> Result<StructuredRows, ProcessingError> {
        let rows = self.structure(text, Some(document_name));
        if !rows.is_empty() {
            return Ok(StructuredRows {
                rows,
                used_sample: false,
            });
        }

        tracing::warn!("No structured data could be extracted, using sample data");
        let rows = self.sample_rows(document_name);
        if rows.is_empty() {
            return Err(ProcessingError::EmptyStructuringResult(
                document_name.to_string(),
            ));
        }
        Ok(StructuredRows {
            rows,
            used_sample: true,
        })
    }

    /// Reference derived from a document name, always `P`-prefixed and `-1`-suffixed.
    pub fn reference_from_name(&self, name: &str) -> String {
        match self.patterns.document_reference.find(name) {
            Some(m) => {
                let mut reference = with_p_prefix(m.as_str());
                if !reference.ends_with("-1") {
                    reference.push_str("-1");
                }
                reference
            }
            None => format!("P{}-1", name.replace('-', ".")),
        }
    }

    fn reference_in_text(&self, lines: &[&str]) -> Option<String> {
        lines
            .iter()
            .take(self.catalog.patterns.reference_search_lines)
            .find_map(|line| self.patterns.document_reference.find(line))
            .map(|m| with_p_prefix(m.as_str()))
    }

    fn functional_location(&self, lines: &[&str]) -> Option<String> {
        let min_chars = self.catalog.patterns.min_location_chars;
        lines.iter().find_map(|line| {
            self.patterns
                .functional_location
                .iter()
                .filter_map(|re| re.find(line))
                .map(|m| m.as_str())
                .find(|s| s.chars().count() > min_chars)
                .map(str::to_string)
        })
    }

    fn scan_line(&self, builder: &RowBuilder<'_>, position: u32, line: &str) -> Option<AttributeRow> {
        let patterns = &self.catalog.patterns;

        if patterns.skip_substrings.iter().any(|s| line.contains(s.as_str())) {
            return None;
        }

        let upper = line.to_uppercase();
        if !self.patterns.keywords.iter().any(|k| upper.contains(k.as_str())) {
            return None;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let index = tokens
            .iter()
            .position(|t| self.patterns.value_token.is_match(t))?;

        let window = patterns.description_window;
        let start = index.saturating_sub(window);
        let end = (index + window + 1).min(tokens.len());
        let description: String = tokens[start..end]
            .join(" ")
            .chars()
            .take(patterns.max_description_chars)
            .collect();

        let lower = line.to_lowercase();
        let unit = patterns
            .units
            .iter()
            .find(|u| lower.contains(&u.to_lowercase()))
            .cloned()
            .unwrap_or_default();

        Some(builder.row(
            position,
            format!("{}{:02}", patterns.scanned_name_prefix, position),
            tokens[index].to_string(),
            description.trim().to_string(),
            unit,
        ))
    }
}

fn with_p_prefix(reference: &str) -> String {
    if reference.starts_with('P') {
        reference.to_string()
    } else {
        format!("P{}", reference)
    }
}

/// Fills in the columns shared by every row of a document.
struct RowBuilder<'a> {
    catalog: &'a AttributeCatalog,
    functional_location: &'a str,
    document_reference: &'a str,
}

impl RowBuilder<'_> {
    fn template_row(&self, position: u32, template: &AttributeTemplate) -> AttributeRow {
        self.row(
            position,
            template.name.clone(),
            template.value.clone(),
            template.description.clone(),
            template.unit.clone(),
        )
    }

    fn row(
        &self,
        position: u32,
        name: String,
        value: String,
        description: String,
        unit: String,
    ) -> AttributeRow {
        AttributeRow {
            functional_location: self.functional_location.to_string(),
            class_number: self.catalog.class_number.clone(),
            class_type: self.catalog.class_type.clone(),
            position,
            characteristic_name: name,
            characteristic_value: value,
            description,
            unit_of_measure: unit,
            remarks: String::new(),
            additional_info: String::new(),
            document_reference: self.document_reference.to_string(),
        }
    }
}
