//! Attribute catalog and pattern set for one document family.
//!
//! The built-in defaults describe gas detector data sheets from oil and gas
//! projects. A catalog file (TOML, YAML or JSON) can replace any part of
//! them; fields left out keep their defaults.

mod defaults;

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or compiling a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// One known equipment attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTemplate {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
}

impl AttributeTemplate {
    pub fn new(name: &str, value: &str, description: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            description: description.to_string(),
            unit: unit.to_string(),
        }
    }
}

/// Fixed row content and templates for a document family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeCatalog {
    pub class_number: String,
    pub class_type: String,
    /// Used when no location code is found in the text.
    pub default_functional_location: String,
    /// Used when neither a document name nor the text yields a reference.
    pub default_document_reference: String,
    /// Attributes emitted for every structured document.
    pub templates: Vec<AttributeTemplate>,
    /// Functional location for the sample fallback table.
    pub sample_functional_location: String,
    /// Attributes emitted when nothing could be structured.
    pub sample_templates: Vec<AttributeTemplate>,
    pub patterns: PatternSet,
}

/// Pattern-matching vocabulary used by the structuring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSet {
    pub document_reference: String,
    /// Checked in order against each line.
    pub functional_location: Vec<String>,
    /// Location matches must be strictly longer than this.
    pub min_location_chars: usize,
    /// Leading lines searched for a document reference.
    pub reference_search_lines: usize,
    /// Lines containing any of these (case-sensitive) are skipped.
    pub skip_substrings: Vec<String>,
    /// Lines containing any of these (case-insensitive) are scanned for values.
    pub keywords: Vec<String>,
    /// Checked in order; first unit found anywhere in the line wins.
    pub units: Vec<String>,
    /// A token matching this is taken as the value.
    pub value_token: String,
    /// Tokens kept on each side of the value in the description.
    pub description_window: usize,
    pub max_description_chars: usize,
    /// Prefix for names synthesized from scanned lines.
    pub scanned_name_prefix: String,
}

impl AttributeCatalog {
    /// Load a catalog file, choosing the parser by extension.
    pub fn load_from_path(path: &Path) -> Result<Self, CatalogError> {
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: display.clone(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parsed = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
            _ => serde_json::from_str(&contents).map_err(|e| e.to_string()),
        };

        parsed.map_err(|reason| CatalogError::Parse {
            path: display,
            reason,
        })
    }
}

/// Regexes of a [`PatternSet`], compiled once.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub document_reference: Regex,
    pub functional_location: Vec<Regex>,
    pub value_token: Regex,
    /// Keywords upper-cased for matching against upper-cased lines.
    pub keywords: Vec<String>,
}

fn compile(pattern: &str) -> Result<Regex, CatalogError> {
    Regex::new(pattern).map_err(|source| CatalogError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl PatternSet {
    pub fn compile(&self) -> Result<CompiledPatterns, CatalogError> {
        Ok(CompiledPatterns {
            document_reference: compile(&self.document_reference)?,
            functional_location: self
                .functional_location
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_, _>>()?,
            value_token: compile(&self.value_token)?,
            keywords: self.keywords.iter().map(|k| k.to_uppercase()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_catalog_shape() {
        let catalog = AttributeCatalog::default();
        assert_eq!(catalog.templates.len(), 15);
        assert_eq!(catalog.sample_templates.len(), 15);
        assert_eq!(catalog.class_number, "FG-FGAS");
        assert_eq!(catalog.class_type, "003");
        // sample values differ from the template values
        for (t, s) in catalog.templates.iter().zip(&catalog.sample_templates) {
            assert_eq!(t.name, s.name);
            assert_ne!(t.value, s.value);
        }
    }

    #[test]
    fn test_default_patterns_compile() {
        let compiled = PatternSet::default().compile().unwrap();
        assert_eq!(compiled.functional_location.len(), 3);
        assert!(compiled.value_token.is_match("4-20"));
        assert!(!compiled.value_token.is_match("HART"));
    }

    #[test]
    fn test_compiled_keywords_are_uppercased() {
        let patterns = PatternSet {
            keywords: vec!["flame".to_string(), "Uv".to_string()],
            ..PatternSet::default()
        };
        let compiled = patterns.compile().unwrap();
        assert_eq!(compiled.keywords, ["FLAME", "UV"]);
    }

    #[test]
    fn test_invalid_pattern_reported() {
        let patterns = PatternSet {
            value_token: "(unclosed".to_string(),
            ..PatternSet::default()
        };
        assert!(matches!(
            patterns.compile(),
            Err(CatalogError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_load_partial_toml_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.toml");
        std::fs::write(
            &path,
            r#"
class_number = "FG-FLAME"

[[templates]]
name = "RESP01"
value = "< 5 s"
description = "Response Time"
unit = "s"

[patterns]
keywords = ["FLAME", "UV"]
"#,
        )
        .unwrap();

        let catalog = AttributeCatalog::load_from_path(&path).unwrap();
        assert_eq!(catalog.class_number, "FG-FLAME");
        assert_eq!(catalog.class_type, "003");
        assert_eq!(catalog.templates.len(), 1);
        assert_eq!(catalog.templates[0].unit, "s");
        assert_eq!(catalog.patterns.keywords, ["FLAME", "UV"]);
        assert_eq!(catalog.patterns.units, PatternSet::default().units);
        assert_eq!(catalog.sample_templates.len(), 15);
    }

    #[test]
    fn test_load_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.yaml");
        std::fs::write(&path, "class_type: \"011\"\ntemplates: []\n").unwrap();

        let catalog = AttributeCatalog::load_from_path(&path).unwrap();
        assert_eq!(catalog.class_type, "011");
        assert!(catalog.templates.is_empty());
    }

    #[test]
    fn test_load_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            AttributeCatalog::load_from_path(&path),
            Err(CatalogError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            AttributeCatalog::load_from_path(Path::new("/nonexistent/catalog.toml")),
            Err(CatalogError::Read { .. })
        ));
    }
}
