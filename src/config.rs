//! Configuration management for datasheet-extract using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{AttributeCatalog, CatalogError};
use crate::ocr::OcrConfig;
use crate::output::OutputConfig;
use crate::services::StrategyConfig;

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Thresholds for choosing between direct extraction and OCR.
    #[serde(default, skip_serializing_if = "StrategyConfig::is_default")]
    pub extraction: StrategyConfig,
    /// Rendering, preprocessing and Tesseract settings.
    #[serde(default, skip_serializing_if = "OcrConfig::is_default")]
    pub ocr: OcrConfig,
    /// Sheet and column naming.
    #[serde(default, skip_serializing_if = "OutputConfig::is_default")]
    pub output: OutputConfig,
    /// Attribute catalog file replacing the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers datasheet-extract config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("datasheet-extract").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file: {}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory, else the working directory.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// The configured attribute catalog, or the built-in one.
    pub fn load_catalog(&self) -> Result<AttributeCatalog, CatalogError> {
        match &self.catalog {
            Some(catalog) => {
                let path = self.resolve_path(catalog, &self.base_dir());
                tracing::debug!("Loading catalog from {}", path.display());
                AttributeCatalog::load_from_path(&path)
            }
            None => Ok(AttributeCatalog::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_toml_sections() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("datasheet-extract.toml");
        std::fs::write(
            &path,
            r#"
[extraction]
batch_min_chars = 250

[ocr]
dpi = 200

[output]
sheet_name = "CHARS"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.extraction.batch_min_chars, 250);
        assert_eq!(config.extraction.single_min_chars, 50);
        assert_eq!(config.ocr.dpi, 200);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.output.sheet_name, "CHARS");
        assert_eq!(config.output.combined_sheet_name, "COMBINED_ATTRIBUTES");
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.base_dir(), temp.path());
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let temp = TempDir::new().unwrap();

        let yaml = temp.path().join("config.yml");
        std::fs::write(&yaml, "extraction:\n  ocr_improvement_ratio: 2.0\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.extraction.ocr_improvement_ratio, 2.0);

        let json = temp.path().join("config.json");
        std::fs::write(&json, r#"{"catalog": "flame.toml"}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.catalog.as_deref(), Some("flame.toml"));
        assert!(config.extraction.is_default());
    }

    #[tokio::test]
    async fn test_load_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[extraction\nbroken").unwrap();

        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(err.contains("TOML"));
    }

    #[tokio::test]
    async fn test_catalog_resolved_against_config_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("flame.toml"),
            "class_number = \"FG-FLAME\"\n",
        )
        .unwrap();
        let path = temp.path().join("datasheet-extract.toml");
        std::fs::write(&path, "catalog = \"flame.toml\"\n").unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.class_number, "FG-FLAME");
    }

    #[test]
    fn test_default_catalog_without_setting() {
        let catalog = Config::default().load_catalog().unwrap();
        assert_eq!(catalog, AttributeCatalog::default());
    }

    #[test]
    fn test_resolve_path() {
        let config = Config::default();
        let base = Path::new("/etc/dsx");
        assert_eq!(
            config.resolve_path("catalog.toml", base),
            PathBuf::from("/etc/dsx/catalog.toml")
        );
        assert_eq!(
            config.resolve_path("/opt/catalog.toml", base),
            PathBuf::from("/opt/catalog.toml")
        );
    }

    #[test]
    fn test_default_serializes_empty() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
