use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Indentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IndentConfig {
    /// Number of columns one indent level occupies (default: 4)
    #[serde(default = "default_shift_width")]
    pub shift_width: usize,

    /// Display width of a tab character when measuring existing indentation (default: 4)
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,

    /// Number of capture maps kept in the per-process cache (default: 64)
    #[serde(default = "default_capture_cache_size")]
    pub capture_cache_size: usize,

    /// Per-language overrides, keyed by grammar name (e.g. "python")
    #[serde(default)]
    pub languages: HashMap<String, LanguageIndentConfig>,
}

/// Per-language indentation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LanguageIndentConfig {
    /// Override the global shift width for this language.
    /// If not specified, falls back to the global shift_width setting.
    #[serde(default)]
    pub shift_width: Option<usize>,

    /// Use tree-sitter indentation for this language (default: true).
    /// When disabled every line defers to generic auto-indent.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_shift_width() -> usize {
    4
}

fn default_tab_size() -> usize {
    4
}

fn default_capture_cache_size() -> usize {
    64
}

fn default_true() -> bool {
    true
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            shift_width: default_shift_width(),
            tab_size: default_tab_size(),
            capture_cache_size: default_capture_cache_size(),
            languages: HashMap::new(),
        }
    }
}

impl IndentConfig {
    /// The config filename used throughout the project
    pub const FILENAME: &'static str = "indent.json";

    /// Shift width in effect for a language, honoring per-language overrides
    pub fn effective_shift_width(&self, language: &str) -> usize {
        self.languages
            .get(language)
            .and_then(|lang| lang.shift_width)
            .unwrap_or(self.shift_width)
    }

    /// Whether tree-sitter indentation is enabled for a language
    pub fn is_enabled(&self, language: &str) -> bool {
        self.languages
            .get(language)
            .map(|lang| lang.enabled)
            .unwrap_or(true)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: IndentConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shift_width == 0 {
            return Err(ConfigError::ValidationError(
                "shift_width must be greater than 0".to_string(),
            ));
        }

        if self.tab_size == 0 {
            return Err(ConfigError::ValidationError(
                "tab_size must be greater than 0".to_string(),
            ));
        }

        if self.capture_cache_size == 0 {
            return Err(ConfigError::ValidationError(
                "capture_cache_size must be greater than 0".to_string(),
            ));
        }

        for (name, lang) in &self.languages {
            if lang.shift_width == Some(0) {
                return Err(ConfigError::ValidationError(format!(
                    "languages.{name}.shift_width must be greater than 0"
                )));
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IndentConfig::default();
        assert_eq!(config.shift_width, 4);
        assert_eq!(config.tab_size, 4);
        assert_eq!(config.capture_cache_size, 64);
        assert!(config.languages.is_empty());
    }

    #[test]
    fn test_config_validation() {
        let mut config = IndentConfig::default();
        assert!(config.validate().is_ok());

        config.shift_width = 0;
        assert!(config.validate().is_err());

        let mut config = IndentConfig::default();
        config.languages.insert(
            "c".to_string(),
            LanguageIndentConfig {
                shift_width: Some(0),
                enabled: true,
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_language_overrides() {
        let json = r#"{
            "shift_width": 2,
            "languages": {
                "python": { "shift_width": 4 },
                "json": { "enabled": false }
            }
        }"#;

        let config: IndentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.effective_shift_width("python"), 4);
        assert_eq!(config.effective_shift_width("c"), 2);
        assert_eq!(config.effective_shift_width("json"), 2);
        assert!(!config.is_enabled("json"));
        assert!(config.is_enabled("python"));
        assert!(config.is_enabled("rust"));
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(IndentConfig::FILENAME);
        std::fs::write(&config_path, r#"{ "shift_width": 8 }"#).unwrap();

        let loaded = IndentConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.shift_width, 8);
        assert_eq!(loaded.tab_size, 4);
    }

    #[test]
    fn test_config_load_rejects_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(IndentConfig::FILENAME);
        std::fs::write(&config_path, r#"{ "tab_size": 0 }"#).unwrap();

        match IndentConfig::load_from_file(&config_path) {
            Err(ConfigError::ValidationError(_)) => {}
            other => panic!("expected validation error, got {other:?}"),
        }

        std::fs::write(&config_path, "{ not json").unwrap();
        assert!(matches!(
            IndentConfig::load_from_file(&config_path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
