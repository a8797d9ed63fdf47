//! Configuration file support for journal-scan
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./journal-scan.toml` - current directory
//! 3. `~/.config/journal-scan/config.toml` - user config
//! 4. Default values
//!
//! The recognition service endpoint and key have no defaults and must come
//! from the file; everything else is optional. Collaborator sections
//! (detection, translation, correction) enable their step only when both
//! endpoint and key are present.
//!
//! # Example Configuration
//!
//! ```toml
//! [general]
//! gutter_width = 12
//! verbose = true
//!
//! [recognition]
//! endpoint = "https://example.invalid/vision/analyze"
//! key = "subscription-key"
//! mode = "text"
//!
//! [translation]
//! endpoint = "https://example.invalid/translate"
//! key = "subscription-key"
//! target_lang = "en"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::ProcessOptions;
use crate::recognize::RecognitionMode;

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Recognition endpoint or key absent
    #[error("Missing one of the recognition service settings (endpoint, key).")]
    MissingRecognitionService,
}

/// General processing options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Binder gutter width in pixels, excluded from both split halves
    #[serde(default)]
    pub gutter_width: Option<u32>,

    /// Write annotated page images (effective only with verbose)
    #[serde(default)]
    pub save_images: Option<bool>,

    /// Emit extra diagnostic lines
    #[serde(default)]
    pub verbose: Option<bool>,

    /// Run translated sentences through the correction collaborator
    #[serde(default)]
    pub correct_translations: Option<bool>,
}

/// Recognition service settings
///
/// Endpoint and key are both required; `validate` rejects a config where
/// either is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecognitionConfig {
    /// Service URL receiving the JPEG-encoded page
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Subscription key sent with every request
    #[serde(default)]
    pub key: Option<String>,

    /// Response shape: "tags" or "text"
    #[serde(default)]
    pub mode: Option<RecognitionMode>,

    /// Per-request timeout in seconds, shared by all collaborators
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Annotated-image output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnnotationConfig {
    /// JPEG quality (1-100)
    #[serde(default)]
    pub quality: Option<u8>,

    /// TTF/OTF font used for tag labels
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

/// Endpoint + key pair for an optional collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub key: Option<String>,
}

impl ServiceConfig {
    /// Endpoint and key when both are present, which is what enables the
    /// collaborator
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.endpoint.as_deref(), self.key.as_deref()) {
            (Some(endpoint), Some(key)) => Some((endpoint, key)),
            _ => None,
        }
    }
}

/// Translation collaborator settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TranslationConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub key: Option<String>,

    /// Language sentences are translated into
    #[serde(default)]
    pub target_lang: Option<String>,
}

impl TranslationConfig {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.endpoint.as_deref(), self.key.as_deref()) {
            (Some(endpoint), Some(key)) => Some((endpoint, key)),
            _ => None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Recognition service settings
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Annotated-image settings
    #[serde(default)]
    pub annotation: AnnotationConfig,

    /// Language detection collaborator
    #[serde(default)]
    pub detection: ServiceConfig,

    /// Translation collaborator
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Correction collaborator
    #[serde(default)]
    pub correction: ServiceConfig,
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default search path
    ///
    /// Search order:
    /// 1. `./journal-scan.toml`
    /// 2. `~/.config/journal-scan/config.toml`
    /// 3. Default values (if no file found)
    pub fn load() -> Result<Self, ConfigError> {
        // Try current directory first
        let current_dir_config = PathBuf::from("journal-scan.toml");
        if current_dir_config.exists() {
            return Self::load_from_path(&current_dir_config);
        }

        // Try user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("journal-scan").join("config.toml");
            if user_config.exists() {
                return Self::load_from_path(&user_config);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject configurations that cannot reach the recognition service
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recognition.endpoint.is_none() || self.recognition.key.is_none() {
            return Err(ConfigError::MissingRecognitionService);
        }
        Ok(())
    }

    /// Convert to ProcessOptions
    pub fn to_process_options(&self) -> ProcessOptions {
        let mut options = ProcessOptions::default();

        if let Some(gutter) = self.general.gutter_width {
            options = options.with_gutter_width(gutter);
        }
        if let Some(save) = self.general.save_images {
            options = options.with_save_images(save);
        }
        if let Some(verbose) = self.general.verbose {
            options = options.with_verbose(verbose);
        }
        if let Some(correct) = self.general.correct_translations {
            options = options.with_correct_translations(correct);
        }
        if let Some(mode) = self.recognition.mode {
            options = options.with_mode(mode);
        }
        if let Some(timeout) = self.recognition.timeout_secs {
            options = options.with_timeout_secs(timeout);
        }
        if let Some(quality) = self.annotation.quality {
            options = options.with_jpeg_quality(quality);
        }
        if let Some(target) = &self.translation.target_lang {
            options.target_lang = target.clone();
        }

        options
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> ProcessOptions {
        let mut options = self.to_process_options();

        // CLI overrides take precedence
        if let Some(gutter) = cli.gutter_width {
            options = options.with_gutter_width(gutter);
        }
        if let Some(save) = cli.save_images {
            options = options.with_save_images(save);
        }
        if let Some(verbose) = cli.verbose {
            options = options.with_verbose(verbose);
        }
        if let Some(correct) = cli.correct_translations {
            options = options.with_correct_translations(correct);
        }
        if let Some(mode) = cli.mode {
            options = options.with_mode(mode);
        }
        if let Some(quality) = cli.quality {
            options = options.with_jpeg_quality(quality);
        }

        options
    }

    /// Get config file search paths
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("journal-scan.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("journal-scan").join("config.toml"));
        }

        paths
    }
}

/// CLI override values for merging with config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub gutter_width: Option<u32>,
    pub save_images: Option<bool>,
    pub verbose: Option<bool>,
    pub correct_translations: Option<bool>,
    pub mode: Option<RecognitionMode>,
    pub quality: Option<u8>,
}

impl CliOverrides {
    /// Create new empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Set gutter width override
    pub fn with_gutter_width(mut self, gutter: u32) -> Self {
        self.gutter_width = Some(gutter);
        self
    }

    /// Set annotated-image output override
    pub fn with_save_images(mut self, save: bool) -> Self {
        self.save_images = Some(save);
        self
    }

    /// Set verbosity override
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Set translation correction override
    pub fn with_correct_translations(mut self, correct: bool) -> Self {
        self.correct_translations = Some(correct);
        self
    }

    /// Set recognition mode override
    pub fn with_mode(mut self, mode: RecognitionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set JPEG quality override
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.general.gutter_width, None);
        assert_eq!(config.recognition.endpoint, None);
        assert_eq!(config.recognition.mode, None);
        assert_eq!(config.annotation.quality, None);
        assert_eq!(config.translation.target_lang, None);
    }

    #[test]
    fn test_config_load_from_path_existing() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[general]
gutter_width = 8

[recognition]
endpoint = "https://example.invalid/analyze"
key = "abc"
mode = "text"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.general.gutter_width, Some(8));
        assert_eq!(
            config.recognition.endpoint.as_deref(),
            Some("https://example.invalid/analyze")
        );
        assert_eq!(config.recognition.mode, Some(RecognitionMode::Text));
    }

    #[test]
    fn test_config_load_from_path_not_found() {
        let result = Config::load_from_path(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_search_paths() {
        let paths = Config::search_paths();
        assert!(!paths.is_empty());
        assert_eq!(paths[0], PathBuf::from("journal-scan.toml"));
    }

    #[test]
    fn test_validate_requires_endpoint_and_key() {
        let mut config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRecognitionService)
        ));

        config.recognition.endpoint = Some("https://example.invalid".to_string());
        assert!(config.validate().is_err());

        config.recognition.key = Some("abc".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_error_message() {
        let err = ConfigError::MissingRecognitionService;
        assert_eq!(
            err.to_string(),
            "Missing one of the recognition service settings (endpoint, key)."
        );
    }

    #[test]
    fn test_config_to_process_options() {
        let config = Config {
            general: GeneralConfig {
                gutter_width: Some(10),
                save_images: Some(true),
                verbose: Some(true),
                correct_translations: Some(true),
            },
            recognition: RecognitionConfig {
                mode: Some(RecognitionMode::Text),
                timeout_secs: Some(60),
                ..Default::default()
            },
            annotation: AnnotationConfig {
                quality: Some(80),
                ..Default::default()
            },
            translation: TranslationConfig {
                target_lang: Some("fr".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let options = config.to_process_options();
        assert_eq!(options.gutter_width, 10);
        assert!(options.save_images);
        assert!(options.verbose);
        assert!(options.correct_translations);
        assert_eq!(options.mode, RecognitionMode::Text);
        assert_eq!(options.timeout_secs, 60);
        assert_eq!(options.jpeg_quality, 80);
        assert_eq!(options.target_lang, "fr");
    }

    #[test]
    fn test_config_merge_cli_priority() {
        let config = Config {
            general: GeneralConfig {
                gutter_width: Some(4),
                verbose: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };

        let cli = CliOverrides::new().with_gutter_width(16).with_verbose(true);

        let options = config.merge_with_cli(&cli);
        assert_eq!(options.gutter_width, 16); // CLI wins
        assert!(options.verbose); // CLI wins
    }

    #[test]
    fn test_config_merge_empty_cli() {
        let config = Config {
            general: GeneralConfig {
                gutter_width: Some(4),
                ..Default::default()
            },
            ..Default::default()
        };

        let cli = CliOverrides::new();
        let options = config.merge_with_cli(&cli);
        assert_eq!(options.gutter_width, 4); // Config value preserved
    }

    #[test]
    fn test_config_merge_partial_cli() {
        let config = Config {
            general: GeneralConfig {
                gutter_width: Some(4),
                verbose: Some(true),
                ..Default::default()
            },
            recognition: RecognitionConfig {
                mode: Some(RecognitionMode::Text),
                ..Default::default()
            },
            ..Default::default()
        };

        let cli = CliOverrides::new().with_quality(90);
        let options = config.merge_with_cli(&cli);
        assert_eq!(options.jpeg_quality, 90); // CLI wins
        assert_eq!(options.gutter_width, 4); // Config preserved
        assert!(options.verbose); // Config preserved
        assert_eq!(options.mode, RecognitionMode::Text); // Config preserved
    }

    #[test]
    fn test_config_toml_parse_complete() {
        let toml = r#"
[general]
gutter_width = 12
save_images = true
verbose = true
correct_translations = true

[recognition]
endpoint = "https://example.invalid/analyze"
key = "abc"
mode = "tags"
timeout_secs = 45

[annotation]
quality = 75
font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"

[detection]
endpoint = "https://example.invalid/detect"
key = "def"

[translation]
endpoint = "https://example.invalid/translate"
key = "ghi"
target_lang = "en"

[correction]
endpoint = "https://example.invalid/correct"
key = "jkl"
"#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.general.gutter_width, Some(12));
        assert_eq!(config.general.correct_translations, Some(true));
        assert_eq!(config.recognition.mode, Some(RecognitionMode::Tags));
        assert_eq!(config.recognition.timeout_secs, Some(45));
        assert_eq!(config.annotation.quality, Some(75));
        assert!(config.annotation.font_path.is_some());
        assert!(config.detection.credentials().is_some());
        assert_eq!(config.translation.target_lang, Some("en".to_string()));
        assert!(config.correction.credentials().is_some());
    }

    #[test]
    fn test_config_toml_parse_partial() {
        let toml = r#"
[recognition]
endpoint = "https://example.invalid/analyze"
key = "abc"
"#;

        let config = Config::from_toml(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.gutter_width, None);
        assert_eq!(config.recognition.mode, None);
        assert!(config.detection.credentials().is_none());
    }

    #[test]
    fn test_config_toml_parse_empty() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_toml_parse_invalid() {
        let result = Config::from_toml("this is not valid toml [[[");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_config_toml_parse_invalid_mode() {
        let result = Config::from_toml(
            r#"
[recognition]
mode = "everything"
"#,
        );
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config {
            general: GeneralConfig {
                gutter_width: Some(12),
                ..Default::default()
            },
            ..Default::default()
        };

        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("gutter_width = 12"));
    }

    #[test]
    fn test_service_credentials_require_both() {
        let mut service = ServiceConfig::default();
        assert!(service.credentials().is_none());

        service.endpoint = Some("https://example.invalid".to_string());
        assert!(service.credentials().is_none());

        service.key = Some("abc".to_string());
        assert_eq!(
            service.credentials(),
            Some(("https://example.invalid", "abc"))
        );
    }

    #[test]
    fn test_cli_overrides_builder() {
        let overrides = CliOverrides::new()
            .with_gutter_width(20)
            .with_save_images(true)
            .with_verbose(true)
            .with_correct_translations(false)
            .with_mode(RecognitionMode::Text)
            .with_quality(85);

        assert_eq!(overrides.gutter_width, Some(20));
        assert_eq!(overrides.save_images, Some(true));
        assert_eq!(overrides.verbose, Some(true));
        assert_eq!(overrides.correct_translations, Some(false));
        assert_eq!(overrides.mode, Some(RecognitionMode::Text));
        assert_eq!(overrides.quality, Some(85));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/test/path"));
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config, Config::default());
    }
}
