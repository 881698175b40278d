//! Parser configuration: option marker, help triggers and banner text.
//!
//! Configuration can be built in code or loaded from a YAML or JSON file.
//!
//! # Example YAML
//!
//! ```yaml
//! option_char: "/"
//! help_options:
//!   - "?"
//!   - help
//! program:
//!   title: Club Manager
//!   version: "1.2.0"
//!   executable: club
//!   description: Maintains the member list of a club.
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default option marker.
pub const DEFAULT_OPTION_CHAR: char = '-';

/// Default help trigger names (used after the option marker).
pub const DEFAULT_HELP_OPTIONS: &[&str] = &["?", "h", "help"];

/// Banner information shown at the top of help text.
///
/// Supplied by the caller; the parser never inspects the running binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramInfo {
    /// Program title, first word of the banner.
    pub title: String,
    /// Program version, shown after the title.
    pub version: String,
    /// Executable name used in SYNTAX lines.
    pub executable: String,
    /// Optional DESCRIPTION paragraph.
    pub description: Option<String>,
}

impl Default for ProgramInfo {
    fn default() -> Self {
        Self {
            title: "<no title>".to_string(),
            version: "<no version>".to_string(),
            executable: "<no executable>".to_string(),
            description: None,
        }
    }
}

impl ProgramInfo {
    pub fn new(title: &str, version: &str, executable: &str) -> Self {
        Self {
            title: title.to_string(),
            version: version.to_string(),
            executable: executable.to_string(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Settings shared by every parse of a [`Parser`](crate::Parser).
///
/// # Examples
///
/// ```
/// use command_options_core::ParserConfig;
///
/// let config = ParserConfig::default();
/// assert_eq!(config.option_char, '-');
/// assert!(config.is_help("-?"));
/// assert!(config.is_help("-help"));
/// assert!(!config.is_help("help"));
/// assert!(!config.is_help("-name"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Character that starts a named option.
    pub option_char: char,
    /// Option names that request help. Checked before declared options.
    pub help_options: Vec<String>,
    /// Banner information for help text.
    pub program: ProgramInfo,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            option_char: DEFAULT_OPTION_CHAR,
            help_options: DEFAULT_HELP_OPTIONS.iter().map(|s| s.to_string()).collect(),
            program: ProgramInfo::default(),
        }
    }
}

impl ParserConfig {
    /// Loads configuration from a `.yml`, `.yaml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`]/[`ConfigError::Json`] if parsing fails,
    /// [`ConfigError::UnsupportedFormat`] for other extensions and
    /// [`ConfigError::Invalid`] if the settings fail [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let reader = || -> Result<BufReader<std::fs::File>> {
            Ok(BufReader::new(std::fs::File::open(path)?))
        };
        let config: Self = match extension.as_str() {
            "yml" | "yaml" => serde_yaml::from_reader(reader()?)?,
            "json" => serde_json::from_reader(reader()?)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses YAML configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Invalid`].
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses JSON configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] or [`ConfigError::Invalid`].
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written, or
    /// [`ConfigError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Rejects settings the tokenizer cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a whitespace or `,` option marker
    /// and for empty help trigger names.
    pub fn validate(&self) -> Result<()> {
        if self.option_char.is_whitespace() || self.option_char == crate::coerce::COLLECTION_SEPARATOR {
            return Err(ConfigError::Invalid(format!(
                "option_char cannot be {:?}",
                self.option_char
            )));
        }
        if self.help_options.iter().any(|h| h.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "help_options cannot contain empty names".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns `true` if `arg` is the option marker followed by a help
    /// trigger name.
    pub fn is_help(&self, arg: &str) -> bool {
        arg.strip_prefix(self.option_char)
            .is_some_and(|name| self.help_options.iter().any(|h| h == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_fills_missing_fields_with_defaults() {
        let config = ParserConfig::from_yaml_str("option_char: \"/\"\n").unwrap();
        assert_eq!(config.option_char, '/');
        assert_eq!(config.help_options, vec!["?", "h", "help"]);
        assert_eq!(config.program, ProgramInfo::default());
        assert!(config.is_help("/h"));
        assert!(!config.is_help("-h"));
    }

    #[test]
    fn test_json_config() {
        let config = ParserConfig::from_json_str(
            r#"{"help_options": ["aide"], "program": {"title": "Club", "version": "1.0"}}"#,
        )
        .unwrap();
        assert!(config.is_help("-aide"));
        assert!(!config.is_help("-?"));
        assert_eq!(config.program.title, "Club");
        assert_eq!(config.program.executable, "<no executable>");
    }

    #[test]
    fn test_validate_rejects_bad_marker_and_empty_trigger() {
        let err = ParserConfig::from_yaml_str("option_char: \" \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ParserConfig::from_yaml_str("help_options: [\"\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parser.yml");

        let mut config = ParserConfig {
            option_char: '/',
            ..ParserConfig::default()
        };
        config.program = ProgramInfo::new("Club", "2.0", "club").with_description("Members");
        config.save(&path).unwrap();

        let loaded = ParserConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parser.toml");
        std::fs::write(&path, "option_char = '/'").unwrap();

        let err = ParserConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
