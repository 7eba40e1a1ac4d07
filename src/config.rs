//! Optional configuration file.
//!
//! Looked up as `family-menu.toml` in the working directory unless a path is
//! given explicitly. Every key is optional; command-line flags win over the
//! file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "family-menu.toml";
pub const DEFAULT_FONTS_DIR: &str = "assets/fonts";
pub const DEFAULT_OUTPUT: &str = "menu.pdf";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for `.ttf` theme fonts.
    pub fonts_dir: PathBuf,
    /// Where rendered menus are written.
    pub output: PathBuf,
    /// Theme name; unset means a random theme per render.
    pub theme: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fonts_dir: PathBuf::from(DEFAULT_FONTS_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            theme: None,
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// file is used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        match fs::read_to_string(path) {
            Ok(raw) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Self::from_toml(path, &raw)
            }
            Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(Path::new("x.toml"), r#"theme = "rustic""#).unwrap();
        assert_eq!(config.theme.as_deref(), Some("rustic"));
        assert_eq!(config.fonts_dir, PathBuf::from(DEFAULT_FONTS_DIR));
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = Config::from_toml(Path::new("x.toml"), "colour = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.toml");
        fs::write(&path, "fonts_dir = \"/srv/fonts\"\noutput = \"week.pdf\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.fonts_dir, PathBuf::from("/srv/fonts"));
        assert_eq!(config.output, PathBuf::from("week.pdf"));
        assert_eq!(config.theme, None);
    }
}
