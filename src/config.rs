//! Runtime configuration.
//!
//! Settings are layered with the `config` crate:
//!
//! 1. built-in defaults
//! 2. a TOML file (`reelwatch.toml` unless `--config` names another)
//! 3. environment variables prefixed `REELWATCH_`, nested with `__`
//!    (e.g. `REELWATCH_API__KEY`)
//! 4. command-line overrides
//!
//! ```toml
//! [api]
//! key = "your-tmdb-api-key"
//! language = "en-US"
//!
//! [ui]
//! transition_ms = 600
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Config file read when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "reelwatch.toml";

/// All runtime settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub images: ImageSettings,
    pub ui: UiSettings,
}

/// Catalog API connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the v3 API.
    pub base_url: String,
    /// Static API key sent as the `api_key` query parameter.
    pub key: String,
    /// Optional `language` query parameter (e.g. `en-US`).
    pub language: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            key: String::new(),
            language: None,
            timeout_secs: 10,
        }
    }
}

/// Image CDN settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub base_url: String,
    /// URL used when an item has no image.
    pub placeholder: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            base_url: "https://image.tmdb.org/t/p".to_string(),
            placeholder: "https://image.tmdb.org/t/p/original/placeholder.png".to_string(),
        }
    }
}

/// Terminal UI settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Duration of a carousel page slide in milliseconds.
    pub transition_ms: u64,
    /// Event poll / redraw interval in milliseconds.
    pub tick_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            transition_ms: 1000,
            tick_ms: 50,
        }
    }
}

impl UiSettings {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Values given on the command line that take precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
}

impl Settings {
    /// Load settings from defaults, a config file, the environment and overrides.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        Config::builder()
            .add_source(File::from(file.as_path()).required(required))
            .add_source(
                Environment::with_prefix("REELWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.key", overrides.api_key.clone())?
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "https://api.themoviedb.org/3");
        assert!(settings.api.key.is_empty());
        assert_eq!(settings.ui.transition(), Duration::from_secs(1));
        assert_eq!(settings.images.base_url, "https://image.tmdb.org/t/p");
    }

    #[test]
    fn test_load_from_file_keeps_unset_defaults() {
        let file = toml_file(
            r#"
            [api]
            key = "abc123"
            language = "de-DE"

            [ui]
            transition_ms = 250
            "#,
        );

        let settings = Settings::load(Some(file.path()), &Overrides::default()).unwrap();
        assert_eq!(settings.api.key, "abc123");
        assert_eq!(settings.api.language.as_deref(), Some("de-DE"));
        assert_eq!(settings.api.timeout_secs, 10);
        assert_eq!(settings.ui.transition_ms, 250);
        assert_eq!(settings.ui.tick_ms, 50);
    }

    #[test]
    fn test_override_wins_over_file() {
        let file = toml_file("[api]\nkey = \"from-file\"\n");
        let overrides = Overrides {
            api_key: Some("from-cli".to_string()),
        };

        let settings = Settings::load(Some(file.path()), &overrides).unwrap();
        assert_eq!(settings.api.key, "from-cli");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::load(
            Some(Path::new("/nonexistent/reelwatch.toml")),
            &Overrides::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let ui = UiSettings {
            transition_ms: 0,
            tick_ms: 0,
        };
        assert_eq!(ui.tick(), Duration::from_millis(1));
        assert_eq!(ui.transition(), Duration::ZERO);
    }
}
