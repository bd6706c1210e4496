// src/config.rs
// =============================================================================
// Settings for one run, merged from two places:
//
// 1. .mdx-link-guardian.toml in the docs directory (optional)
// 2. command-line flags / environment variables (always win)
//
// A missing config file is fine. A config file that exists but can't be
// parsed is an error: we never silently ignore settings the user wrote down.
//
// Example .mdx-link-guardian.toml:
//
//   ignore = "https://localhost*"
//   catalog_url = "http://localhost:6006"
//   timeout_secs = 20
//   method = "get"
//   index_file = "index.md"
//   extra_extensions = ["txt"]
// =============================================================================

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::checker::{ProbeMethod, DEFAULT_TIMEOUT_SECS};
use crate::cli::Settings;
use crate::error::{Error, Result};
use crate::extract::{ExtractOptions, DEFAULT_INDEX_FILE};

pub const CONFIG_FILE: &str = ".mdx-link-guardian.toml";

/// Raw contents of the config file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub ignore: Option<String>,
    pub catalog_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub method: Option<ProbeMethod>,
    pub index_file: Option<String>,
    pub extra_extensions: Vec<String>,
}

impl FileConfig {
    /// Loads `CONFIG_FILE` from `root`, or defaults when there is none.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(Error::Io { path, source }),
        };

        toml::from_str(&content).map_err(|source| Error::Config { path, source })
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ignore: Option<String>,
    pub catalog_url: Option<String>,
    pub timeout: Duration,
    pub method: ProbeMethod,
    pub extract: ExtractOptions,
}

impl Config {
    pub fn load(root: &Path, settings: &Settings) -> Result<Self> {
        Ok(Self::merge(FileConfig::load(root)?, settings))
    }

    pub fn merge(file: FileConfig, settings: &Settings) -> Self {
        let extra_extensions = if settings.extra_extensions.is_empty() {
            file.extra_extensions
        } else {
            settings.extra_extensions.clone()
        };

        Self {
            ignore: settings.ignore.clone().or(file.ignore),
            catalog_url: settings.catalog_url.clone().or(file.catalog_url),
            timeout: Duration::from_secs(settings.timeout.or(file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS)),
            method: settings.method.or(file.method).unwrap_or_default(),
            extract: ExtractOptions {
                index_file: settings
                    .index_file
                    .clone()
                    .or(file.index_file)
                    .unwrap_or_else(|| DEFAULT_INDEX_FILE.to_string()),
                // ".TXT" and "txt" mean the same thing
                extra_extensions: extra_extensions
                    .iter()
                    .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path(), &Settings::default()).unwrap();

        assert_eq!(config.ignore, None);
        assert_eq!(config.catalog_url, None);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.method, ProbeMethod::Head);
        assert_eq!(config.extract, ExtractOptions::default());
    }

    #[test]
    fn test_file_values_are_used() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "ignore = \"https://localhost*\"\ntimeout_secs = 3\nmethod = \"get\"\nextra_extensions = [\".TXT\"]\n",
        )
        .unwrap();

        let config = Config::load(dir.path(), &Settings::default()).unwrap();
        assert_eq!(config.ignore.as_deref(), Some("https://localhost*"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.method, ProbeMethod::Get);
        assert_eq!(config.extract.extra_extensions, vec!["txt"]);
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            ignore: Some("from-file".to_string()),
            catalog_url: Some("http://file:6006".to_string()),
            index_file: Some("index.md".to_string()),
            ..FileConfig::default()
        };
        let settings = Settings {
            ignore: Some("from-flag".to_string()),
            ..Settings::default()
        };

        let config = Config::merge(file, &settings);
        assert_eq!(config.ignore.as_deref(), Some("from-flag"));
        assert_eq!(config.catalog_url.as_deref(), Some("http://file:6006"));
        assert_eq!(config.extract.index_file, "index.md");
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "timeout_secs = \"soon\"\n").unwrap();

        let result = Config::load(dir.path(), &Settings::default());
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
