//! TOML settings for the `sitecfg` tool.
//!
//! The settings describe *where* the configuration lives, not the
//! configuration itself:
//! - Windows:  `%APPDATA%\SiteCfg\settings.toml`
//! - Linux:    `~/.config/sitecfg/settings.toml`
//! - macOS:    `~/Library/Application Support/SiteCfg/settings.toml`
//!
//! ```toml
//! log_level = "info"
//!
//! [site]
//! base_url = "http://localhost:8080/"
//! config_file = "site-config.json"
//!
//! [storage]
//! storage_key = "perfeitaLuzConfig"
//! quota_bytes = 5242880
//! database_name = "perfeitaLuzConfigDb"
//! store_name = "config"
//!
//! [publish]
//! target = "/srv/site/site-config.json"
//! confirm = true
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section or
//! a settings file from an older version all load.  Without `[publish]
//! target` the tool has no file-write capability and saves stay local.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::infrastructure::storage::kv::DEFAULT_QUOTA_BYTES;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid site location `{value}`: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

// ── Settings schema ───────────────────────────────────────────────────────────

/// Top-level settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub publish: PublishSettings,
}

/// Where the published configuration is read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteSettings {
    /// Base location of the site: `http(s)://…/` or `file:///…/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// File name of the published configuration, relative to `base_url`.
    #[serde(default = "default_config_file")]
    pub config_file: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Local tiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    /// Directory for the key/value file and the database.  Defaults to
    /// `<settings dir>/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Key of the data record; the meta record uses `<storage_key>Meta`.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: usize,
    #[serde(default = "default_database_name")]
    pub database_name: String,
    #[serde(default = "default_store_name")]
    pub store_name: String,
}

/// File-write capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishSettings {
    /// Path of the published `site-config.json`.  Unset means saves never
    /// touch the published file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    /// Ask before the first write of a session.
    #[serde(default = "default_true")]
    pub confirm: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}
fn default_config_file() -> String {
    "site-config.json".to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_storage_key() -> String {
    "perfeitaLuzConfig".to_string()
}
fn default_quota_bytes() -> usize {
    DEFAULT_QUOTA_BYTES
}
fn default_database_name() -> String {
    "perfeitaLuzConfigDb".to_string()
}
fn default_store_name() -> String {
    "config".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            site: SiteSettings::default(),
            storage: StorageSettings::default(),
            publish: PublishSettings::default(),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            config_file: default_config_file(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: default_storage_key(),
            quota_bytes: default_quota_bytes(),
            database_name: default_database_name(),
            store_name: default_store_name(),
        }
    }
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            target: None,
            confirm: default_true(),
        }
    }
}

impl SiteSettings {
    /// Full location of the published configuration.
    ///
    /// `base_url` is treated as a directory even without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] if either part does not parse.
    pub fn config_url(&self) -> Result<Url, SettingsError> {
        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let invalid = |source: url::ParseError| SettingsError::InvalidUrl {
            value: format!("{}{}", base, self.config_file),
            source,
        };
        Url::parse(&base)
            .and_then(|url| url.join(&self.config_file))
            .map_err(invalid)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl StorageSettings {
    /// The configured data directory, or `<settings dir>/data`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NoPlatformConfigDir`] when no directory is
    /// configured and the platform directory is unknown.
    pub fn resolved_data_dir(&self) -> Result<PathBuf, SettingsError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(settings_dir()?.join("data")),
        }
    }
}

// ── Settings repository ───────────────────────────────────────────────────────

/// Platform directory holding `settings.toml`.
///
/// # Errors
///
/// Returns [`SettingsError::NoPlatformConfigDir`] when the base directory
/// cannot be determined from the environment.
pub fn settings_dir() -> Result<PathBuf, SettingsError> {
    platform_config_dir().ok_or(SettingsError::NoPlatformConfigDir)
}

/// Default path of the settings file.
pub fn settings_file_path() -> Result<PathBuf, SettingsError> {
    Ok(settings_dir()?.join("settings.toml"))
}

/// Loads settings from `path`, returning defaults if the file does not exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not
/// found", and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings_from(path: &std::path::Path) -> Result<Settings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `settings` to `path`, creating the directory if needed.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system failures or
/// [`SettingsError::Serialize`] if serialization fails.
pub fn save_settings_to(path: &std::path::Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SiteCfg"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("sitecfg"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SiteCfg")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_defaults_match_stored_layout() {
        // Arrange / Act
        let settings = Settings::default();

        // Assert
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.storage.storage_key, "perfeitaLuzConfig");
        assert_eq!(settings.storage.database_name, "perfeitaLuzConfigDb");
        assert_eq!(settings.storage.store_name, "config");
        assert_eq!(settings.storage.quota_bytes, 5 * 1024 * 1024);
        assert!(settings.publish.target.is_none());
        assert!(settings.publish.confirm);
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let settings: Settings = toml::from_str("").expect("parse");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [publish]
            target = "/srv/site/site-config.json"
            "#,
        )
        .expect("parse");
        assert_eq!(
            settings.publish.target.as_deref(),
            Some(std::path::Path::new("/srv/site/site-config.json"))
        );
        assert!(settings.publish.confirm);
        assert_eq!(settings.site, SiteSettings::default());
    }

    #[test]
    fn test_config_url_joins_file_onto_directory() {
        let site = SiteSettings {
            base_url: "file:///srv/site".into(),
            ..SiteSettings::default()
        };
        assert_eq!(
            site.config_url().expect("url").as_str(),
            "file:///srv/site/site-config.json"
        );
        assert_eq!(
            SiteSettings::default().config_url().expect("url").as_str(),
            "http://localhost:8080/site-config.json"
        );
    }

    #[test]
    fn test_config_url_rejects_garbage() {
        let site = SiteSettings {
            base_url: "not a url".into(),
            ..SiteSettings::default()
        };
        assert!(matches!(site.config_url(), Err(SettingsError::InvalidUrl { .. })));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let storage = StorageSettings {
            data_dir: Some(PathBuf::from("/var/lib/sitecfg")),
            ..StorageSettings::default()
        };
        assert_eq!(
            storage.resolved_data_dir().expect("dir"),
            PathBuf::from("/var/lib/sitecfg")
        );
    }

    #[test]
    fn test_save_then_load_round_trips() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("sitecfg_test_{}", Uuid::new_v4()));
        let path = dir.join("settings.toml");
        let mut settings = Settings::default();
        settings.site.base_url = "https://example.com/".into();
        settings.publish.target = Some(PathBuf::from("/tmp/site-config.json"));
        settings.publish.confirm = false;

        // Act
        save_settings_to(&path, &settings).expect("save");
        let restored = load_settings_from(&path).expect("load");

        // Assert
        assert_eq!(restored, settings);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir()
            .join(format!("sitecfg_test_{}", Uuid::new_v4()))
            .join("settings.toml");
        assert_eq!(load_settings_from(&path).expect("load"), Settings::default());
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let dir = std::env::temp_dir().join(format!("sitecfg_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("settings.toml");
        std::fs::write(&path, "[site\nbase_url = 1").expect("write");
        assert!(matches!(load_settings_from(&path), Err(SettingsError::Parse(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
