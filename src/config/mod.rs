use crate::models::ScanSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs;

/// Settings file name inside the configuration directory.
pub const SETTINGS_FILE: &str = "ueindex.yaml";

/// Prefix of environment variables overriding settings, e.g.
/// `UEINDEX_MAX_SOURCE_FILE_BYTES=1048576` or `UEINDEX_SOURCE_EXTENSIONS=h,hpp`.
pub const ENV_PREFIX: &str = "UEINDEX";

/// Configuration manager for loading and saving scanner settings.
///
/// Settings are layered: built-in defaults, then `ueindex.yaml` in the
/// configuration directory, then `UEINDEX_*` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE),
            config_dir,
        })
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    /// Load settings from the file and the process environment.
    pub fn load_settings(&self) -> Result<ScanSettings> {
        self.load_layered(None)
    }

    /// Load settings from the file and an explicit set of environment
    /// variables instead of the process environment.
    pub fn load_settings_with_env(&self, env: HashMap<String, String>) -> Result<ScanSettings> {
        self.load_layered(Some(env))
    }

    fn load_layered(&self, env: Option<HashMap<String, String>>) -> Result<ScanSettings> {
        if !self.settings_path.exists() {
            tracing::warn!("Settings file not found at {}, using defaults", self.settings_path);
        }

        let layered = config::Config::builder()
            .add_source(config::File::new(self.settings_path.as_str(), config::FileFormat::Yaml).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("source_extensions")
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to load settings: {}", self.settings_path))?;

        let settings: ScanSettings = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.config_dir);
        Ok(settings)
    }

    /// Save settings to `ueindex.yaml`.
    pub fn save_settings(&self, settings: &ScanSettings) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }
}
