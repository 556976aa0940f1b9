//! Process-wide configuration.
//!
//! A [`Config`] is built once at start-up and handed by reference to every
//! component, so nothing reads paths or environment overrides on its own.

use anyhow::{anyhow, Context, Result};
use dirs::home_dir;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const MODEL_ENV: &str = "HOW_MODEL";
pub const API_BASE_ENV: &str = "HOW_API_BASE";

const CONFIG_DIR_NAME: &str = ".how-cli";
const API_KEY_FILE_NAME: &str = ".groq_api_key";
const HISTORY_FILE_NAME: &str = "history.log";
const SETTINGS_FILE_NAME: &str = "config.toml";

/// Optional overrides read from `config.toml`.
#[derive(Debug, Default, Deserialize)]
struct Settings {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_base: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    pub api_key_file: PathBuf,
    pub history_file: PathBuf,
    pub model: String,
    pub api_base: String,
    pub api_key_env: String,
}

impl Config {
    /// Load configuration rooted at `~/.how-cli`, applying `config.toml`
    /// and then environment overrides.
    pub fn load() -> Result<Self> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        let mut config = Self::with_dir(home.join(CONFIG_DIR_NAME));
        config.apply_overrides(
            std::env::var(MODEL_ENV).ok(),
            std::env::var(API_BASE_ENV).ok(),
        );
        Ok(config)
    }

    /// Builds a configuration over an arbitrary directory. Only the settings
    /// file is consulted; environment overrides are left to [`Config::load`].
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let mut config = Self {
            api_key_file: config_dir.join(API_KEY_FILE_NAME),
            history_file: config_dir.join(HISTORY_FILE_NAME),
            config_dir,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key_env: API_KEY_ENV.to_string(),
        };

        match Self::load_settings(&config.settings_path()) {
            Ok(Some(settings)) => {
                config.apply_overrides(settings.model, settings.api_base);
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring settings file: {:#}", e),
        }
        config
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE_NAME)
    }

    /// Endpoint the completion request is posted to.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    fn load_settings(path: &Path) -> Result<Option<Settings>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!("Loaded settings from: {}", path.display());
        Ok(Some(settings))
    }

    fn apply_overrides(&mut self, model: Option<String>, api_base: Option<String>) {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
        if let Some(api_base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.api_base = api_base.trim().to_string();
        }
    }
}
