//! Configuration loaded from an optional `deep-research.toml`.
//!
//! [`ResearchConfig`] holds every tunable value. Missing fields use defaults,
//! environment variables override the file, and command-line flags are
//! applied last by the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ResearchError;
use crate::gemini::client::API_BASE;

pub const CONFIG_FILE: &str = "deep-research.toml";

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const OUTPUT_DIR_ENV: &str = "GEMINI_DEEP_RESEARCH_OUTPUT_DIR";
pub const DRIVE_FOLDER_ENV: &str = "GEMINI_DEEP_RESEARCH_DRIVE_FOLDER_ID";

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchConfig {
    /// Gemini API key.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the Gemini API, without the `/interactions` suffix.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Agent that runs the research.
    #[serde(default = "default_agent")]
    pub agent: String,

    /// Seconds between status polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Where the report and raw payload are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Drive folder that artifacts are mirrored to.
    #[serde(default)]
    pub drive_folder_id: Option<String>,

    /// Upper bound on a single upload subprocess.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

fn default_api_base() -> String {
    API_BASE.to_string()
}

fn default_agent() -> String {
    "deep-research-pro-preview-12-2025".to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("deep-research")
}

fn default_upload_timeout_secs() -> u64 {
    120
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            agent: default_agent(),
            poll_interval_secs: default_poll_interval_secs(),
            output_dir: default_output_dir(),
            drive_folder_id: None,
            upload_timeout_secs: default_upload_timeout_secs(),
        }
    }
}

impl ResearchConfig {
    /// Load `deep-research.toml` from the current directory and apply the
    /// process environment on top.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE), |name| std::env::var(name).ok())
    }

    pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<ResearchConfig>(&contents)
                .map_err(ResearchError::from)
                .with_context(|| format!("invalid config in {}", path.display()))?
        } else {
            Self::default()
        };
        Ok(config.with_env(env))
    }

    /// Overlay environment values. Empty variables are ignored.
    pub fn with_env(mut self, env: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = key;
        }
        if let Some(dir) = lookup(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(folder) = lookup(DRIVE_FOLDER_ENV) {
            self.drive_folder_id = Some(folder);
        }
        self
    }

    /// The credential to use: an explicit override beats the environment
    /// and file. Missing entirely is a configuration error.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Result<String, ResearchError> {
        explicit
            .filter(|k| !k.trim().is_empty())
            .map(str::to_string)
            .or_else(|| Some(self.api_key.clone()).filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                ResearchError::Configuration(format!(
                    "no API key provided; pass --api-key or set {API_KEY_ENV}"
                ))
            })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}
