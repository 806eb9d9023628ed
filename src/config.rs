//! Configuration for promptsmith.
//!
//! Settings are layered: built-in defaults, then `promptsmith.toml`, then
//! environment variables, then CLI flags. A `.env` file is honored via
//! `dotenvy` before the environment layer is read.
//!
//! # Configuration File Format
//!
//! ```toml
//! [service]
//! url = "http://localhost:8000"
//! timeout_secs = 120
//!
//! [interview]
//! questions = 20
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the service base URL.
pub const ENV_API_URL: &str = "PROMPTSMITH_API_URL";
/// Environment variable overriding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "PROMPTSMITH_TIMEOUT_SECS";

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "promptsmith.toml";

fn default_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_questions() -> usize {
    crate::session::DEFAULT_TOTAL_QUESTIONS
}

/// Remote service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the generation/persistence service.
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-request timeout. Generation calls are slow; keep this generous.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Interview defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    /// Default number of questions for a new interview.
    #[serde(default = "default_questions")]
    pub questions: usize,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            questions: default_questions(),
        }
    }
}

/// Unified configuration, after all layers are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub interview: InterviewConfig,
}

impl Config {
    /// Load configuration from `dir/promptsmith.toml` (when present) and
    /// apply environment overrides on top. CLI flags are applied by the
    /// caller, which sees them last.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_API_URL)
            && !url.trim().is_empty()
        {
            self.service.url = url;
        }
        if let Ok(value) = std::env::var(ENV_TIMEOUT_SECS)
            && let Ok(secs) = value.trim().parse::<u64>()
        {
            self.service.timeout_secs = secs;
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.service.timeout_secs)
    }

    /// The annotated default config, written by `config init`.
    pub fn default_file_contents() -> String {
        format!(
            "# promptsmith configuration\n\n\
             [service]\n\
             # Base URL of the generation/persistence service\n\
             url = \"{}\"\n\
             # Per-request timeout in seconds\n\
             timeout_secs = {}\n\n\
             [interview]\n\
             # Default number of questions for a new interview\n\
             questions = {}\n",
            default_url(),
            default_timeout_secs(),
            default_questions()
        )
    }

    /// Write the default config file into `dir`, failing if one exists.
    pub fn init_file(dir: &Path) -> Result<std::path::PathBuf> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }
        std::fs::write(&path, Self::default_file_contents())
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }
}
