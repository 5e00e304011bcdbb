//! TOML configuration for the probe harness.
//!
//! A layered model with sensible defaults, environment variable override for
//! the config file path, and a conventional local file location. Everything
//! is optional; a missing config file means pure defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Root configuration for one harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Base URL of the backend under probe.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Env file inspected for credential presence (and by `debug-llm`).
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    /// Variables that must be configured with non-empty values.
    #[serde(default = "default_required_env_vars")]
    pub required_env_vars: Vec<String>,

    /// Error-message substrings that are expected in this environment;
    /// a 500 carrying one of these is recorded as success with a note.
    #[serde(default = "default_expected_errors")]
    pub expected_errors: Vec<String>,

    /// Statuses accepted as "handled" for malformed-input probes. 200 is
    /// only accepted when the body shows a graceful fallback.
    #[serde(default = "default_handled_statuses")]
    pub handled_statuses: Vec<u16>,

    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Per-endpoint timeout tiers, in seconds. Reads are quick; generation
/// endpoints get the long tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_quick")]
    pub quick_secs: u64,
    #[serde(default = "default_read")]
    pub read_secs: u64,
    #[serde(default = "default_agent")]
    pub agent_secs: u64,
    #[serde(default = "default_generate")]
    pub generate_secs: u64,
}

fn default_base_url() -> String {
    std::env::var("NEXT_PUBLIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

fn default_env_file() -> PathBuf {
    PathBuf::from("/app/.env")
}

fn default_required_env_vars() -> Vec<String> {
    vec![
        "GROQ_API_KEY".to_string(),
        "PRODUCTHUNT_DEVELOPER_TOKEN".to_string(),
        "NEXT_PUBLIC_FIREBASE_PROJECT_ID".to_string(),
    ]
}

fn default_expected_errors() -> Vec<String> {
    vec![
        "PERMISSION_DENIED".to_string(),
        "Invalid Groq API key configuration".to_string(),
    ]
}

fn default_handled_statuses() -> Vec<u16> {
    vec![200, 400, 500]
}

fn default_quick() -> u64 {
    10
}
fn default_read() -> u64 {
    30
}
fn default_agent() -> u64 {
    45
}
fn default_generate() -> u64 {
    60
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            quick_secs: default_quick(),
            read_secs: default_read(),
            agent_secs: default_agent(),
            generate_secs: default_generate(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            env_file: default_env_file(),
            required_env_vars: default_required_env_vars(),
            expected_errors: default_expected_errors(),
            handled_statuses: default_handled_statuses(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Timeouts {
    pub fn quick(&self) -> Duration {
        Duration::from_secs(self.quick_secs)
    }
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }
    pub fn agent(&self) -> Duration {
        Duration::from_secs(self.agent_secs)
    }
    pub fn generate(&self) -> Duration {
        Duration::from_secs(self.generate_secs)
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded harness configuration");
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. The path named by the `APIPARAMEDIC_CONFIG` environment variable.
    /// 2. `./apiparamedic.toml`.
    /// Falling back to defaults when neither exists. A file that exists but
    /// does not parse is fatal.
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var("APIPARAMEDIC_CONFIG") {
            return Self::load(Path::new(&path));
        }
        let local = Path::new("apiparamedic.toml");
        if local.exists() {
            return Self::load(local);
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// True when `status` is in the handled set for malformed input.
    pub fn is_handled_status(&self, status: u16) -> bool {
        self.handled_statuses.contains(&status)
    }
}
