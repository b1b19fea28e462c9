//! Configuration loading for Veritas.
//! Reads veritas.toml from the current directory or the path in VERITAS_CONFIG.

use std::path::Path;

use serde::{Deserialize, Serialize};
use veritas_llm::GeminiSettings;
use veritas_zeroshot::ZeroShotConfig;

pub const CONFIG_ENV: &str = "VERITAS_CONFIG";
pub const BIND_ENV: &str = "VERITAS_BIND";
pub const DEFAULT_CONFIG_PATH: &str = "veritas.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Zero-shot NLI model.
    #[serde(default)]
    pub local: ZeroShotConfig,
    /// Gemini settings. The API key is never configured here; callers
    /// send their own with each request.
    #[serde(default)]
    pub remote: GeminiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String { "127.0.0.1:5000".to_string() }

impl Config {
    /// Load config from file, then apply environment overrides.
    /// A missing file is not an error; defaults are used.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_path(&path)?
        } else {
            tracing::warn!("Config file not found: {}, using defaults", path);
            Self::default()
        };
        config.apply_bind_override(std::env::var(BIND_ENV).ok());
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_bind_override(&mut self, bind: Option<String>) {
        if let Some(bind) = bind.filter(|b| !b.trim().is_empty()) {
            self.server.bind = bind;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !self.local.hypothesis_template.contains("{}") {
            anyhow::bail!(
                "local.hypothesis_template must contain {{}}: {:?}",
                self.local.hypothesis_template
            );
        }
        if self.local.max_length == 0 {
            anyhow::bail!("local.max_length must be positive");
        }
        if self.remote.timeout_secs == 0 {
            anyhow::bail!("remote.timeout_secs must be positive");
        }
        Ok(())
    }
}
