use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = ".config/w9x.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub address: AddressConfig,
}

/// `[analysis]`: the managed document-analysis service.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_analysis_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_analysis_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_model_id() -> String {
    "prebuilt-document".to_string()
}

fn default_api_version() -> String {
    "2023-07-31".to_string()
}

fn default_analysis_key_env() -> String {
    "AZURE_API_KEY".to_string()
}

fn default_analysis_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    1000
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            model_id: default_model_id(),
            api_version: default_api_version(),
            api_key_env: default_analysis_key_env(),
            timeout_secs: default_analysis_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// How the combined "City, state, and ZIP code" field gets split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressBackend {
    /// Local decomposition against the static state-name table.
    #[default]
    Table,
    /// Ask a chat-completions endpoint.
    Llm,
}

/// `[address]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressConfig {
    #[serde(default)]
    pub backend: AddressBackend,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// `[address.llm]`
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Blank means the endpoint needs no Authorization header (e.g. Ollama).
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_llm_model() -> String {
    "qwen3:8b".to_string()
}

fn default_llm_key_env() -> String {
    "LLM_API_KEY".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_llm_key_env(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Config {
    /// Load the TOML config at `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Read a secret from the environment variable named by the config.
pub fn secret_from_env(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| Error::MissingEnv(var.to_string()))
}
