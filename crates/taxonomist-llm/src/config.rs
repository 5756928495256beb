//! Configuration for selecting and tuning the classifier backend

use serde::{Deserialize, Serialize};

/// Which backend answers classification prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Hugging Face Inference API or a text-generation-inference server
    #[default]
    #[serde(alias = "hf")]
    HuggingFace,
    /// Local Ollama server
    Ollama,
    /// Fixed canned response
    Mock,
}

/// Classifier backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backend kind
    pub provider: ProviderKind,

    /// Base URL of the backend
    pub endpoint: String,

    /// Model identifier passed to the backend
    pub model: String,

    /// Upper bound on generated tokens per chunk
    pub max_new_tokens: u32,

    /// Per-request timeout in seconds, for both HTTP backends
    pub timeout_secs: u64,

    /// Transport retries (Ollama only)
    pub max_retries: u32,

    /// Name of the environment variable holding the API token
    pub api_token_env: Option<String>,

    /// Response returned by the mock backend
    pub mock_response: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::HuggingFace,
            endpoint: crate::huggingface::DEFAULT_ENDPOINT.to_string(),
            model: crate::huggingface::DEFAULT_MODEL.to_string(),
            max_new_tokens: crate::huggingface::DEFAULT_MAX_NEW_TOKENS,
            timeout_secs: crate::huggingface::DEFAULT_TIMEOUT_SECS,
            max_retries: crate::ollama::DEFAULT_MAX_RETRIES,
            api_token_env: Some("HF_TOKEN".to_string()),
            mock_response: "[]".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.provider != ProviderKind::Mock && self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.max_new_tokens == 0 {
            return Err("max_new_tokens must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// API token read from the configured environment variable
    pub fn api_token(&self) -> Option<String> {
        self.api_token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|token| !token.trim().is_empty())
    }
}
