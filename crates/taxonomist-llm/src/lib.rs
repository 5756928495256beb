//! Taxonomist LLM Provider Layer
//!
//! Pluggable classifier backends implementing the `LlmProvider` trait from
//! `taxonomist-domain`. Every provider takes a prompt and returns the raw model
//! text; turning that text into records happens one layer up.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `HuggingFaceProvider`: Hugging Face Inference API / text-generation-inference
//! - `OllamaProvider`: Local Ollama API integration
//! - `ConfiguredProvider`: one of the above, chosen by `ProviderConfig`
//!
//! # Examples
//!
//! ```
//! use taxonomist_llm::MockProvider;
//! use taxonomist_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("[]");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "[]");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod huggingface;
pub mod ollama;

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use taxonomist_domain::traits::LlmProvider as LlmProviderTrait;
use thiserror::Error;

pub use config::{ProviderConfig, ProviderKind};
pub use huggingface::HuggingFaceProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Drive an async request to completion from blocking code
///
/// Providers are called from the blocking thread pool, so each call gets its
/// own single-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, LlmError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls. Lookup
/// order for each prompt: an exact per-prompt response, then the next queued
/// response, then the default response.
///
/// # Examples
///
/// ```
/// use taxonomist_llm::MockProvider;
/// use taxonomist_domain::traits::LlmProvider;
///
/// // Fixed response
/// let provider = MockProvider::new("[]");
/// assert_eq!(provider.generate("any prompt").unwrap(), "[]");
///
/// // One response per call, in order
/// let provider = MockProvider::new("[]").with_sequence(["first", "second"]);
/// assert_eq!(provider.generate("a").unwrap(), "first");
/// assert_eq!(provider.generate("b").unwrap(), "second");
/// assert_eq!(provider.generate("c").unwrap(), "[]");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    queued: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    model_name: String,
}

const MOCK_ERROR: &str = "ERROR";

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            queued: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            model_name: "mock".to_string(),
        }
    }

    /// Queue responses returned one per call, in order
    pub fn with_sequence<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.queued).extend(responses.into_iter().map(Into::into));
        self
    }

    /// Report a different model name
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), response.into());
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), MOCK_ERROR.to_string());
    }

    /// Queue an error as the next sequential response
    pub fn queue_error(&self) {
        lock(&self.queued).push_back(MOCK_ERROR.to_string());
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Forget all recorded prompts
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        lock(&self.prompts).push(prompt.to_string());

        let response = lock(&self.responses)
            .get(prompt)
            .cloned()
            .or_else(|| lock(&self.queued).pop_front())
            .unwrap_or_else(|| self.default_response.clone());

        if response == MOCK_ERROR {
            return Err(LlmError::Other("Mock error".to_string()));
        }
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// A provider selected at startup from configuration
pub enum ConfiguredProvider {
    /// Hugging Face text-generation backend
    HuggingFace(HuggingFaceProvider),
    /// Local Ollama backend
    Ollama(OllamaProvider),
    /// Canned responses, for demos and tests
    Mock(MockProvider),
}

impl ConfiguredProvider {
    /// Build the provider described by the configuration
    ///
    /// The API token, if any, is read from the environment variable named by
    /// `api_token_env`.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::Other)?;

        let provider = match config.provider {
            ProviderKind::HuggingFace => {
                let mut provider = HuggingFaceProvider::new(&config.endpoint, &config.model)
                    .with_max_new_tokens(config.max_new_tokens)
                    .with_timeout_secs(config.timeout_secs);
                if let Some(token) = config.api_token() {
                    provider = provider.with_api_token(token);
                }
                ConfiguredProvider::HuggingFace(provider)
            }
            ProviderKind::Ollama => ConfiguredProvider::Ollama(
                OllamaProvider::new(&config.endpoint, &config.model)
                    .with_max_retries(config.max_retries)
                    .with_max_new_tokens(config.max_new_tokens)
                    .with_timeout_secs(config.timeout_secs),
            ),
            ProviderKind::Mock => ConfiguredProvider::Mock(
                MockProvider::new(config.mock_response.clone()).with_model_name(&config.model),
            ),
        };
        Ok(provider)
    }
}

impl LlmProviderTrait for ConfiguredProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            ConfiguredProvider::HuggingFace(provider) => provider.generate(prompt),
            ConfiguredProvider::Ollama(provider) => provider.generate(prompt),
            ConfiguredProvider::Mock(provider) => provider.generate(prompt),
        }
    }

    fn model_name(&self) -> &str {
        match self {
            ConfiguredProvider::HuggingFace(provider) => provider.model_name(),
            ConfiguredProvider::Ollama(provider) => provider.model_name(),
            ConfiguredProvider::Mock(provider) => provider.model_name(),
        }
    }
}
