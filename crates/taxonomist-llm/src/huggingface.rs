//! Hugging Face Provider Implementation
//!
//! Sends classification prompts to the Hugging Face Inference API, or to any
//! text-generation-inference server exposing the same `/models/{model}` route.
//! Decoding is greedy and only the generated continuation is returned, never
//! the echoed prompt.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taxonomist_domain::traits::LlmProvider as LlmProviderTrait;
use tracing::debug;

/// Default Hugging Face Inference API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";

/// Default model used for taxonomy extraction
pub const DEFAULT_MODEL: &str = "HuggingFaceH4/zephyr-7b-beta";

/// Default generation budget per chunk
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 2048;

/// Default request timeout (seconds); long generations are slow
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Hugging Face text-generation provider
pub struct HuggingFaceProvider {
    endpoint: String,
    model: String,
    api_token: Option<String>,
    max_new_tokens: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// The Inference API answers with a list; TGI's `/generate` with a single object
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, LlmError> {
        match self {
            GenerateResponse::Single(output) => Ok(output.generated_text),
            GenerateResponse::Batch(outputs) => outputs
                .into_iter()
                .next()
                .map(|output| output.generated_text)
                .ok_or_else(|| LlmError::InvalidResponse("Empty generation list".to_string())),
        }
    }
}

impl HuggingFaceProvider {
    /// Create a new provider for a model behind an endpoint
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_token: None,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            client: build_client(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Authenticate requests with a bearer token
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the upper bound on generated tokens
    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.client = build_client(timeout_secs);
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}", self.endpoint, self.model)
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_new_tokens: self.max_new_tokens,
                do_sample: false,
                return_full_text: false,
            },
        }
    }

    /// Generate a completion for a prompt
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut request = self.client.post(self.url()).json(&self.request_body(prompt));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?
            .into_text()
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(0)
        .build()
        .unwrap_or_default()
}

impl LlmProviderTrait for HuggingFaceProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending prompt to Hugging Face");
        crate::block_on(self.complete(prompt))?
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
