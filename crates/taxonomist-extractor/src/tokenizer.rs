//! Tokenizer adapters used for chunk budget accounting

use crate::error::ExtractorError;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use std::path::Path;
use taxonomist_domain::traits::TokenCodec;
use tokenizers::Tokenizer;

/// A Hugging Face `tokenizer.json` tokenizer
///
/// Special tokens are neither added on encode nor skipped on decode, so the
/// token stream round-trips exactly.
pub struct HfTokenizer {
    inner: Tokenizer,
}

impl HfTokenizer {
    /// Load a tokenizer from a `tokenizer.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let path = path.as_ref();
        Tokenizer::from_file(path)
            .map(|inner| Self { inner })
            .map_err(|e| {
                ExtractorError::Tokenization(format!(
                    "Failed to load tokenizer from {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    /// Fetch the `tokenizer.json` of a Hugging Face Hub model
    ///
    /// Files are cached locally by `hf-hub`; a gated model needs `HF_TOKEN`.
    pub fn from_pretrained(model_id: &str) -> Result<Self, ExtractorError> {
        let api = Api::new().map_err(|e| {
            ExtractorError::Tokenization(format!("Failed to create HF Hub API: {}", e))
        })?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));
        let tokenizer_path = repo.get("tokenizer.json").map_err(|e| {
            ExtractorError::Tokenization(format!(
                "Failed to download tokenizer for {}: {}",
                model_id, e
            ))
        })?;
        Self::from_file(tokenizer_path)
    }

    /// Load a tokenizer from the bytes of a `tokenizer.json` file
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExtractorError> {
        Tokenizer::from_bytes(bytes)
            .map(|inner| Self { inner })
            .map_err(|e| ExtractorError::Tokenization(format!("Failed to load tokenizer: {}", e)))
    }
}

impl TokenCodec for HfTokenizer {
    type Error = ExtractorError;

    fn encode(&self, text: &str) -> Result<Vec<u32>, Self::Error> {
        self.inner
            .encode(text, false)
            .map(|encoding| encoding.get_ids().to_vec())
            .map_err(|e| ExtractorError::Tokenization(e.to_string()))
    }

    fn decode(&self, tokens: &[u32]) -> Result<String, Self::Error> {
        self.inner
            .decode(tokens, false)
            .map_err(|e| ExtractorError::Tokenization(e.to_string()))
    }
}

/// One token per Unicode scalar value
///
/// Deterministic and lossless; used by the mock backend, when no Hub tokenizer
/// applies, and in tests.
///
/// # Examples
///
/// ```
/// use taxonomist_extractor::ScalarCodec;
/// use taxonomist_domain::traits::TokenCodec;
///
/// let codec = ScalarCodec;
/// let tokens = codec.encode("héllo").unwrap();
/// assert_eq!(tokens.len(), 5);
/// assert_eq!(codec.decode(&tokens).unwrap(), "héllo");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarCodec;

impl TokenCodec for ScalarCodec {
    type Error = ExtractorError;

    fn encode(&self, text: &str) -> Result<Vec<u32>, Self::Error> {
        Ok(text.chars().map(u32::from).collect())
    }

    fn decode(&self, tokens: &[u32]) -> Result<String, Self::Error> {
        tokens
            .iter()
            .map(|&token| {
                char::from_u32(token).ok_or_else(|| {
                    ExtractorError::Tokenization(format!("Invalid scalar token {}", token))
                })
            })
            .collect()
    }
}

/// The tokenizer chosen at startup
pub enum TokenizerBackend {
    /// Hugging Face tokenizer file
    HuggingFace(HfTokenizer),
    /// Scalar fallback
    Scalar(ScalarCodec),
}

impl TokenizerBackend {
    /// Load the tokenizer at `path`, or fall back to [`ScalarCodec`]
    pub fn load(path: Option<&Path>) -> Result<Self, ExtractorError> {
        match path {
            Some(path) => HfTokenizer::from_file(path).map(TokenizerBackend::HuggingFace),
            None => Ok(TokenizerBackend::Scalar(ScalarCodec)),
        }
    }

    /// Fetch the tokenizer published with a Hub model
    pub fn from_model(model_id: &str) -> Result<Self, ExtractorError> {
        HfTokenizer::from_pretrained(model_id).map(TokenizerBackend::HuggingFace)
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            TokenizerBackend::HuggingFace(_) => "huggingface",
            TokenizerBackend::Scalar(_) => "scalar",
        }
    }
}

impl TokenCodec for TokenizerBackend {
    type Error = ExtractorError;

    fn encode(&self, text: &str) -> Result<Vec<u32>, Self::Error> {
        match self {
            TokenizerBackend::HuggingFace(tokenizer) => tokenizer.encode(text),
            TokenizerBackend::Scalar(codec) => codec.encode(text),
        }
    }

    fn decode(&self, tokens: &[u32]) -> Result<String, Self::Error> {
        match self {
            TokenizerBackend::HuggingFace(tokenizer) => tokenizer.decode(tokens),
            TokenizerBackend::Scalar(codec) => codec.decode(tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TokenChunker;

    /// A WordPiece tokenizer that splits "substrate" into two subwords
    const WORDPIECE_JSON: &str = r###"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": { "type": "WordPiece", "prefix": "##", "cleanup": true },
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": {
                "[UNK]": 0,
                "a": 1,
                "thermal": 2,
                "sub": 3,
                "##strate": 4,
                "layer": 5,
                "##s": 6
            }
        }
    }"###;

    fn wordpiece() -> HfTokenizer {
        HfTokenizer::from_bytes(WORDPIECE_JSON.as_bytes()).unwrap()
    }

    #[test]
    fn test_scalar_round_trip() {
        let codec = ScalarCodec;
        let text = "Composite substrates: 複合材料\n";
        let tokens = codec.encode(text).unwrap();
        assert_eq!(tokens.len(), text.chars().count());
        assert_eq!(codec.decode(&tokens).unwrap(), text);
    }

    #[test]
    fn test_scalar_rejects_surrogate_ids() {
        let codec = ScalarCodec;
        assert!(matches!(
            codec.decode(&[0xD800]),
            Err(ExtractorError::Tokenization(_))
        ));
    }

    #[test]
    fn test_missing_tokenizer_file() {
        let result = HfTokenizer::from_file("/nonexistent/tokenizer.json");
        assert!(matches!(result, Err(ExtractorError::Tokenization(_))));
    }

    #[test]
    fn test_invalid_tokenizer_bytes() {
        let result = HfTokenizer::from_bytes(b"not a tokenizer");
        assert!(matches!(result, Err(ExtractorError::Tokenization(_))));
    }

    #[test]
    fn test_backend_defaults_to_scalar() {
        let backend = TokenizerBackend::load(None).unwrap();
        assert_eq!(backend.kind(), "scalar");
        assert_eq!(backend.encode("abc").unwrap(), vec![97, 98, 99]);
    }

    #[test]
    fn test_hf_tokenizer_encodes_subwords() {
        let tokenizer = wordpiece();
        let tokens = tokenizer.encode("a thermal substrate layers").unwrap();
        assert_eq!(tokens, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(tokenizer.decode(&[3, 4]).unwrap(), "substrate");
        assert_eq!(
            tokenizer.decode(&tokens).unwrap(),
            "a thermal substrate layers"
        );
    }

    #[test]
    fn test_hf_tokenizer_unknown_word() {
        let tokenizer = wordpiece();
        assert_eq!(tokenizer.encode("a graphene").unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_chunking_with_hf_tokenizer() {
        let tokenizer = wordpiece();
        let text = "a thermal substrate layers";
        let all_tokens = tokenizer.encode(text).unwrap();

        let chunker = TokenChunker::new(&tokenizer, 3).unwrap();
        let chunks = chunker.chunk(text).unwrap();

        // ceil(6 / 3) windows; the second starts inside "substrate"
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].tokens, vec![1, 2, 3]);
        assert_eq!(chunks[0].text, "a thermal sub");
        assert!(chunks[1].text.contains("layers"));

        let rejoined: Vec<u32> = chunks.iter().flat_map(|c| c.tokens.clone()).collect();
        assert_eq!(rejoined, all_tokens);
    }

    #[test]
    fn test_backend_wraps_hf_tokenizer() {
        let backend = TokenizerBackend::HuggingFace(wordpiece());
        assert_eq!(backend.kind(), "huggingface");
        assert_eq!(backend.encode("thermal layers").unwrap(), vec![2, 5, 6]);
    }

    #[test]
    #[ignore] // Requires network access to the Hugging Face Hub
    fn test_backend_from_hub_model() {
        let backend = TokenizerBackend::from_model("HuggingFaceH4/zephyr-7b-beta").unwrap();
        assert_eq!(backend.kind(), "huggingface");
        assert!(!backend.encode("thermal substrate").unwrap().is_empty());
    }
}
