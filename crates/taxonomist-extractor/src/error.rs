//! Error types for the Extractor

use taxonomist_domain::TaxonomyError;
use thiserror::Error;

/// A model reply that could not be decoded into classification records
///
/// Carries the untouched reply so callers can inspect what the model produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse taxonomy JSON: {details}")]
pub struct TaxonomyParseError {
    /// Decoder failure detail
    pub details: String,
    /// The raw model reply, exactly as received
    pub raw_response: String,
}

impl TaxonomyParseError {
    /// Create a parse error for a raw reply
    pub fn new(details: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self {
            details: details.into(),
            raw_response: raw_response.into(),
        }
    }
}

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tokenizer failed to load, encode or decode
    #[error("Tokenization error: {0}")]
    Tokenization(String),

    /// Document could not be opened or read
    #[error("Document extraction error: {0}")]
    Extraction(String),

    /// A chunk's model reply was not a valid taxonomy
    #[error(transparent)]
    Parse(#[from] TaxonomyParseError),

    /// Records could not be merged into the tree
    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Blocking task failed to complete
    #[error("Task join error: {0}")]
    Task(String),
}

/// Errors returned by the analysis pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No document was supplied
    #[error("No file uploaded")]
    MissingDocument,

    /// The document's filename lacks a recognized extension
    #[error("Unsupported document type: {filename}")]
    UnsupportedDocument {
        /// Name of the rejected file
        filename: String,
    },

    /// Processing failed after validation
    #[error(transparent)]
    Extractor(#[from] ExtractorError),
}

impl PipelineError {
    /// The model reply that failed to parse, if that is what went wrong
    pub fn parse_failure(&self) -> Option<&TaxonomyParseError> {
        match self {
            PipelineError::Extractor(ExtractorError::Parse(error)) => Some(error),
            _ => None,
        }
    }

    /// Whether the request was rejected before any processing
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingDocument | PipelineError::UnsupportedDocument { .. }
        )
    }
}
