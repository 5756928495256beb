//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the taxonomy pipeline and the
//! heavyweight collaborators it drives. Implementations live in other crates.

use crate::PageColumns;

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (taxonomist-llm). Calls are blocking.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a text completion for a prompt
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Name of the model answering prompts
    fn model_name(&self) -> &str {
        "llm"
    }
}

/// Trait for converting text to token ids and back
///
/// Implemented by the extraction layer (taxonomist-extractor).
pub trait TokenCodec {
    /// Error type for tokenizer operations
    type Error;

    /// Encode text into an ordered sequence of token ids
    fn encode(&self, text: &str) -> Result<Vec<u32>, Self::Error>;

    /// Decode a run of token ids back into text
    fn decode(&self, tokens: &[u32]) -> Result<String, Self::Error>;
}

/// Trait for reading page text out of an uploaded document
///
/// Implemented by the extraction layer (taxonomist-extractor).
pub trait DocumentReader {
    /// Error type for document reading
    type Error;

    /// Read every page of the document, in page order
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<PageColumns>, Self::Error>;
}
