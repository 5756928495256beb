//! Token-bounded chunking for large documents

use crate::error::ExtractorError;
use taxonomist_domain::traits::TokenCodec;

/// A consecutive run of at most `max_tokens` tokens, decoded back to text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the document
    pub index: usize,
    /// Token ids covered by this chunk
    pub tokens: Vec<u32>,
    /// Independently decoded text of `tokens`
    pub text: String,
}

impl Chunk {
    /// Number of tokens in this chunk
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

/// Splits text into fixed-size token windows
///
/// The document is encoded once and the token sequence is cut into
/// consecutive, non-overlapping windows; only the last may be shorter. Each
/// window is decoded on its own, so a word split across a boundary stays split.
pub struct TokenChunker<'a, C> {
    codec: &'a C,
    max_tokens: usize,
}

impl<'a, C> TokenChunker<'a, C>
where
    C: TokenCodec,
    C::Error: Into<ExtractorError>,
{
    /// Create a chunker; `max_tokens` must be positive
    pub fn new(codec: &'a C, max_tokens: usize) -> Result<Self, ExtractorError> {
        if max_tokens == 0 {
            return Err(ExtractorError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        Ok(Self { codec, max_tokens })
    }

    /// Chunk the given text
    ///
    /// Empty text yields no chunks.
    pub fn chunk(&self, text: &str) -> Result<Vec<Chunk>, ExtractorError> {
        let tokens = self
            .codec
            .encode(text)
            .map_err(Into::<ExtractorError>::into)?;

        tokens
            .chunks(self.max_tokens)
            .enumerate()
            .map(|(index, window)| -> Result<Chunk, ExtractorError> {
                let text = self.codec.decode(window).map_err(Into::<ExtractorError>::into)?;
                Ok(Chunk {
                    index,
                    tokens: window.to_vec(),
                    text,
                })
            })
            .collect()
    }
}
