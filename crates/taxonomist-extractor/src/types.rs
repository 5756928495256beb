//! Request and response types for analysis

use serde::Serialize;
use taxonomist_domain::Taxonomy;

/// An uploaded document awaiting analysis
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Client-supplied filename
    pub filename: String,

    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Create an upload from a filename and its bytes
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Result of a successful analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// The merged taxonomy tree
    pub taxonomy: Taxonomy,

    /// Metadata about the run
    pub metadata: AnalysisMetadata,
}

/// Metadata about an analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// Name of the analyzed file
    pub filename: String,

    /// Pages read from the document
    pub page_count: usize,

    /// Chunks sent to the model
    pub chunk_count: usize,

    /// Records parsed across all chunks
    pub record_count: usize,

    /// Model that answered the prompts
    pub model_name: String,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}
