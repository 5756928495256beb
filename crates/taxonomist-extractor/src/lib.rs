//! Taxonomist Extractor
//!
//! Turns a document into a nested taxonomy by way of an LLM.
//!
//! # Architecture
//!
//! ```text
//! PDF → pages → text → token chunks → prompt → LLM → records → merged tree
//! ```
//!
//! Each chunk is classified in its own model call. Replies are parsed into flat
//! [`ClassificationRecord`](taxonomist_domain::ClassificationRecord)s and folded
//! into one [`Taxonomy`](taxonomist_domain::Taxonomy) keyed on the first five
//! levels. A single unparseable reply fails the whole document.
//!
//! # Example Usage
//!
//! ```no_run
//! use taxonomist_extractor::{
//!     DocumentUpload, ExtractorConfig, PdfDocumentReader, ScalarCodec, TaxonomyPipeline,
//! };
//! use taxonomist_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = TaxonomyPipeline::new(
//!     MockProvider::new("[]"),
//!     ScalarCodec,
//!     PdfDocumentReader::new(),
//!     ExtractorConfig::default(),
//! )?;
//!
//! let bytes = std::fs::read("patent.pdf")?;
//! let result = pipeline
//!     .analyze(Some(DocumentUpload::new("patent.pdf", bytes)))
//!     .await?;
//!
//! println!("{}", serde_json::to_string_pretty(&result.taxonomy)?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod document;
mod error;
mod merge;
mod parser;
mod pipeline;
mod prompt;
mod tokenizer;
mod types;


pub use chunking::{Chunk, TokenChunker};
pub use config::ExtractorConfig;
pub use document::{split_columns, PdfDocumentReader, PositionedText};
pub use error::{ExtractorError, PipelineError, TaxonomyParseError};
pub use merge::merge_records;
pub use parser::parse_taxonomy_response;
pub use pipeline::TaxonomyPipeline;
pub use prompt::PromptBuilder;
pub use tokenizer::{HfTokenizer, ScalarCodec, TokenizerBackend};
pub use types::{AnalysisMetadata, AnalysisResult, DocumentUpload};
