//! Taxonomist Domain Layer
//!
//! This crate contains the core model of Taxonomist: the flat classification
//! records produced by a language model and the fixed-depth tree they are merged
//! into. It also defines the trait interfaces for the collaborators the pipeline
//! drives (tokenizer, language model, document reader).
//!
//! ## Key Concepts
//!
//! - **ClassificationRecord**: seven ordered hierarchy labels plus a comment
//! - **Label**: a hierarchy label or the absent marker (`"null"`)
//! - **Taxonomy**: records nested by their first five labels, leaves holding comments
//! - **PageColumns**: page text split into left and right columns
//!
//! ## Architecture
//!
//! - Only serialization crates as dependencies
//! - No I/O; infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod record;
pub mod taxonomy;
pub mod traits;

// Re-exports for convenience
pub use document::{assemble_text, PageColumns};
pub use record::{ClassificationRecord, Label, ABSENT_LABEL, LEVEL_COUNT, LEVEL_KEYS};
pub use taxonomy::{LeafEntry, Taxonomy, TaxonomyError, TaxonomyNode, NESTED_DEPTH};
