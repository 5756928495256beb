//! The analysis pipeline: extract, chunk, classify, parse, merge

use crate::chunking::{Chunk, TokenChunker};
use crate::config::ExtractorConfig;
use crate::error::{ExtractorError, PipelineError};
use crate::merge::merge_records;
use crate::parser::parse_taxonomy_response;
use crate::prompt::PromptBuilder;
use crate::types::{AnalysisMetadata, AnalysisResult, DocumentUpload};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use taxonomist_domain::assemble_text;
use taxonomist_domain::traits::{DocumentReader, LlmProvider, TokenCodec};
use tracing::{debug, error, info, warn};

/// Turns an uploaded document into a merged taxonomy
///
/// Collaborators are built once and shared read-only between requests.
/// Each call to [`TaxonomyPipeline::analyze`] runs its chunks one at a time,
/// in document order, and either returns the whole tree or an error.
pub struct TaxonomyPipeline<L, C, D> {
    llm_provider: Arc<L>,
    codec: Arc<C>,
    reader: Arc<D>,
    config: ExtractorConfig,
}

impl<L, C, D> Clone for TaxonomyPipeline<L, C, D> {
    fn clone(&self) -> Self {
        Self {
            llm_provider: Arc::clone(&self.llm_provider),
            codec: Arc::clone(&self.codec),
            reader: Arc::clone(&self.reader),
            config: self.config.clone(),
        }
    }
}

impl<L, C, D> TaxonomyPipeline<L, C, D>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    C: TokenCodec + Send + Sync + 'static,
    C::Error: Into<ExtractorError>,
    D: DocumentReader + Send + Sync + 'static,
    D::Error: Into<ExtractorError>,
{
    /// Create a new pipeline
    pub fn new(
        llm_provider: L,
        codec: C,
        reader: D,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            llm_provider: Arc::new(llm_provider),
            codec: Arc::new(codec),
            reader: Arc::new(reader),
            config,
        })
    }

    /// Name of the model answering prompts
    pub fn model_name(&self) -> &str {
        self.llm_provider.model_name()
    }

    /// Pipeline configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Reject a request before any processing
    pub fn validate(&self, upload: Option<&DocumentUpload>) -> Result<(), PipelineError> {
        let upload = upload.ok_or(PipelineError::MissingDocument)?;
        if !self.config.accepts_filename(&upload.filename) {
            return Err(PipelineError::UnsupportedDocument {
                filename: upload.filename.clone(),
            });
        }
        Ok(())
    }

    /// Analyze a document into a taxonomy
    pub async fn analyze(
        &self,
        upload: Option<DocumentUpload>,
    ) -> Result<AnalysisResult, PipelineError> {
        self.validate(upload.as_ref())?;
        let Some(DocumentUpload { filename, bytes }) = upload else {
            return Err(PipelineError::MissingDocument);
        };

        let start_time = Instant::now();
        info!(filename = %filename, size_bytes = bytes.len(), "Starting analysis");

        let (text, page_count) = self.extract_text(bytes).await?;
        info!(page_count, text_chars = text.len(), "Document text extracted");

        let chunks = self.chunk_text(text).await?;
        info!(chunk_count = chunks.len(), "Document chunked");

        let mut records = Vec::new();
        for chunk in &chunks {
            let reply = self.classify(chunk).await?;
            debug!(chunk = chunk.index, reply = %reply, "Model reply");

            let parsed = parse_taxonomy_response(&reply).map_err(|e| {
                error!(
                    chunk = chunk.index,
                    details = %e.details,
                    "Model reply is not valid taxonomy JSON"
                );
                ExtractorError::from(e)
            })?;
            debug!(chunk = chunk.index, record_count = parsed.len(), "Chunk classified");
            records.extend(parsed);
        }

        let taxonomy = merge_records(&records).map_err(ExtractorError::from)?;
        debug!(
            top_level_count = taxonomy.root().len(),
            leaf_count = taxonomy.leaf_count(),
            "Taxonomy merged"
        );

        let metadata = AnalysisMetadata {
            filename,
            page_count,
            chunk_count: chunks.len(),
            record_count: records.len(),
            model_name: self.model_name().to_string(),
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(
            filename = %metadata.filename,
            chunk_count = metadata.chunk_count,
            record_count = metadata.record_count,
            processing_time_ms = metadata.processing_time_ms,
            "Analysis complete"
        );

        Ok(AnalysisResult { taxonomy, metadata })
    }

    async fn extract_text(&self, bytes: Vec<u8>) -> Result<(String, usize), ExtractorError> {
        let reader = Arc::clone(&self.reader);

        tokio::task::spawn_blocking(move || -> Result<(String, usize), ExtractorError> {
            let pages = reader.read_pages(&bytes).map_err(Into::<ExtractorError>::into)?;
            Ok((assemble_text(&pages), pages.len()))
        })
        .await
        .map_err(|e| ExtractorError::Task(e.to_string()))?
    }

    async fn chunk_text(&self, text: String) -> Result<Vec<Chunk>, ExtractorError> {
        let codec = Arc::clone(&self.codec);
        let max_tokens = self.config.max_chunk_tokens;

        tokio::task::spawn_blocking(move || {
            TokenChunker::new(codec.as_ref(), max_tokens)?.chunk(&text)
        })
        .await
        .map_err(|e| ExtractorError::Task(e.to_string()))?
    }

    async fn classify(&self, chunk: &Chunk) -> Result<String, ExtractorError> {
        let llm = Arc::clone(&self.llm_provider);
        let prompt = PromptBuilder::new(&chunk.text)
            .with_domain(&self.config.document_domain)
            .build();
        debug!(
            chunk = chunk.index,
            tokens = chunk.token_count(),
            prompt_chars = prompt.len(),
            "Classifying chunk"
        );

        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt).map_err(|e| {
                warn!(error = %e, "Classifier call failed");
                ExtractorError::Llm(e.to_string())
            })
        })
        .await
        .map_err(|e| ExtractorError::Task(e.to_string()))?
    }
}
