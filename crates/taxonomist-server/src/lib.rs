//! Taxonomist Server
//!
//! HTTP front end for the taxonomy pipeline. Accepts a PDF upload on
//! `POST /analyze` and answers with the merged taxonomy tree.
//!
//! Heavy collaborators (tokenizer, classifier client, PDF reader) are built
//! once from [`ServerConfig`](config::ServerConfig) and shared by all requests.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod handlers;

use config::{ConfigError, ServerConfig};
use handlers::{create_router, AppState};
use std::path::Path;
use taxonomist_extractor::{
    AnalysisResult, DocumentUpload, ExtractorError, PdfDocumentReader, PipelineError,
    TaxonomyPipeline, TokenizerBackend,
};
use taxonomist_llm::{ConfiguredProvider, LlmError, ProviderKind};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Pipeline wired with the configured production collaborators
pub type ServicePipeline =
    TaxonomyPipeline<ConfiguredProvider, TokenizerBackend, PdfDocumentReader>;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Classifier backend could not be constructed
    #[error("Classifier setup error: {0}")]
    Llm(#[from] LlmError),

    /// Pipeline could not be constructed
    #[error("Pipeline setup error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Analysis of a document failed
    #[error("Analysis failed: {0}")]
    Analysis(#[from] PipelineError),

    /// Server binding or file error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Initialize structured logging
///
/// Honors `RUST_LOG`; otherwise logs this workspace at debug and everything
/// else at info.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,taxonomist=debug,tower_http=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

/// Resolve the tokenizer used for chunk budgets
///
/// A local file wins, then `tokenizer_model`, then the Hugging Face backend's
/// own model. The mock backend counts per character, as does an Ollama backend
/// with no tokenizer configured.
pub fn load_tokenizer(config: &ServerConfig) -> Result<TokenizerBackend, ServerError> {
    if let Some(path) = &config.tokenizer_path {
        return Ok(TokenizerBackend::load(Some(path.as_path()))?);
    }
    if let Some(model) = &config.tokenizer_model {
        return Ok(TokenizerBackend::from_model(model)?);
    }

    match config.llm.provider {
        ProviderKind::HuggingFace => Ok(TokenizerBackend::from_model(&config.llm.model)?),
        ProviderKind::Ollama => {
            warn!(
                model = %config.llm.model,
                "No tokenizer configured for Ollama; counting chunk budgets per character"
            );
            Ok(TokenizerBackend::load(None)?)
        }
        ProviderKind::Mock => Ok(TokenizerBackend::load(None)?),
    }
}

/// Build the pipeline described by the configuration
pub fn build_pipeline(config: &ServerConfig) -> Result<ServicePipeline, ServerError> {
    config.validate()?;

    let provider = ConfiguredProvider::from_config(&config.llm)?;
    let tokenizer = load_tokenizer(config)?;
    info!(
        model = %config.llm.model,
        provider = ?config.llm.provider,
        tokenizer = tokenizer.kind(),
        max_chunk_tokens = config.extractor.max_chunk_tokens,
        "Pipeline ready"
    );

    Ok(TaxonomyPipeline::new(
        provider,
        tokenizer,
        PdfDocumentReader::new(),
        config.extractor.clone(),
    )?)
}

/// Start the HTTP server
///
/// Builds the pipeline, binds the configured address and serves until the
/// process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Taxonomist server");
    info!("Bind address: {}", config.bind_addr());
    info!("Upload limit: {} bytes", config.max_upload_bytes);

    let state = AppState {
        pipeline: build_pipeline(&config)?,
        max_upload_bytes: config.max_upload_bytes,
    };
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

/// Analyze a document on disk without starting the server
pub async fn analyze_file(
    config: &ServerConfig,
    path: &Path,
) -> Result<AnalysisResult, ServerError> {
    let pipeline = build_pipeline(config)?;

    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(pipeline
        .analyze(Some(DocumentUpload::new(filename, bytes)))
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxonomist_llm::ProviderConfig;

    fn mock_config() -> ServerConfig {
        ServerConfig {
            llm: ProviderConfig {
                provider: ProviderKind::Mock,
                model: "canned".to_string(),
                ..ProviderConfig::default()
            },
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_build_pipeline_from_mock_config() {
        let pipeline = build_pipeline(&mock_config()).unwrap();
        assert_eq!(pipeline.model_name(), "canned");
    }

    #[test]
    fn test_mock_backend_counts_per_character() {
        let tokenizer = load_tokenizer(&mock_config()).unwrap();
        assert_eq!(tokenizer.kind(), "scalar");
    }

    #[test]
    fn test_ollama_without_tokenizer_counts_per_character() {
        let config = ServerConfig {
            llm: ProviderConfig {
                provider: ProviderKind::Ollama,
                endpoint: "http://localhost:11434".to_string(),
                model: "zephyr".to_string(),
                ..ProviderConfig::default()
            },
            ..ServerConfig::default()
        };
        assert_eq!(load_tokenizer(&config).unwrap().kind(), "scalar");
    }

    #[test]
    fn test_tokenizer_file_takes_precedence() {
        let config = ServerConfig {
            tokenizer_path: Some("/nonexistent/tokenizer.json".into()),
            tokenizer_model: Some("HuggingFaceH4/zephyr-7b-beta".to_string()),
            ..mock_config()
        };
        // The file is tried, not the Hub model
        match load_tokenizer(&config) {
            Err(ServerError::Extractor(ExtractorError::Tokenization(message))) => {
                assert!(message.contains("/nonexistent/tokenizer.json"));
            }
            Err(other) => panic!("expected tokenization error, got {}", other),
            Ok(tokenizer) => panic!("expected an error, loaded {}", tokenizer.kind()),
        }
    }

    #[test]
    #[ignore] // Requires network access to the Hugging Face Hub
    fn test_huggingface_backend_fetches_model_tokenizer() {
        let config = ServerConfig {
            llm: ProviderConfig {
                model: "HuggingFaceH4/zephyr-7b-beta".to_string(),
                ..ProviderConfig::default()
            },
            ..ServerConfig::default()
        };
        assert_eq!(load_tokenizer(&config).unwrap().kind(), "huggingface");
    }

    #[test]
    fn test_build_pipeline_missing_tokenizer() {
        let config = ServerConfig {
            tokenizer_path: Some("/nonexistent/tokenizer.json".into()),
            ..mock_config()
        };
        assert!(matches!(
            build_pipeline(&config),
            Err(ServerError::Extractor(ExtractorError::Tokenization(_)))
        ));
    }

    #[tokio::test]
    async fn test_analyze_file_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let error = analyze_file(&mock_config(), &path).await.unwrap_err();
        assert!(matches!(
            error,
            ServerError::Analysis(PipelineError::UnsupportedDocument { .. })
        ));
    }

    #[tokio::test]
    async fn test_analyze_file_missing() {
        let error = analyze_file(&mock_config(), Path::new("/nonexistent/patent.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(error, ServerError::Io(_)));
    }
}
