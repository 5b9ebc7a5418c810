/// Embedding wrapper around fastembed.
///
/// `TextEmbedding` from fastembed is synchronous and CPU-bound, so every
/// embed call is dispatched through `tokio::task::spawn_blocking`. The inner
/// ONNX runtime is `!Send`; the model is held behind `Arc` and touched only
/// from blocking tasks.
///
/// The nomic-embed-text-v1.5 model uses task-prefixed inputs:
/// - Documents: "search_document: {text}"
/// - Queries: "search_query: {text}"
use std::sync::Arc;

use crate::error::CommonError;

/// Wraps fastembed's `TextEmbedding` model for generating vector embeddings.
pub struct Embedder {
    model: Arc<fastembed::TextEmbedding>,
}

impl Embedder {
    /// Initialize the embedding model (nomic-embed-text-v1.5).
    ///
    /// Downloads the model on first run (~300MB); the download happens
    /// synchronously inside a blocking task.
    pub async fn new() -> Result<Self, CommonError> {
        let model = tokio::task::spawn_blocking(|| {
            let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::NomicEmbedTextV15)
                .with_show_download_progress(true);
            fastembed::TextEmbedding::try_new(options)
        })
        .await
        .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
        .map_err(|e| CommonError::Embedding(format!("model initialization failed: {e}")))?;

        Ok(Self {
            model: Arc::new(model),
        })
    }

    /// Embed corpus documents for indexing, in small batches to bound peak
    /// memory during ONNX inference. The knowledge base is a few dozen
    /// documents, so a full re-embed stays cheap.
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CommonError> {
        let prefixed: Vec<String> = texts
            .iter()
            .map(|t| format!("search_document: {t}"))
            .collect();
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || model.embed(prefixed, Some(4)))
            .await
            .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
            .map_err(|e| CommonError::Embedding(format!("document embedding failed: {e}")))
    }

    /// Embed a single user query for search.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, CommonError> {
        let prefixed = vec![format!("search_query: {query}")];
        let model = Arc::clone(&self.model);
        let mut results = tokio::task::spawn_blocking(move || model.embed(prefixed, None))
            .await
            .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
            .map_err(|e| CommonError::Embedding(format!("query embedding failed: {e}")))?;
        results
            .pop()
            .ok_or_else(|| CommonError::Embedding("empty embedding result".to_string()))
    }

    /// Dimensionality of the embedding vectors (768 for nomic-embed-text-v1.5).
    pub fn dimensions(&self) -> usize {
        768
    }
}
