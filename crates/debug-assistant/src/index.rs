/// Index maintenance for the debug-assistant.
///
/// The vector table is rebuilt when the knowledge-base file changes (detected
/// by SHA-256 fingerprint) or when the table is missing. Rebuilding renders
/// the corpus into documents, embeds them, and replaces the LanceDB table
/// wholesale; it is the only way the document set ever changes. Triggered at
/// startup and on demand via the `rebuild_index` MCP tool.
use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::cache::SearchCache;
use crate::config::Config;
use crate::corpus;
use crate::error::AppError;
use crate::model::{Corpus, Document};
use crate::search::SearchEngine;
use assistant_common::embedding::Embedder;
use assistant_common::error::CommonError;
use assistant_common::vectordb::VectorDb;

const EMBEDDING_DIM: i32 = 768;

/// Result of a rebuild check or rebuild.
pub struct RebuildOutcome {
    /// Whether an actual rebuild occurred (false if already up to date).
    pub rebuilt: bool,
    /// SHA-256 fingerprint of the knowledge-base file.
    pub fingerprint: String,
    /// Number of documents in the index after the operation.
    pub document_count: usize,
}

pub struct IndexService {
    config: Config,
    embedder: Arc<Embedder>,
    vectordb: Arc<VectorDb>,
    cache: Arc<SearchCache>,
}

impl IndexService {
    pub fn new(
        config: Config,
        embedder: Arc<Embedder>,
        vectordb: Arc<VectorDb>,
        cache: Arc<SearchCache>,
    ) -> Self {
        Self {
            config,
            embedder,
            vectordb,
            cache,
        }
    }

    /// Compute the current fingerprint of the knowledge-base file.
    pub fn corpus_fingerprint(&self) -> Result<String, AppError> {
        let bytes = std::fs::read(&self.config.debug_cases_path).map_err(|e| {
            AppError::Config(format!(
                "failed to read {}: {e}",
                self.config.debug_cases_path
            ))
        })?;
        Ok(fingerprint_bytes(&bytes))
    }

    /// Check whether a rebuild is needed: the table is missing, or the
    /// knowledge-base fingerprint differs from the one recorded at the last
    /// rebuild. Without Redis the recorded fingerprint is absent and the
    /// index is rebuilt at startup.
    pub async fn needs_rebuild(&self) -> Result<bool, AppError> {
        if !self.vectordb.table_exists(SearchEngine::table_name()).await? {
            info!("vector table missing, rebuild needed");
            return Ok(true);
        }

        let current = self.corpus_fingerprint()?;
        match self.cache.get_corpus_fingerprint().await {
            Some(recorded) if recorded == current => Ok(false),
            _ => Ok(true),
        }
    }

    /// Ensure the index exists and matches the loaded corpus. Fatal at
    /// startup if the table cannot be established.
    pub async fn ensure(&self, corpus: &Corpus) -> Result<(), AppError> {
        if self.needs_rebuild().await? {
            info!("building document index (first run or knowledge base changed)");
            let outcome = self.rebuild(corpus).await?;
            info!(
                documents = outcome.document_count,
                fingerprint = %outcome.fingerprint,
                "index build complete"
            );
        } else {
            info!("document index up to date");
        }

        if !self.vectordb.table_exists(SearchEngine::table_name()).await? {
            return Err(AppError::IndexUnavailable(format!(
                "table '{}' missing after index build",
                SearchEngine::table_name()
            )));
        }
        Ok(())
    }

    /// Perform a full rebuild: render, embed, replace the LanceDB table,
    /// invalidate caches, and record the new fingerprint.
    pub async fn rebuild(&self, corpus: &Corpus) -> Result<RebuildOutcome, AppError> {
        let fingerprint = self.corpus_fingerprint()?;
        let documents = corpus::render_documents(corpus);
        info!(documents = documents.len(), "rendering complete, embedding documents");

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;

        if embeddings.len() != documents.len() {
            return Err(AppError::Common(CommonError::Embedding(format!(
                "embedding count mismatch: expected {}, got {}",
                documents.len(),
                embeddings.len()
            ))));
        }

        let batch = build_record_batch(&documents, &embeddings)?;
        let schema = batch.schema();
        self.vectordb
            .create_or_replace_table(SearchEngine::table_name(), schema, vec![batch])
            .await?;

        self.cache.invalidate_all().await;
        self.cache.set_corpus_fingerprint(&fingerprint).await;

        Ok(RebuildOutcome {
            rebuilt: true,
            fingerprint,
            document_count: documents.len(),
        })
    }

    /// Re-read the knowledge-base file and rebuild if it changed (or the
    /// table is missing). Returns the reloaded corpus when a rebuild
    /// occurred, so the caller can swap its in-memory state.
    pub async fn refresh(&self) -> Result<(RebuildOutcome, Option<Corpus>), AppError> {
        let path = std::path::Path::new(&self.config.debug_cases_path);
        let corpus = corpus::load_corpus(path)?;

        if !self.needs_rebuild().await? {
            let fingerprint = self.corpus_fingerprint()?;
            info!(fingerprint = %fingerprint, "knowledge base unchanged, skipping rebuild");
            return Ok((
                RebuildOutcome {
                    rebuilt: false,
                    fingerprint,
                    document_count: corpus::render_documents(&corpus).len(),
                },
                None,
            ));
        }

        let outcome = self.rebuild(&corpus).await?;
        info!(
            documents = outcome.document_count,
            fingerprint = %outcome.fingerprint,
            "index rebuilt"
        );
        Ok((outcome, Some(corpus)))
    }
}

/// SHA-256 hex digest of the knowledge-base bytes.
fn fingerprint_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Build an Arrow RecordBatch from rendered documents and their embeddings.
fn build_record_batch(
    documents: &[Document],
    embeddings: &[Vec<f32>],
) -> Result<RecordBatch, AppError> {
    let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    let platforms: Vec<&str> = documents.iter().map(|d| d.platform.label()).collect();
    let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();

    let id_array: ArrayRef = Arc::new(StringArray::from(ids));
    let platform_array: ArrayRef = Arc::new(StringArray::from(platforms));
    let text_array: ArrayRef = Arc::new(StringArray::from(texts));

    // Embedding column as FixedSizeList<Float32>
    let flat_values: Vec<f32> = embeddings.iter().flat_map(|e| e.iter().copied()).collect();
    let values_array = Float32Array::from(flat_values);
    let embedding_array: ArrayRef = Arc::new(
        FixedSizeListArray::try_new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            EMBEDDING_DIM,
            Arc::new(values_array),
            None,
        )
        .map_err(|e| {
            AppError::Common(CommonError::VectorDb(format!(
                "failed to build embedding array: {e}"
            )))
        })?,
    );

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("platform", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIM,
            ),
            false,
        ),
    ]));

    RecordBatch::try_new(
        schema,
        vec![id_array, platform_array, text_array, embedding_array],
    )
    .map_err(|e| {
        AppError::Common(CommonError::VectorDb(format!(
            "failed to build record batch: {e}"
        )))
    })
}
