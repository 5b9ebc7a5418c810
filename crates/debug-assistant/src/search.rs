/// Similarity search over the indexed knowledge base.
///
/// Embeds a query using the fastembed model, performs vector search in
/// LanceDB, and converts result batches into retrieval hits. Hits are cached
/// in Redis when available; search is deterministic for a fixed index and
/// query, so caching is invisible to callers.
use std::sync::Arc;

use arrow_array::{Float32Array, RecordBatch, StringArray};
use tracing::{info, warn};

use crate::cache::SearchCache;
use crate::error::AppError;
use crate::model::RetrievedDocument;
use assistant_common::embedding::Embedder;
use assistant_common::vectordb::VectorDb;

const VECTOR_TABLE_NAME: &str = "debug_cases";

pub struct SearchEngine {
    embedder: Arc<Embedder>,
    vectordb: Arc<VectorDb>,
    cache: Arc<SearchCache>,
}

impl SearchEngine {
    pub fn new(embedder: Arc<Embedder>, vectordb: Arc<VectorDb>, cache: Arc<SearchCache>) -> Self {
        Self {
            embedder,
            vectordb,
            cache,
        }
    }

    /// Search documents by semantic similarity to the query.
    ///
    /// Returns up to `limit` hits, best match first (lowest distance).
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, AppError> {
        if let Some(cached) = self.cache.get_search_results(query, limit).await {
            info!(query, "search cache hit");
            return Ok(cached);
        }

        let query_embedding = self.embedder.embed_query(query).await?;

        let batches = self
            .vectordb
            .search(VECTOR_TABLE_NAME, &query_embedding, limit)
            .await?;

        let hits = extract_hits(&batches);

        // Fire-and-forget cache write
        self.cache.set_search_results(query, limit, &hits).await;

        Ok(hits)
    }

    /// Returns the LanceDB table name used for the document index.
    pub fn table_name() -> &'static str {
        VECTOR_TABLE_NAME
    }
}

/// Extract retrieval hits from LanceDB search result batches.
///
/// Expected columns: id (Utf8), platform (Utf8), text (Utf8), _distance (Float32)
fn extract_hits(batches: &[RecordBatch]) -> Vec<RetrievedDocument> {
    let mut hits = Vec::new();

    for batch in batches {
        let num_rows = batch.num_rows();
        let schema = batch.schema();

        let id_col: Option<&StringArray> = get_string_column(batch, &schema, "id");
        let platform_col: Option<&StringArray> = get_string_column(batch, &schema, "platform");
        let text_col: Option<&StringArray> = get_string_column(batch, &schema, "text");
        let distance_col: Option<&Float32Array> = get_float_column(batch, &schema, "_distance");

        let (Some(id_col), Some(platform_col), Some(text_col)) = (id_col, platform_col, text_col)
        else {
            warn!("search result batch missing expected columns");
            continue;
        };

        for row in 0..num_rows {
            let distance: f32 = distance_col.map(|c| c.value(row)).unwrap_or(0.0);

            // LanceDB reports L2 distance; lower is more similar. Invert so
            // higher score = more similar, clamped at zero.
            let score: f32 = (1.0_f32 - distance).max(0.0);

            hits.push(RetrievedDocument {
                id: id_col.value(row).to_string(),
                platform: platform_col.value(row).to_string(),
                text: text_col.value(row).to_string(),
                score,
            });
        }
    }

    hits
}

fn get_string_column<'a>(
    batch: &'a RecordBatch,
    schema: &arrow_schema::Schema,
    name: &str,
) -> Option<&'a StringArray> {
    let idx = schema.index_of(name).ok()?;
    batch.column(idx).as_any().downcast_ref::<StringArray>()
}

fn get_float_column<'a>(
    batch: &'a RecordBatch,
    schema: &arrow_schema::Schema,
    name: &str,
) -> Option<&'a Float32Array> {
    let idx = schema.index_of(name).ok()?;
    batch.column(idx).as_any().downcast_ref::<Float32Array>()
}
