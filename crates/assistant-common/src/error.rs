/// Error types shared across assistant crates.
///
/// These errors represent failures in infrastructure components (vector DB,
/// embeddings) that sit below the assistant itself. Application-specific
/// errors are defined in the assistant crate and wrap `CommonError` via
/// `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("vector db error: {0}")]
    VectorDb(String),

    #[error("embedding error: {0}")]
    Embedding(String),
}
