use assistant_common::completion::CompletionError;
use assistant_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("corpus format error in '{section}': {message}")]
    CorpusFormat { section: String, message: String },

    #[error("index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("config error: {0}")]
    Config(String),
}
