use crate::error::AppError;

const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_GROQ_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded explicitly from environment variables.
///
/// No defaults are assumed for paths. Redis URL is optional; if absent, the
/// server runs without caching. The API credential is resolved separately at
/// startup and is deliberately not part of this struct.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379"). `None` disables caching.
    pub redis_url: Option<String>,
    /// Filesystem path to the LanceDB data directory.
    pub lancedb_path: String,
    /// Filesystem path to the knowledge-base JSON file.
    pub debug_cases_path: String,
    /// Base URL of the OpenAI-compatible completion endpoint.
    pub groq_base_url: String,
    /// Model identifier sent with every summarization request.
    pub groq_model: String,
    /// Per-request timeout for the summarization call, in seconds.
    pub groq_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `LANCEDB_PATH`: path to LanceDB data directory
    /// - `DEBUG_CASES_PATH`: path to the knowledge-base JSON file (must exist)
    ///
    /// Optional:
    /// - `REDIS_URL`: Redis connection string (omit to disable caching)
    /// - `GROQ_BASE_URL`, `GROQ_MODEL`, `GROQ_TIMEOUT_SECS`: endpoint overrides
    pub fn from_env() -> Result<Self, AppError> {
        let lancedb_path = std::env::var("LANCEDB_PATH").map_err(|_| {
            AppError::Config("LANCEDB_PATH environment variable is required".to_string())
        })?;

        let debug_cases_path = std::env::var("DEBUG_CASES_PATH").map_err(|_| {
            AppError::Config("DEBUG_CASES_PATH environment variable is required".to_string())
        })?;
        if !std::path::Path::new(&debug_cases_path).exists() {
            return Err(AppError::Config(format!(
                "knowledge base not found at {debug_cases_path}"
            )));
        }

        let redis_url = std::env::var("REDIS_URL").ok();

        let groq_base_url = std::env::var("GROQ_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string());
        let groq_model =
            std::env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_GROQ_MODEL.to_string());
        let groq_timeout_secs = match std::env::var("GROQ_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("GROQ_TIMEOUT_SECS must be an integer, got '{raw}'"))
            })?,
            Err(_) => DEFAULT_GROQ_TIMEOUT_SECS,
        };

        Ok(Self {
            redis_url,
            lancedb_path,
            debug_cases_path,
            groq_base_url,
            groq_model,
            groq_timeout_secs,
        })
    }
}
