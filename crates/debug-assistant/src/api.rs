use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AskParams {
    /// The hardware issue to diagnose, in the student's own words.
    pub query: String,
    /// Session to record this exchange in (from start_session).
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AskResponse {
    pub answer: String,
    /// Detected platform label such as "microbit" or "general".
    pub platform: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InitialGuidelinesResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub greeting: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTranscriptParams {
    /// Session ID returned by start_session.
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptTurn {
    pub role: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptResponse {
    pub turns: Vec<TranscriptTurn>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EndSessionParams {
    /// Session ID returned by start_session.
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EndSessionResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListPlatformCasesParams {
    /// Platform label such as "microbit", "moonrover", "arduino" or "raspberry_pi_pico".
    pub platform: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaseSummary {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlatformCasesResponse {
    pub platform: String,
    pub cases: Vec<CaseSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RebuildIndexResponse {
    pub rebuilt: bool,
    pub fingerprint: String,
    pub document_count: usize,
}
