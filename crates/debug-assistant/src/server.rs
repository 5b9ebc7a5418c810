/// MCP server implementation for the hardware debugging assistant.
///
/// Exposes seven tools:
/// - `ask`: Diagnose a hardware issue with retrieval-backed suggestions
/// - `initial_guidelines`: Guidelines text shown before the first question
/// - `start_session` / `get_transcript` / `end_session`: Session transcripts
/// - `list_platform_cases`: Browse the known cases for one platform
/// - `rebuild_index`: Re-read the knowledge base and rebuild the vector index
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::api::{
    AskParams, AskResponse, CaseSummary, EndSessionParams, EndSessionResponse,
    GetTranscriptParams, InitialGuidelinesResponse, ListPlatformCasesParams,
    PlatformCasesResponse, RebuildIndexResponse, StartSessionResponse, TranscriptResponse,
    TranscriptTurn,
};
use crate::cache::SearchCache;
use crate::config::Config;
use crate::engine::AnswerEngine;
use crate::guidelines;
use crate::index::IndexService;
use crate::model::{Corpus, Role};
use crate::platform::Platform;
use crate::search::SearchEngine;
use crate::session::SessionStore;
use assistant_common::completion::CompletionClient;
use assistant_common::embedding::Embedder;
use assistant_common::vectordb::VectorDb;

// --- MCP Server ---

/// Shared application state, protected by RwLock so rebuild_index can swap
/// the corpus while queries keep reading.
pub struct AppState {
    pub corpus: Arc<Corpus>,
}

#[derive(Clone)]
pub struct DebugAssistantServer {
    state: Arc<RwLock<AppState>>,
    engine: Arc<AnswerEngine>,
    index_service: Arc<IndexService>,
    sessions: Arc<SessionStore>,
    tool_router: ToolRouter<DebugAssistantServer>,
}

impl DebugAssistantServer {
    pub fn new(
        corpus: Corpus,
        embedder: Arc<Embedder>,
        vectordb: Arc<VectorDb>,
        cache: Arc<SearchCache>,
        client: CompletionClient,
        config: Config,
    ) -> Self {
        let search_engine = Arc::new(SearchEngine::new(
            Arc::clone(&embedder),
            Arc::clone(&vectordb),
            Arc::clone(&cache),
        ));

        let engine = Arc::new(AnswerEngine::new(
            search_engine,
            client,
            config.groq_model.clone(),
        ));

        let index_service = Arc::new(IndexService::new(
            config,
            Arc::clone(&embedder),
            Arc::clone(&vectordb),
            Arc::clone(&cache),
        ));

        let state = Arc::new(RwLock::new(AppState {
            corpus: Arc::new(corpus),
        }));

        Self {
            state,
            engine,
            index_service,
            sessions: Arc::new(SessionStore::new()),
            tool_router: Self::tool_router(),
        }
    }

    /// Snapshot the current corpus. The read guard is released before the
    /// caller awaits anything slow.
    async fn corpus(&self) -> Arc<Corpus> {
        Arc::clone(&self.state.read().await.corpus)
    }
}

#[tool_router]
impl DebugAssistantServer {
    #[tool(description = "Diagnose a hardware issue on an educational robotics platform (micro:bit, Moonrover kit, Arduino Uno, Raspberry Pi Pico). Returns step-by-step solutions grounded in the known-case knowledge base.")]
    async fn ask(&self, Parameters(params): Parameters<AskParams>) -> Result<Json<AskResponse>, String> {
        let query = params.query.trim().to_string();
        if query.is_empty() {
            return Err("query must not be empty".to_string());
        }

        if let Some(session_id) = params.session_id.as_deref() {
            if !self.sessions.contains(session_id).await {
                return Err(format!("unknown session id: {session_id}"));
            }
        }

        let corpus = self.corpus().await;
        let (answer, platform) = self.engine.ask(&query, &corpus).await;

        if let Some(session_id) = params.session_id.as_deref() {
            self.sessions.append(session_id, Role::User, &query).await;
            self.sessions.append(session_id, Role::Assistant, &answer).await;
        }

        Ok(Json(AskResponse {
            answer,
            platform: platform.label().to_string(),
        }))
    }

    #[tool(description = "Get the general debugging guidelines students should read before asking their first question.")]
    async fn initial_guidelines(&self) -> Result<Json<InitialGuidelinesResponse>, String> {
        let corpus = self.corpus().await;
        Ok(Json(InitialGuidelinesResponse {
            text: guidelines::initial_guidelines(&corpus),
        }))
    }

    #[tool(description = "Start a debugging session. Returns a session id and a greeting containing the initial guidelines.")]
    async fn start_session(&self) -> Result<Json<StartSessionResponse>, String> {
        let corpus = self.corpus().await;
        let greeting = guidelines::initial_guidelines(&corpus);
        let session_id = self.sessions.start(&greeting).await;
        info!(session_id = %session_id, "session started");

        Ok(Json(StartSessionResponse {
            session_id,
            greeting,
        }))
    }

    #[tool(description = "Get the full transcript of a debugging session, in the order the turns happened.")]
    async fn get_transcript(
        &self,
        Parameters(params): Parameters<GetTranscriptParams>,
    ) -> Result<Json<TranscriptResponse>, String> {
        let session_id = params.session_id.trim().to_string();
        if session_id.is_empty() {
            return Err("session_id must not be empty".to_string());
        }

        let turns = self
            .sessions
            .transcript(&session_id)
            .await
            .ok_or_else(|| format!("unknown session id: {session_id}"))?;

        let turns = turns
            .into_iter()
            .map(|t| TranscriptTurn {
                role: t.role.label().to_string(),
                text: t.text,
            })
            .collect();

        Ok(Json(TranscriptResponse { turns }))
    }

    #[tool(description = "End a debugging session and discard its transcript. Returns ok=false if the session was already gone.")]
    async fn end_session(
        &self,
        Parameters(params): Parameters<EndSessionParams>,
    ) -> Result<Json<EndSessionResponse>, String> {
        let session_id = params.session_id.trim().to_string();
        if session_id.is_empty() {
            return Err("session_id must not be empty".to_string());
        }

        let ok = self.sessions.end(&session_id).await;
        Ok(Json(EndSessionResponse { ok }))
    }

    #[tool(description = "List the known debugging cases for one platform. Platforms: microbit, moonrover, arduino, raspberry_pi_pico.")]
    async fn list_platform_cases(
        &self,
        Parameters(params): Parameters<ListPlatformCasesParams>,
    ) -> Result<Json<PlatformCasesResponse>, String> {
        let label = params.platform.trim().to_lowercase();
        if label.is_empty() {
            return Err("platform must not be empty".to_string());
        }

        let corpus = self.corpus().await;
        let section = Platform::from_label(&label)
            .and_then(|p| corpus.section(p))
            .ok_or_else(|| {
                let available: Vec<&str> =
                    corpus.sections.iter().map(|s| s.platform.label()).collect();
                format!(
                    "unknown platform: '{label}'. Available platforms: {}",
                    available.join(", ")
                )
            })?;

        let cases = section
            .cases
            .iter()
            .map(|c| CaseSummary {
                id: c.id.clone(),
                title: c.title.clone(),
            })
            .collect();

        Ok(Json(PlatformCasesResponse {
            platform: section.platform.label().to_string(),
            cases,
        }))
    }

    #[tool(description = "Re-read the knowledge-base file and rebuild the vector index if its content changed. Returns whether a rebuild ran, the content fingerprint, and the document count.")]
    async fn rebuild_index(&self) -> Result<Json<RebuildIndexResponse>, String> {
        info!("rebuild_index tool invoked");

        let (outcome, new_corpus) = self
            .index_service
            .refresh()
            .await
            .map_err(|e| format!("rebuild failed: {e}"))?;

        // If rebuilt, swap the in-memory corpus
        if let Some(corpus) = new_corpus {
            let mut state = self.state.write().await;
            state.corpus = Arc::new(corpus);
            info!(
                documents = outcome.document_count,
                "in-memory corpus updated"
            );
        }

        Ok(Json(RebuildIndexResponse {
            rebuilt: outcome.rebuilt,
            fingerprint: outcome.fingerprint,
            document_count: outcome.document_count,
        }))
    }
}

#[tool_handler]
impl ServerHandler for DebugAssistantServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "debug-assistant".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Hardware debugging assistant for educational robotics platforms \
                 (micro:bit, Moonrover kit, Arduino Uno, Raspberry Pi Pico). Use ask \
                 to diagnose an issue, initial_guidelines for the pre-question \
                 checklist, start_session/get_transcript/end_session to keep a \
                 conversation transcript, list_platform_cases to browse known cases, \
                 and rebuild_index after editing the knowledge-base file."
                    .to_string(),
            ),
        }
    }
}
