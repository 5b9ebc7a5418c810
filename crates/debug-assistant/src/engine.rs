/// Query pipeline: retrieval, platform classification, summarization, and
/// answer assembly.
///
/// `ask` is the boundary the server calls. It never fails; errors are
/// rendered into the answer text so one bad query cannot take a session
/// down with it.
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppError;
use crate::format;
use crate::guidelines;
use crate::model::Corpus;
use crate::platform::{self, Platform};
use crate::prompt;
use crate::search::SearchEngine;
use assistant_common::completion::{
    ChatCompletionRequest, CompletionClient, CompletionError, Message,
};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 600;
const TOP_P: f32 = 0.9;

pub struct AnswerEngine {
    search: Arc<SearchEngine>,
    client: CompletionClient,
    model: String,
}

impl AnswerEngine {
    pub fn new(search: Arc<SearchEngine>, client: CompletionClient, model: String) -> Self {
        Self {
            search,
            client,
            model,
        }
    }

    /// Answer a query, rendering any failure as a user-visible error string.
    pub async fn ask(&self, query: &str, corpus: &Corpus) -> (String, Platform) {
        match self.answer(query, corpus).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "query failed");
                (render_failure(&e), platform::classify(query))
            }
        }
    }

    async fn answer(&self, query: &str, corpus: &Corpus) -> Result<(String, Platform), AppError> {
        let hits = self
            .search
            .search(query, prompt::MAX_CONTEXT_DOCUMENTS)
            .await?;
        let platform = platform::classify(query);
        info!(
            platform = platform.label(),
            hits = hits.len(),
            "answering query"
        );

        let guidelines = guidelines::compose(corpus, platform);
        let context = prompt::build_context(&hits);
        let request = completion_request(&self.model, prompt::build_prompt(&context, query));

        let response = self.client.chat_completions(&request).await?;
        let completion = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok((
            format::assemble_answer(platform, &guidelines, &completion),
            platform,
        ))
    }
}

fn completion_request(model: &str, prompt: String) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![Message {
            role: "user".to_string(),
            content: prompt,
        }],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
        top_p: TOP_P,
    }
}

fn render_failure(err: &AppError) -> String {
    match err {
        AppError::Completion(CompletionError::Upstream { status, body }) => {
            format!("❌ API Error: {} - {}", status.as_u16(), body)
        }
        other => format!("❌ Error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GuidelineGroup, GuidelineKind, PlatformSection};
    use assistant_common::completion::StatusCode;

    #[test]
    fn test_pipeline_stages_for_microbit_query() {
        let corpus = Corpus {
            general_guidelines: vec!["Check cables first".to_string()],
            sections: vec![PlatformSection {
                platform: Platform::Microbit,
                guideline_groups: vec![GuidelineGroup {
                    kind: GuidelineKind::InitialSetup,
                    entries: vec!["Use a data USB cable".to_string()],
                }],
                cases: vec![],
            }],
            ticket_process: None,
            support_team: None,
        };

        let query = "my microbit won't show up via webusb";
        let detected = platform::classify(query);
        assert_eq!(detected, Platform::Microbit);

        let guideline_text = guidelines::compose(&corpus, detected);
        let answer = format::assemble_answer(detected, &guideline_text, "CHECK CABLE: reseat USB");

        assert!(answer.starts_with("## 🎯 Detected Platform: **Microbit**\n\n"));
        let setup_pos = answer.find("## 🔧 Micro:bit Initial Setup:").unwrap();
        let solutions_pos = answer.find("## 🔧 Step-by-Step Solutions:").unwrap();
        assert!(setup_pos < solutions_pos);
        assert!(answer.contains("**1. CHECK CABLE: reseat USB**"));
        assert!(answer
            .ends_with("If the issue persists, contact the debugging team via QnA WhatsApp group."));
    }

    #[test]
    fn test_render_failure_upstream_shows_status_code() {
        let err = AppError::Completion(CompletionError::Upstream {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "rate limit reached".to_string(),
        });
        assert_eq!(render_failure(&err), "❌ API Error: 429 - rate limit reached");
    }

    #[test]
    fn test_render_failure_other_errors() {
        let err = AppError::IndexUnavailable("table missing".to_string());
        let rendered = render_failure(&err);
        assert!(rendered.starts_with("❌ Error: "));
        assert!(rendered.contains("table missing"));
    }

    #[test]
    fn test_completion_request_sampling_parameters() {
        let request = completion_request("llama-3.3-70b-versatile", "prompt body".to_string());

        assert_eq!(request.model, "llama-3.3-70b-versatile");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.messages[0].content, "prompt body");
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 600);
        assert_eq!(request.top_p, 0.9);
    }
}
