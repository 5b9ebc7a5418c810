/// Context assembly and prompt construction for the summarization call.
///
/// The prompt template is a format contract: the answer formatter downstream
/// expects the model to emit one "ACTION HEADING: detail" step per line, and
/// the instruction wording here is what makes that happen. Keep the template
/// byte-for-byte stable.
use crate::model::RetrievedDocument;

/// Hard cap on documents entering the prompt context, independent of how many
/// the index returns. This bounds prompt size per query.
pub const MAX_CONTEXT_DOCUMENTS: usize = 3;

const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Join the text of up to [`MAX_CONTEXT_DOCUMENTS`] hits, best match first.
pub fn build_context(hits: &[RetrievedDocument]) -> String {
    let count = hits.len().min(MAX_CONTEXT_DOCUMENTS);
    hits[..count]
        .iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Render the summarization prompt from the assembled context and user query.
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "You are a hardware debugging assistant for educational robotics platforms.

Extract ONLY the SOLUTIONS from the context below and format them clearly.

FORMATTING RULES:
1. Each solution step should be on a NEW LINE
2. Start each step with the ACTION HEADING in UPPERCASE followed by colon
3. Do NOT number the steps (numbering will be added automatically)
4. Keep each step concise and actionable
5. Do NOT add any introductions, greetings, or extra text
6. ONLY extract solutions, nothing else

Context:
{context}

User Issue:
{query}

Solutions (one per line):"
    )
}
