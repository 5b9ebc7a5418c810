/// Post-processing of raw model completions into the final answer text.
///
/// The numbering heuristic is deliberate: a line is a new solution step only
/// when the text before its first colon is entirely uppercase (the format the
/// prompt instructs the model to emit). Lines that don't match pass through
/// unchanged, tolerating minor model deviation instead of discarding content.
/// Do not "improve" the predicate; downstream rendering depends on it.
use crate::platform::Platform;

const SOLUTIONS_HEADER: &str = "## 🔧 Step-by-Step Solutions:\n\n";
const FOOTER: &str = "\n\n---\n\n💡 **Need More Help?**\n\nIf the issue persists, contact the debugging team via QnA WhatsApp group.";

/// True when the text before the line's first colon has at least one cased
/// character and none of them lowercase. Digits, spaces, and punctuation are
/// allowed in the heading.
fn is_step_heading(line: &str) -> bool {
    let Some((prefix, _)) = line.split_once(':') else {
        return false;
    };
    prefix.chars().any(char::is_uppercase) && !prefix.chars().any(char::is_lowercase)
}

/// Number the solution steps in a raw completion. Each heading line becomes
/// `\n**<n>. <line>**` with a 1-based counter; empty lines are dropped,
/// everything else passes through verbatim. Lines are joined with newline.
pub fn format_solutions(raw: &str) -> String {
    let mut formatted = Vec::new();
    let mut counter = 1;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_step_heading(line) {
            formatted.push(format!("\n**{counter}. {line}**"));
            counter += 1;
        } else {
            formatted.push(line.to_string());
        }
    }

    formatted.join("\n")
}

/// Assemble the final answer: platform banner (when detected), guideline
/// block, numbered solutions, and the escalation footer.
pub fn assemble_answer(platform: Platform, guidelines: &str, completion: &str) -> String {
    let mut answer = String::new();

    if platform != Platform::General {
        answer.push_str(&format!(
            "## 🎯 Detected Platform: **{}**\n\n",
            platform.banner_name()
        ));
    }

    if !guidelines.is_empty() {
        answer.push_str(guidelines);
        answer.push_str("---\n\n");
    }

    answer.push_str(SOLUTIONS_HEADER);
    answer.push_str(&format_solutions(completion));
    answer.push_str(FOOTER);

    answer
}
