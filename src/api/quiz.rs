//! Structured-question generation: prompt, normalization, and the fixed
//! fallback that keeps the quiz path from ever producing invalid output.

use std::collections::HashSet;

use tracing::debug;

use super::Generator;

/// Served when the backend cannot produce a valid question on either
/// attempt. Callers always receive a structurally valid quiz.
pub const FALLBACK_QUESTION: &str = "Q: Which planet is known as the Red Planet?\n\
A) Venus\n\
B) Mars\n\
C) Jupiter\n\
D) Saturn";

pub fn quiz_prompt(topic: &str, strict: bool) -> String {
    let mut prompt = format!(
        "Write exactly ONE multiple-choice question about '{topic}' in this exact format, \
each on its own line:\nQ: <question>\nA) <option A>\nB) <option B>\nC) <option C>\nD) <option D>\n\
Do NOT include the answer or any explanations. Keep all lines concise."
    );
    if strict {
        prompt.push_str(
            "\nRespond with ONLY those five lines. The question line must end with a question mark \
and every option must be different.",
        );
    }
    prompt
}

/// Ask the backend for a quiz, retrying once with the strict prompt when the
/// reply fails validation, and substituting [`FALLBACK_QUESTION`] when both
/// replies are unusable. Only a transport error surfaces as `Err`.
pub async fn generate_quiz(
    backend: &dyn Generator,
    topic: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let raw = backend.generate(&quiz_prompt(topic, false)).await?;
    if let Some(quiz) = normalize(&raw) {
        return Ok(quiz);
    }
    debug!("quiz reply failed validation, retrying with the strict prompt");
    let raw = backend.generate(&quiz_prompt(topic, true)).await?;
    Ok(normalize(&raw).unwrap_or_else(|| FALLBACK_QUESTION.to_string()))
}

/// Extract one question line and four labeled options from a backend reply.
/// Returns `None` unless the reply yields a question ending in '?' and four
/// distinct, non-empty options.
pub fn normalize(raw: &str) -> Option<String> {
    let mut question: Option<String> = None;
    let mut options: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(option) = option_from(line) {
            if options.len() < 4 && !is_placeholder(&option) && seen.insert(option.to_lowercase())
            {
                options.push(option);
            }
            continue;
        }
        if question.is_none() {
            if let Some(found) = question_from(line) {
                question = Some(found);
            }
        }
    }

    let question = question?;
    if options.len() != 4 {
        return None;
    }

    let mut quiz = format!("Q: {question}");
    for (label, option) in ['A', 'B', 'C', 'D'].iter().zip(&options) {
        quiz.push_str(&format!("\n{label}) {option}"));
    }
    Some(quiz)
}

fn question_from(line: &str) -> Option<String> {
    let line = strip_label(line, &["q:", "q.", "question:"]);
    if line.len() > 1 && line.ends_with('?') {
        Some(line.to_string())
    } else {
        None
    }
}

/// Match an `A)`-style option line, also accepting `a.` and `a:` labels.
fn option_from(line: &str) -> Option<String> {
    let mut chars = line.chars();
    let label = chars.next()?;
    let separator = chars.next()?;
    if !matches!(label.to_ascii_uppercase(), 'A'..='D') {
        return None;
    }
    if !matches!(separator, ')' | '.' | ':') {
        return None;
    }
    let remainder = chars.as_str().trim();
    if remainder.is_empty() {
        None
    } else {
        Some(remainder.to_string())
    }
}

fn is_placeholder(option: &str) -> bool {
    let lowered = option.to_lowercase();
    lowered.starts_with('<')
        || lowered.chars().all(|c| c == '.' || c == '…')
        || matches!(
            lowered.as_str(),
            "option" | "option a" | "option b" | "option c" | "option d"
        )
}

fn strip_label<'a>(line: &'a str, labels: &[&str]) -> &'a str {
    let lowered = line.to_lowercase();
    for label in labels {
        if lowered.starts_with(label) {
            return line[label.len()..].trim_start();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::super::test_support::ScriptedBackend;
    use super::*;

    #[test]
    fn normalizes_the_expected_format() {
        let raw = "Q: What is the capital of France?\nA) Paris\nB) Lyon\nC) Nice\nD) Lille\n";
        assert_eq!(
            normalize(raw).unwrap(),
            "Q: What is the capital of France?\nA) Paris\nB) Lyon\nC) Nice\nD) Lille"
        );
    }

    #[test]
    fn accepts_chatty_replies_and_alternate_labels() {
        let raw = "Sure! Here is your question.\n\nWhat color is the sky?\na. Blue\nb. Green\nc: Red\nd) Purple\nGood luck!";
        assert_eq!(
            normalize(raw).unwrap(),
            "Q: What color is the sky?\nA) Blue\nB) Green\nC) Red\nD) Purple"
        );
    }

    #[test]
    fn deduplicates_options_case_insensitively() {
        let raw = "Q: Pick one?\nA) Blue\nB) blue\nC) Red\nD) Green";
        assert!(normalize(raw).is_none());
    }

    #[test]
    fn discards_placeholder_options() {
        let raw = "Q: Pick one?\nA) <option A>\nB) Red\nC) ...\nD) Green";
        assert!(normalize(raw).is_none());
    }

    #[test]
    fn requires_a_question_mark() {
        let raw = "Q: This is not a question\nA) One\nB) Two\nC) Three\nD) Four";
        assert!(normalize(raw).is_none());
    }

    #[test]
    fn the_fallback_is_itself_valid() {
        assert_eq!(normalize(FALLBACK_QUESTION).unwrap(), FALLBACK_QUESTION);
    }

    #[tokio::test]
    async fn unparsable_replies_fall_back_deterministically() {
        let backend = ScriptedBackend::always("no usable quiz here");
        let quiz = generate_quiz(&backend, "history").await.unwrap();
        assert_eq!(quiz, FALLBACK_QUESTION);

        let question_lines: Vec<&str> = quiz.lines().filter(|l| l.ends_with('?')).collect();
        assert_eq!(question_lines.len(), 1);
        let options: Vec<&str> = quiz.lines().filter(|l| !l.ends_with('?')).collect();
        assert_eq!(options.len(), 4);
    }

    #[tokio::test]
    async fn a_valid_first_reply_skips_the_retry() {
        let backend = ScriptedBackend::new(vec![Ok(
            "Q: Largest ocean?\nA) Atlantic\nB) Pacific\nC) Indian\nD) Arctic".to_string(),
        )]);
        let quiz = generate_quiz(&backend, "geography").await.unwrap();
        assert!(quiz.starts_with("Q: Largest ocean?"));
    }

    #[tokio::test]
    async fn transport_errors_still_surface() {
        let backend = ScriptedBackend::failing("connection refused");
        let err = generate_quiz(&backend, "history").await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }
}
