use super::*;
use crate::api::quiz::FALLBACK_QUESTION;
use crate::api::test_support::ScriptedBackend;
use crate::core::app::App;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

const VALID_QUIZ: &str = "Q: Largest ocean?\nA) Atlantic\nB) Pacific\nC) Indian\nD) Arctic";

struct Harness {
    processor: CommandProcessor,
    app: Arc<Mutex<App>>,
    send_ready: mpsc::UnboundedReceiver<String>,
}

fn harness(identity: &str, primary: ScriptedBackend, fallback: ScriptedBackend) -> Harness {
    let app = Arc::new(Mutex::new(App::new(identity)));
    let (tx, rx) = mpsc::unbounded_channel();
    let processor = CommandProcessor::new(
        identity,
        Arc::new(primary),
        Arc::new(fallback),
        Arc::clone(&app),
        tx,
    );
    Harness {
        processor,
        app,
        send_ready: rx,
    }
}

async fn scrollback_lines(app: &Arc<Mutex<App>>) -> Vec<String> {
    let app = app.lock().await;
    app.scrollback
        .visible_window(100, 0)
        .iter()
        .map(|entry| entry.text.clone())
        .collect()
}

#[tokio::test]
async fn plain_text_is_forwarded_verbatim() {
    let mut h = harness("ana", ScriptedBackend::failing("unused"), ScriptedBackend::failing("unused"));
    h.processor.handle("hello".to_string()).await;
    assert_eq!(h.send_ready.try_recv().unwrap(), "hello");
}

#[tokio::test]
async fn unknown_commands_fall_through_to_verbatim_forwarding() {
    let mut h = harness("ana", ScriptedBackend::failing("unused"), ScriptedBackend::failing("unused"));
    h.processor.handle("/dance all night".to_string()).await;
    assert_eq!(h.send_ready.try_recv().unwrap(), "/dance all night");
    assert!(scrollback_lines(&h.app).await.is_empty());
}

#[tokio::test]
async fn summary_is_denied_for_the_quiz_host() {
    let mut h = harness("madhav", ScriptedBackend::failing("unused"), ScriptedBackend::failing("unused"));
    h.processor.handle("/summary foo".to_string()).await;
    let lines = scrollback_lines(&h.app).await;
    assert_eq!(lines, vec!["[system] /summary is not allowed for 'madhav'."]);
    assert!(h.send_ready.try_recv().is_err());
}

#[tokio::test]
async fn quiz_is_restricted_to_its_host() {
    let mut h = harness("ana", ScriptedBackend::failing("unused"), ScriptedBackend::failing("unused"));
    h.processor.handle("/quiz math".to_string()).await;
    let lines = scrollback_lines(&h.app).await;
    assert_eq!(lines, vec!["[system] /quiz is restricted to 'madhav'."]);
    assert!(h.send_ready.try_recv().is_err());
}

#[tokio::test]
async fn quiz_defaults_its_topic_and_mirrors_the_result() {
    let mut h = harness(
        "madhav",
        ScriptedBackend::always(VALID_QUIZ),
        ScriptedBackend::failing("unused"),
    );
    h.processor.handle("/quiz".to_string()).await;

    let lines = scrollback_lines(&h.app).await;
    assert_eq!(lines[0], "[system] generating quiz on 'general knowledge' ...");
    assert!(lines[1].starts_with("madhav: Q: Largest ocean?"));
    assert_eq!(h.send_ready.try_recv().unwrap(), VALID_QUIZ);
}

#[tokio::test]
async fn quiz_still_sends_the_fallback_when_replies_are_junk() {
    let mut h = harness(
        "madhav",
        ScriptedBackend::always("no quiz here"),
        ScriptedBackend::failing("unused"),
    );
    h.processor.handle("/quiz history".to_string()).await;
    assert_eq!(h.send_ready.try_recv().unwrap(), FALLBACK_QUESTION);
}

#[tokio::test]
async fn quiz_transport_errors_produce_a_notice_and_send_nothing() {
    let mut h = harness(
        "madhav",
        ScriptedBackend::failing("connection refused"),
        ScriptedBackend::failing("unused"),
    );
    h.processor.handle("/quiz history".to_string()).await;
    let lines = scrollback_lines(&h.app).await;
    assert_eq!(lines.last().unwrap(), "[system] quiz failed: connection refused");
    assert!(h.send_ready.try_recv().is_err());
}

#[tokio::test]
async fn summary_requires_an_argument() {
    let mut h = harness("ana", ScriptedBackend::failing("unused"), ScriptedBackend::failing("unused"));
    h.processor.handle("/summary".to_string()).await;
    let lines = scrollback_lines(&h.app).await;
    assert_eq!(lines, vec!["[system] usage: /summary <text>"]);
    assert!(h.send_ready.try_recv().is_err());
}

#[tokio::test]
async fn summary_mirrors_and_enqueues_generated_text() {
    let mut h = harness(
        "ana",
        ScriptedBackend::always("- the gist"),
        ScriptedBackend::failing("unused"),
    );
    h.processor
        .handle("/summary a very long story".to_string())
        .await;

    let lines = scrollback_lines(&h.app).await;
    assert_eq!(lines[0], "[system] summarizing ...");
    assert_eq!(lines[1], "ana: - the gist");
    assert_eq!(h.send_ready.try_recv().unwrap(), "- the gist");
}

#[tokio::test]
async fn summary_reports_failure_when_both_backends_are_down() {
    let mut h = harness(
        "ana",
        ScriptedBackend::failing("down"),
        ScriptedBackend::failing("also down"),
    );
    h.processor.handle("/summary story".to_string()).await;
    let lines = scrollback_lines(&h.app).await;
    assert_eq!(lines.last().unwrap(), "[system] summary failed: also down");
    assert!(h.send_ready.try_recv().is_err());
}

#[test]
fn classification_covers_the_table() {
    assert!(matches!(classify("ana", "hello"), Submission::Forward(_)));
    assert!(matches!(classify("ana", "/"), Submission::Forward(_)));
    assert!(matches!(classify("ana", "/xyz"), Submission::Forward(_)));
    assert!(matches!(
        classify("madhav", "/quiz rust"),
        Submission::Invoke { .. }
    ));
    assert!(matches!(classify("ana", "/quiz rust"), Submission::Denied(_)));
    assert!(matches!(
        classify("madhav", "/summary text"),
        Submission::Denied(_)
    ));
    assert!(matches!(
        classify("ana", "/SUMMARY text"),
        Submission::Invoke { .. }
    ));
}
