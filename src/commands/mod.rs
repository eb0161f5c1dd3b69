//! Slash-command interception between raw submissions and the send queue.
//!
//! Everything the user types flows through [`CommandProcessor`]: recognized
//! commands run a generation step and mirror their output locally before it
//! is enqueued for the relay; everything else is forwarded verbatim.

mod registry;

#[cfg(test)]
mod tests;

pub use registry::{all_commands, find_command, Access, Command, QUIZ_HOST};

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{quiz, summarize, Generator};
use crate::core::app::App;
use crate::core::scrollback::EntryKind;

#[derive(Clone, Copy)]
pub enum CommandKind {
    Quiz,
    Summary,
}

/// Outcome of classifying one raw submission.
pub enum Submission {
    /// Forward verbatim, including unknown `/`-prefixed text.
    Forward(String),
    /// Access denied; the submission is consumed with a local notice.
    Denied(String),
    Invoke {
        command: &'static Command,
        args: String,
    },
}

/// Classify one submission against the command table. Text that starts with
/// the command sigil but matches no known command falls through to a
/// verbatim forward.
pub fn classify(identity: &str, input: &str) -> Submission {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return Submission::Forward(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return Submission::Forward(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match find_command(command_name) {
        Some(command) if !command.access.permits(identity) => {
            Submission::Denied(command.access.denial_notice(command.name))
        }
        Some(command) => Submission::Invoke {
            command,
            args: args.to_string(),
        },
        None => Submission::Forward(input.to_string()),
    }
}

/// Pipeline stage reading raw submissions and writing network-ready text.
pub struct CommandProcessor {
    identity: String,
    primary: Arc<dyn Generator>,
    fallback: Arc<dyn Generator>,
    app: Arc<Mutex<App>>,
    send_ready: mpsc::UnboundedSender<String>,
}

impl CommandProcessor {
    pub fn new(
        identity: impl Into<String>,
        primary: Arc<dyn Generator>,
        fallback: Arc<dyn Generator>,
        app: Arc<Mutex<App>>,
        send_ready: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            primary,
            fallback,
            app,
            send_ready,
        }
    }

    pub async fn run(self, mut raw: mpsc::UnboundedReceiver<String>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                submission = raw.recv() => match submission {
                    Some(text) => self.handle(text).await,
                    None => break,
                },
            }
        }
        debug!("command pipeline stopped");
    }

    pub async fn handle(&self, text: String) {
        match classify(&self.identity, &text) {
            Submission::Forward(text) => {
                let _ = self.send_ready.send(text);
            }
            Submission::Denied(notice) => self.notice(notice).await,
            Submission::Invoke { command, args } => match command.kind {
                CommandKind::Quiz => self.run_quiz(args).await,
                CommandKind::Summary => self.run_summary(command, args).await,
            },
        }
    }

    async fn run_quiz(&self, args: String) {
        let topic = if args.is_empty() {
            "general knowledge".to_string()
        } else {
            args
        };
        self.notice(format!("generating quiz on '{topic}' ..."))
            .await;
        match quiz::generate_quiz(self.primary.as_ref(), &topic).await {
            Ok(quiz) => self.mirror_and_send(quiz).await,
            Err(err) => self.notice(format!("quiz failed: {err}")).await,
        }
    }

    async fn run_summary(&self, command: &Command, args: String) {
        if args.is_empty() {
            self.notice(format!("usage: {}", command.usage)).await;
            return;
        }
        self.notice("summarizing ...").await;
        match summarize(self.primary.as_ref(), self.fallback.as_ref(), &args).await {
            Ok(summary) => self.mirror_and_send(summary).await,
            Err(err) => self.notice(format!("summary failed: {err}")).await,
        }
    }

    /// Echo generated output locally under the local identity, then hand it
    /// to the send queue.
    async fn mirror_and_send(&self, text: String) {
        {
            let mut app = self.app.lock().await;
            let line = format!("{}: {}", self.identity, text);
            app.append(EntryKind::Own, line);
        }
        let _ = self.send_ready.send(text);
    }

    async fn notice(&self, text: impl AsRef<str>) {
        self.app.lock().await.notice(text);
    }
}
