use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::app::App;
use crate::core::constants::RECONNECT_DELAY;
use crate::core::message::WireMessage;
use crate::core::scrollback::EntryKind;
use crate::link::ConnectionState;
use crate::utils::notify::Notifier;

/// Receive-side link: independent reconnect loop feeding inbound frames into
/// the scrollback buffer.
pub struct ReceiveLink {
    url: String,
    identity: String,
    app: Arc<Mutex<App>>,
    notifier: Arc<dyn Notifier>,
    notify_enabled: bool,
    state: ConnectionState,
}

impl ReceiveLink {
    pub fn new(
        url: impl Into<String>,
        identity: impl Into<String>,
        app: Arc<Mutex<App>>,
        notifier: Arc<dyn Notifier>,
        notify_enabled: bool,
    ) -> Self {
        Self {
            url: url.into(),
            identity: identity.into(),
            app,
            notifier,
            notify_enabled,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            self.state = ConnectionState::Connecting;
            match connect_async(self.url.as_str()).await {
                Ok((mut ws, _)) => {
                    self.state = ConnectionState::Connected;
                    self.notice(format!("connected to {}", self.url)).await;

                    loop {
                        let frame = tokio::select! {
                            _ = cancel.cancelled() => return,
                            frame = ws.next() => frame,
                        };
                        match frame {
                            Some(Ok(Message::Text(payload))) => {
                                self.handle_frame(payload.as_str()).await;
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                self.notice("ws error: connection closed; reconnecting in 2s")
                                    .await;
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(err)) => {
                                self.notice(format!("ws error: {err}; reconnecting in 2s"))
                                    .await;
                                break;
                            }
                        }
                    }
                }
                Err(err) => {
                    self.notice(format!("ws error: {err}; reconnecting in 2s"))
                        .await;
                }
            }

            self.state = ConnectionState::Disconnected;
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }
    }

    /// Append one inbound frame to scrollback. Malformed payloads are
    /// discarded without surfacing anything to the user.
    async fn handle_frame(&self, payload: &str) {
        let Some(message) = WireMessage::parse(payload) else {
            debug!("dropped malformed frame");
            return;
        };

        let own = message.sender == self.identity;
        let kind = if own { EntryKind::Own } else { EntryKind::Peer };
        {
            let mut app = self.app.lock().await;
            app.append_inbound(kind, message.display_line());
        }

        if self.notify_enabled && !own {
            let notifier = Arc::clone(&self.notifier);
            let sender = message.sender.clone();
            tokio::spawn(async move {
                notifier.notify(&sender).await;
            });
        }
    }

    async fn notice(&self, text: impl AsRef<str>) {
        self.app.lock().await.notice(text);
    }
}
