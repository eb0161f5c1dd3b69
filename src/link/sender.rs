use std::sync::Arc;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::app::App;
use crate::core::constants::{JOIN_ANNOUNCEMENT, RECONNECT_DELAY, SEND_POLL_INTERVAL};
use crate::core::message::WireMessage;
use crate::link::ConnectionState;

/// Send-side link: owns one websocket at a time and drains the network-bound
/// queue into it. Items that fail to send go back onto the queue tail before
/// the link tears down and reconnects.
pub struct SendLink {
    url: String,
    identity: String,
    app: Arc<Mutex<App>>,
    state: ConnectionState,
}

impl SendLink {
    pub fn new(url: impl Into<String>, identity: impl Into<String>, app: Arc<Mutex<App>>) -> Self {
        Self {
            url: url.into(),
            identity: identity.into(),
            app,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Reconnect loop: every failure waits the fixed delay and tries again,
    /// forever, until cancelled.
    pub async fn run(
        mut self,
        queue_tx: mpsc::UnboundedSender<String>,
        mut queue_rx: mpsc::UnboundedReceiver<String>,
        cancel: CancellationToken,
    ) {
        loop {
            self.state = ConnectionState::Connecting;
            match connect_async(self.url.as_str()).await {
                Ok((mut ws, _)) => {
                    self.state = ConnectionState::Connected;
                    debug!("send link connected to {}", self.url);

                    // Announce once per successful connection, best effort.
                    if let Ok(frame) =
                        WireMessage::new(&self.identity, JOIN_ANNOUNCEMENT).to_wire()
                    {
                        let _ = ws.send(Message::text(frame)).await;
                    }

                    let outcome = self.drain(&mut ws, &queue_tx, &mut queue_rx, &cancel).await;
                    let _ = ws.close(None).await;
                    match outcome {
                        Ok(()) => break,
                        Err(err) => {
                            self.notice(format!("send loop: {err}; reconnecting in 2s"))
                                .await;
                        }
                    }
                }
                Err(err) => {
                    self.notice(format!("send loop: {err}; reconnecting in 2s"))
                        .await;
                }
            }

            self.state = ConnectionState::Disconnected;
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }
        debug!("send link stopped");
    }

    /// Pump the queue into the socket until something breaks. The queue is
    /// polled with a short bound so teardown stays responsive; the socket is
    /// read (and discarded) so keepalive pings are answered.
    async fn drain<S>(
        &mut self,
        ws: &mut S,
        queue_tx: &mpsc::UnboundedSender<String>,
        queue_rx: &mut mpsc::UnboundedReceiver<String>,
        cancel: &CancellationToken,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        S: Sink<Message, Error = WsError> + Stream<Item = Result<Message, WsError>> + Unpin,
    {
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }
            tokio::select! {
                inbound = ws.next() => match inbound {
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => return Err("connection closed".into()),
                },
                polled = timeout(SEND_POLL_INTERVAL, queue_rx.recv()) => {
                    let item = match polled {
                        Err(_) => continue,
                        Ok(None) => return Ok(()),
                        Ok(Some(item)) => item,
                    };
                    let frame = WireMessage::new(&self.identity, item.as_str()).to_wire()?;
                    if let Err(err) = ws.send(Message::text(frame)).await {
                        // Back onto the tail; submissions queued meanwhile
                        // will now send first. Accepted reordering.
                        let _ = queue_tx.send(item);
                        return Err(err.into());
                    }
                }
            }
        }
    }

    async fn notice(&self, text: impl AsRef<str>) {
        self.app.lock().await.notice(text);
    }
}
