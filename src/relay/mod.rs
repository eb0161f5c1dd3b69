//! The broadcast relay: accepts websocket connections, validates inbound
//! frames, and fans each valid message out to every registered connection.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::core::constants::{KEEPALIVE_INTERVAL, KEEPALIVE_TIMEOUT};
use crate::core::message::WireMessage;

pub type PeerId = u64;

/// Registry of currently open connections. Membership changes only on accept
/// and on receive-loop termination, never from the send path.
#[derive(Default)]
pub struct ClientRegistry {
    peers: Mutex<HashMap<PeerId, mpsc::UnboundedSender<Message>>>,
    next_id: AtomicU64,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, outbound: mpsc::UnboundedSender<Message>) -> PeerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.peers.lock().await.insert(id, outbound);
        id
    }

    pub async fn remove(&self, id: PeerId) {
        self.peers.lock().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.peers.lock().await.len()
    }

    /// Snapshot the current membership and attempt delivery to every member.
    /// Each failure is isolated and changes nothing: a peer whose write side
    /// is broken stays registered until its own receive loop ends. Returns
    /// the number of deliveries accepted.
    pub async fn broadcast(&self, payload: &str) -> usize {
        let snapshot: Vec<(PeerId, mpsc::UnboundedSender<Message>)> = {
            let peers = self.peers.lock().await;
            peers.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let mut delivered = 0;
        for (id, tx) in snapshot {
            match tx.send(Message::Text(payload.to_string())) {
                Ok(()) => delivered += 1,
                Err(_) => debug!("delivery to peer {id} failed"),
            }
        }
        delivered
    }
}

/// Validate one inbound payload and produce the canonical broadcast form.
/// Anything that does not carry string `sender` and `text` fields is dropped
/// by returning `None`; extra fields never survive.
pub fn canonical_frame(payload: &str) -> Option<String> {
    let message = WireMessage::parse(payload)?;
    message.to_wire().ok()
}

/// Build the relay router; exposed separately from [`serve`] so tests can
/// bind an ephemeral port.
pub fn router(registry: Arc<ClientRegistry>) -> Router {
    Router::new().route("/", get(ws_handler)).with_state(registry)
}

/// Run the relay until an external interrupt. Per-connection errors never
/// terminate the accept loop.
pub async fn serve(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(ClientRegistry::new());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");

    axum::serve(
        listener,
        router(registry).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
    info!("shutdown requested");
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(registry): State<Arc<ClientRegistry>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, registry, addr))
}

async fn handle_socket(socket: WebSocket, registry: Arc<ClientRegistry>, addr: SocketAddr) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let peer_id = registry.add(tx.clone()).await;
    info!("peer {peer_id} connected from {addr}");

    // Writer: drain the outbound channel into the socket. Exits when the
    // channel closes or the sink errors; the peer stays registered either
    // way until its receive loop ends.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut keepalive = tokio::time::interval(KEEPALIVE_INTERVAL);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            _ = keepalive.tick() => {
                if last_seen.elapsed() > KEEPALIVE_INTERVAL + KEEPALIVE_TIMEOUT {
                    debug!("peer {peer_id} keepalive expired");
                    break;
                }
                // Ping failures are ignored here: a broken write side alone
                // never unregisters a peer.
                let _ = tx.send(Message::Ping(Vec::new()));
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(payload))) => {
                    last_seen = Instant::now();
                    match canonical_frame(&payload) {
                        Some(wire) => {
                            // The next frame from this peer is not read until
                            // every delivery attempt has settled.
                            registry.broadcast(&wire).await;
                        }
                        None => debug!("peer {peer_id}: dropped malformed frame"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => last_seen = Instant::now(),
                Some(Err(err)) => {
                    debug!("peer {peer_id} receive error: {err}");
                    break;
                }
            },
        }
    }

    registry.remove(peer_id).await;
    drop(tx);
    let _ = writer.await;
    info!("peer {peer_id} disconnected");
}
