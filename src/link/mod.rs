//! The client's two independent links to the relay.
//!
//! Each direction owns its own websocket and its own reconnect loop; the
//! send side drains the outbound queue, the receive side feeds scrollback.
//! Neither shares a connection or state with the other.

pub mod receiver;
pub mod sender;

pub use receiver::ReceiveLink;
pub use sender::SendLink;

/// Lifecycle of one directional link. Every failure path returns to
/// `Disconnected` and retries after a fixed delay, forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}
