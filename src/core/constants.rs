//! Shared timing and sizing constants used across the client and the relay.

use std::time::Duration;

/// Maximum number of live scrollback entries; the oldest entry is evicted
/// once the buffer grows past this.
pub const SCROLLBACK_CAPACITY: usize = 1000;

/// Fixed delay between reconnect attempts, both link directions.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Bounded poll on the send queue so the drain loop stays responsive to
/// connection teardown.
pub const SEND_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Total timeout for one generation backend request.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Relay-side keepalive ping cadence per connection.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(20);

/// Grace period past the ping cadence before a silent connection is closed.
pub const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(20);

/// Announcement text sent once per successful send-link connection.
pub const JOIN_ANNOUNCEMENT: &str = "[joined]";

/// Default relay endpoint for clients.
pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:8770";

/// Default listen address for the relay binary.
pub const DEFAULT_RELAY_HOST: &str = "0.0.0.0";
pub const DEFAULT_RELAY_PORT: u16 = 8770;
