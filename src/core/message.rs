use serde::{Deserialize, Serialize};

/// The only payload shape the relay accepts or emits: one JSON object per
/// websocket frame carrying a sender name and a line of text. There is no
/// identifier, timestamp, or sequence number; ordering is arrival order at
/// the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub sender: String,
    pub text: String,
}

impl WireMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }

    /// Parse a frame payload. Anything that is not a JSON object carrying
    /// string `sender` and `text` fields is rejected; extra fields are
    /// tolerated on input but never survive re-serialization.
    pub fn parse(payload: &str) -> Option<WireMessage> {
        serde_json::from_str(payload).ok()
    }

    /// Canonical two-field serialization used on the wire.
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The scrollback rendering of this message.
    pub fn display_line(&self) -> String {
        format!("{}: {}", self.sender, self.text)
    }
}
