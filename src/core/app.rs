use crate::core::scrollback::{EntryKind, ScrollbackBuffer, ScrollbackEntry};

/// Client runtime state shared between the input loop and the link tasks.
///
/// The scroll offset counts lines above the tail: 0 follows new arrivals,
/// anything greater pins the viewport until the user scrolls back down.
pub struct App {
    pub identity: String,
    pub scrollback: ScrollbackBuffer,
    pub input: String,
    pub scroll_offset: usize,
    dirty: bool,
}

impl App {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            scrollback: ScrollbackBuffer::new(),
            input: String::new(),
            scroll_offset: 0,
            dirty: true,
        }
    }

    /// Append a locally-generated line and request a redraw.
    pub fn append(&mut self, kind: EntryKind, text: impl Into<String>) {
        self.scrollback.append(ScrollbackEntry::new(kind, text));
        self.dirty = true;
    }

    /// Append a line that arrived over the receive link. The redraw is only
    /// requested while the viewer follows the tail; a pinned viewport stays
    /// untouched until the viewer scrolls back down.
    pub fn append_inbound(&mut self, kind: EntryKind, text: impl Into<String>) {
        self.scrollback.append(ScrollbackEntry::new(kind, text));
        if self.scroll_offset == 0 {
            self.dirty = true;
        }
    }

    /// Append a system notice.
    pub fn notice(&mut self, text: impl AsRef<str>) {
        let line = format!("[system] {}", text.as_ref());
        self.append(EntryKind::System, line);
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Consume the pending-redraw flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Scroll one line away from the tail, clamped to the buffer top.
    pub fn scroll_up(&mut self, viewport_height: usize) {
        self.scroll_offset = self
            .scrollback
            .clamp_offset(viewport_height, self.scroll_offset + 1);
        self.dirty = true;
    }

    /// Scroll one line toward the tail; reaching 0 resumes auto-follow.
    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
        self.dirty = true;
    }
}
