use std::collections::VecDeque;

use crate::core::constants::SCROLLBACK_CAPACITY;

/// Presentation class of one scrollback line. Assigned by the caller at
/// append time; the buffer itself never inspects identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    System,
    Own,
    Peer,
}

#[derive(Debug, Clone)]
pub struct ScrollbackEntry {
    pub kind: EntryKind,
    pub text: String,
}

impl ScrollbackEntry {
    pub fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Bounded, append-only store of display lines. Entries are never reordered
/// or mutated after append; the oldest entries are evicted once the buffer
/// exceeds [`SCROLLBACK_CAPACITY`].
#[derive(Debug, Default)]
pub struct ScrollbackBuffer {
    entries: VecDeque<ScrollbackEntry>,
}

impl ScrollbackBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ScrollbackEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > SCROLLBACK_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest meaningful scroll offset for the given viewport.
    pub fn max_offset(&self, viewport_height: usize) -> usize {
        self.entries.len().saturating_sub(viewport_height)
    }

    /// Clamp a requested offset to `[0, max_offset]`.
    pub fn clamp_offset(&self, viewport_height: usize, offset: usize) -> usize {
        offset.min(self.max_offset(viewport_height))
    }

    /// The entries visible in a viewport of the given height when scrolled
    /// `offset` lines above the tail (0 follows the tail).
    pub fn visible_window(&self, viewport_height: usize, offset: usize) -> Vec<&ScrollbackEntry> {
        let offset = self.clamp_offset(viewport_height, offset);
        let total = self.entries.len();
        let start = total.saturating_sub(viewport_height.saturating_add(offset));
        let end = (start + viewport_height).min(total);
        self.entries.iter().skip(start).take(end - start).collect()
    }
}
