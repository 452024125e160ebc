pub mod models;

use models::{KnowledgeEntry, TranscriptMessage};

/// Ordered, append-only collection of knowledge entries.
#[derive(Debug, Default)]
pub struct DocumentStore {
    entries: Vec<KnowledgeEntry>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: KnowledgeEntry) {
        self.entries.push(entry);
    }

    /// Snapshot of the entries in insertion order.
    pub fn list(&self) -> Vec<KnowledgeEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append-only chat log.
///
/// At most one message may be provisional at a time. A provisional message is
/// swapped for its final version in place by [`Transcript::resolve_provisional`],
/// so readers never observe both versions.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<TranscriptMessage>,
    provisional: Option<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: TranscriptMessage) {
        self.messages.push(message);
    }

    /// Append a placeholder and mark it provisional. Any earlier provisional
    /// message is committed as-is.
    pub fn push_provisional(&mut self, message: TranscriptMessage) {
        self.provisional = Some(self.messages.len());
        self.messages.push(message);
    }

    /// Replace the provisional message with its outcome. Without a pending
    /// placeholder the outcome is appended.
    pub fn resolve_provisional(&mut self, message: TranscriptMessage) {
        match self.provisional.take() {
            Some(index) => self.messages[index] = message,
            None => self.messages.push(message),
        }
    }

    #[cfg(test)]
    pub fn has_provisional(&self) -> bool {
        self.provisional.is_some()
    }

    pub fn messages(&self) -> Vec<TranscriptMessage> {
        self.messages.clone()
    }

    /// Messages from `start` onwards; empty when `start` is past the end.
    pub fn since(&self, start: usize) -> Vec<TranscriptMessage> {
        self.messages.get(start..).map(<[_]>::to_vec).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
