//! Rolling conversation history: ordered, append-only, process-lifetime.

/// Formats one completed exchange as stored in [`History`].
pub fn format_exchange(question: &str, answer: &str) -> String {
    format!("User: {}\nPsychologist: {}", question, answer)
}

/// Ordered sequence of rendered exchanges. Never reordered or deduplicated; no capacity bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    /// Most recent entry; the only one the turn prompt sees.
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
