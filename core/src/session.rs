use crate::types::Turn;

/// Number of most recent turns a client forwards with each request.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// In-memory conversation history, oldest turn first.
///
/// The whole history is kept for the life of the process; callers transmit
/// only a bounded window of it.
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    turns: Vec<Turn>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end of the history. Role alternation is not checked.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The last `min(limit, len)` turns, in chronological order.
    pub fn recent_window(&self, limit: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(limit);
        &self.turns[start..]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
