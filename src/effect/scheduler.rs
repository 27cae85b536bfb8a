//! Maps trigger events onto "spawn model K", cycling through the model list.

use crate::error::FireworksError;

/// Ordered model identifiers plus a wrapping index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCursor {
    models: Vec<String>,
    index: usize,
}

impl ModelCursor {
    /// Cursor at index 0.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidOptions`] for an empty list.
    pub fn new(models: Vec<String>) -> Result<Self, FireworksError> {
        if models.is_empty() {
            return Err(FireworksError::InvalidOptions(
                "model list is empty".into(),
            ));
        }
        Ok(Self { models, index: 0 })
    }

    /// Model the next spawn will use.
    pub fn current(&self) -> &str {
        &self.models[self.index]
    }

    /// Current index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// All models, in spawn order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Return the current model and step the index, wrapping to 0 after the
    /// last entry.
    pub fn advance(&mut self) -> String {
        let model = self.models[self.index].clone();
        self.index = (self.index + 1) % self.models.len();
        model
    }
}

/// One spawn request, from trigger until it resolves into an instance or a
/// dropped failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpawnTicket {
    /// Monotonic request number.
    pub id: u64,
    /// Model to load.
    pub model: String,
}

/// Turns trigger events into spawn tickets.
///
/// There is no debouncing: every trigger produces a ticket and advances the
/// cursor, even if earlier tickets have not resolved yet.
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    cursor: ModelCursor,
    next_ticket: u64,
}

impl SpawnScheduler {
    /// Scheduler over the given cursor.
    pub fn new(cursor: ModelCursor) -> Self {
        Self {
            cursor,
            next_ticket: 0,
        }
    }

    /// Handle one trigger event.
    pub fn trigger(&mut self) -> SpawnTicket {
        let model = self.cursor.advance();
        let ticket = SpawnTicket {
            id: self.next_ticket,
            model,
        };
        self.next_ticket += 1;
        ticket
    }

    /// The model cursor.
    pub fn cursor(&self) -> &ModelCursor {
        &self.cursor
    }
}
