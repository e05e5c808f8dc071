//! Ordered, deduplicated turn log for one session.
//!
//! Turns arrive from two redundant paths: the server-push event channel and
//! the polling snapshot fallback. The two paths interleave arbitrarily, so
//! both merge entry points are idempotent and order-independent in their
//! cumulative effect; whichever path delivers a turn first wins nothing and
//! loses nothing.

use std::collections::HashSet;

use uuid::Uuid;

use crate::types::Turn;

/// Append-mostly log of turns, totally ordered by `(created_at, id)` and
/// unique by id, plus the resume cursor for the event channel.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    cursor: Option<Uuid>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Id of the last turn by log order, used to resume the event channel
    /// without redelivery. Tracks "latest by order", not "latest received".
    pub fn cursor(&self) -> Option<Uuid> {
        self.cursor
    }

    /// Merge a single pushed turn. Duplicate ids are a no-op; out-of-order
    /// arrivals insert at their sorted position without advancing the
    /// cursor past turns already seen.
    pub fn merge_turn(&mut self, turn: Turn) -> bool {
        if self.turns.iter().any(|t| t.id == turn.id) {
            return false;
        }

        let key = turn.sort_key();
        let index = self.turns.partition_point(|t| t.sort_key() < key);
        let becomes_last = index == self.turns.len();
        self.turns.insert(index, turn);
        if becomes_last {
            self.cursor = self.turns.last().map(|t| t.id);
        }
        true
    }

    /// Replace the log wholesale with a snapshot. Input order does not
    /// matter; the result is sorted, deduplicated, and the cursor is
    /// recomputed from the new last element.
    pub fn replace_all(&mut self, mut turns: Vec<Turn>) {
        turns.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut seen = HashSet::with_capacity(turns.len());
        turns.retain(|t| seen.insert(t.id));

        self.cursor = turns.last().map(|t| t.id);
        self.turns = turns;
    }

    /// Drop everything, including the cursor. Used when switching sessions.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.cursor = None;
    }
}
