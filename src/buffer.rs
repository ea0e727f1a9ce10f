/// file: src/buffer.rs
/// description: bounded, deduplicated, newest-first history of received donations
use crate::types::LiveEvent;
use std::ops::Deref;
use std::sync::Arc;

pub const DEFAULT_CAPACITY: usize = 50;

/// Immutable point-in-time view of the buffer. Cloning is cheap and a held
/// snapshot never changes when the buffer moves on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSnapshot(Arc<[Arc<LiveEvent>]>);

impl EventSnapshot {
    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|event| event.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|event| event.id == id)
    }

    pub fn total_amount(&self) -> f64 {
        self.0.iter().map(|event| event.amount).sum()
    }
}

impl Deref for EventSnapshot {
    type Target = [Arc<LiveEvent>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Added(Arc<LiveEvent>),
    Duplicate,
}

#[derive(Debug)]
pub struct EventBuffer {
    capacity: usize,
    snapshot: EventSnapshot,
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBuffer {
    /// A capacity of zero is raised to one so the newest event is always kept.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            snapshot: EventSnapshot::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn snapshot(&self) -> EventSnapshot {
        self.snapshot.clone()
    }

    /// Prepends `event` unless its id is already buffered, evicting from the
    /// tail past capacity. Duplicates keep their original position.
    pub fn insert(&mut self, event: LiveEvent) -> InsertOutcome {
        if self.snapshot.contains(&event.id) {
            return InsertOutcome::Duplicate;
        }

        let event = Arc::new(event);
        let kept = self.snapshot.len().min(self.capacity - 1);
        let mut next = Vec::with_capacity(kept + 1);
        next.push(event.clone());
        next.extend(self.snapshot.iter().take(kept).cloned());
        self.snapshot = EventSnapshot(next.into());

        InsertOutcome::Added(event)
    }

    pub fn clear(&mut self) -> EventSnapshot {
        self.snapshot = EventSnapshot::default();
        self.snapshot()
    }
}
