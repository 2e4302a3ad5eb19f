//! Bounded undo history of full editor snapshots

use image::RgbaImage;
use std::collections::VecDeque;

/// Number of snapshots kept before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 10;

/// A deep copy of the editor state that an undo restores.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub image: RgbaImage,
    pub block_size: u32,
    pub color_count: usize,
}

/// LIFO stack of snapshots with a capacity bound.
///
/// Pushing onto a full store drops the oldest snapshot first, so the store
/// behaves as a stack at the newest end and a queue at the oldest.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding at most `capacity` snapshots (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
