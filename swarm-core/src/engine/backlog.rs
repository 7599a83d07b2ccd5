//! Bounded FIFO of unsolicited lines awaiting dispatch

use heapless::Deque;
use swarm_protocol::{EventKind, Line};

/// A retained line and where it sits in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogEntry {
    /// Arrival sequence number
    pub seq: u32,
    /// The raw line, validated again on replay
    pub line: Line,
    /// Observer slot the line will be dispatched to
    pub kind: EventKind,
}

/// Fixed-capacity backlog
///
/// Full means evict: the oldest entry makes room for the newest and is
/// handed back so the loss can be reported.
#[derive(Debug, Clone, Default)]
pub struct Backlog<const N: usize> {
    entries: Deque<BacklogEntry, N>,
}

impl<const N: usize> Backlog<N> {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Append an entry, returning the one evicted to make room
    pub fn offer(&mut self, entry: BacklogEntry) -> Option<BacklogEntry> {
        let evicted = if self.entries.is_full() {
            self.entries.pop_front()
        } else {
            None
        };
        // Cannot fail: a slot was freed above if needed
        let _ = self.entries.push_back(entry);
        evicted
    }

    /// Remove and return the oldest entry
    pub fn take_oldest(&mut self) -> Option<BacklogEntry> {
        self.entries.pop_front()
    }

    /// Keep only entries matching `keep`, preserving order
    ///
    /// Returns how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&BacklogEntry) -> bool) -> usize {
        let mut removed = 0;
        for _ in 0..self.entries.len() {
            if let Some(entry) = self.entries.pop_front() {
                if keep(&entry) {
                    let _ = self.entries.push_back(entry);
                } else {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Iterate oldest first
    pub fn iter(&self) -> impl Iterator<Item = &BacklogEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
