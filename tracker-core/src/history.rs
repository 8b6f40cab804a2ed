//! # History Buffer Module
//!
//! A bounded, insertion-ordered ring of recent pitch estimates feeding
//! the strip chart. Once the buffer is full, each append evicts the
//! oldest entry (drop-oldest policy). Entries are never mutated after
//! insertion; the chart reads an owned snapshot.

use std::collections::VecDeque;

/// Default number of entries the chart keeps on screen.
pub const HISTORY_CAPACITY: usize = 100;

/// One charted point: the most current estimate of a completed analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    pub pitch: f32,
    pub confidence: f32,
}

/// Fixed-capacity drop-oldest FIFO of [`HistoryEntry`] values.
#[derive(Debug)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Creates an empty buffer holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry, evicting the oldest one if the buffer is full.
    /// O(1) amortized.
    pub fn append(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
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

    /// Returns the current entries, oldest first, as an owned copy for
    /// the renderer.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().copied().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: usize) -> HistoryEntry {
        HistoryEntry {
            pitch: i as f32,
            confidence: 0.5,
        }
    }

    #[test]
    fn fewer_appends_than_capacity_keep_everything() {
        let mut buffer = HistoryBuffer::new(100);
        for i in 0..42 {
            buffer.append(entry(i));
        }
        assert_eq!(buffer.len(), 42);
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot[0].pitch, 0.0);
        assert_eq!(snapshot[41].pitch, 41.0);
    }

    #[test]
    fn overflow_drops_oldest_and_keeps_arrival_order() {
        let mut buffer = HistoryBuffer::new(100);
        for i in 0..250 {
            buffer.append(entry(i));
        }
        assert_eq!(buffer.len(), 100);

        let snapshot = buffer.snapshot();
        // Exactly the last 100 entries, oldest first.
        for (offset, point) in snapshot.iter().enumerate() {
            assert_eq!(point.pitch, (150 + offset) as f32);
        }
    }

    #[test]
    fn snapshot_is_detached_from_the_buffer() {
        let mut buffer = HistoryBuffer::new(3);
        buffer.append(entry(1));
        let snapshot = buffer.snapshot();
        buffer.append(entry(2));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(buffer.len(), 2);
    }
}
