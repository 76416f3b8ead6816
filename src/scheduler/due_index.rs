//! Due-date priority index
//!
//! A min-heap of `(next_review, card id)` entries. The heap never stores card
//! state, only keys into the scheduler's canonical map.
//!
//! Keys are never changed in place. Re-inserting a card bumps its sequence
//! number and leaves the old heap entry behind as a stale entry; `live` maps
//! each indexed card to the sequence number of its one valid entry. Stale
//! entries are discarded whenever they reach the top of the heap, so the top
//! is always live and `peek` stays O(1). When stale entries pile up the heap
//! is compacted.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Extra stale entries tolerated before compaction is considered
const COMPACTION_SLACK: usize = 64;

/// A card's position in the due ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueEntry {
    pub card_id: Uuid,
    pub next_review: DateTime<Utc>,
    seq: u64,
}

impl Ord for DueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earlier due date first; ties go to the earlier insertion
        self.next_review
            .cmp(&other.next_review)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for DueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
pub struct DueIndex {
    heap: BinaryHeap<Reverse<DueEntry>>,
    live: HashMap<Uuid, u64>,
    next_seq: u64,
    compaction_ratio: usize,
}

impl Default for DueIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DueIndex {
    pub fn new() -> Self {
        Self::with_compaction_ratio(2)
    }

    /// Compact once stale entries exceed `ratio` times the live entries
    pub fn with_compaction_ratio(ratio: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            next_seq: 0,
            compaction_ratio: ratio.max(1),
        }
    }

    /// Index a card at `next_review`, invalidating any entry it already had
    pub fn insert(&mut self, card_id: Uuid, next_review: DateTime<Utc>) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.live.insert(card_id, seq);
        self.heap.push(Reverse(DueEntry {
            card_id,
            next_review,
            seq,
        }));

        self.settle();
        self.maybe_compact();
    }

    /// Earliest live entry, without removing it
    pub fn peek_earliest(&self) -> Option<&DueEntry> {
        self.heap.peek().map(|Reverse(entry)| entry)
    }

    /// Remove and return the earliest live entry
    pub fn extract_earliest(&mut self) -> Option<DueEntry> {
        let Reverse(entry) = self.heap.pop()?;
        self.live.remove(&entry.card_id);
        self.settle();
        Some(entry)
    }

    /// Extract entries due at or before `now`, earliest first, up to `limit`
    pub fn drain_due(&mut self, limit: usize, now: DateTime<Utc>) -> Vec<DueEntry> {
        let mut drained = Vec::new();

        while drained.len() < limit {
            match self.peek_earliest() {
                Some(entry) if entry.next_review <= now => {}
                _ => break,
            }
            if let Some(entry) = self.extract_earliest() {
                drained.push(entry);
            }
        }

        drained
    }

    /// Put back an entry returned by `extract_earliest` or `drain_due`,
    /// keeping its original position among entries with the same due date.
    /// Does nothing if the card has been indexed again since.
    pub fn restore(&mut self, entry: DueEntry) {
        if self.live.contains_key(&entry.card_id) {
            return;
        }
        self.live.insert(entry.card_id, entry.seq);
        self.heap.push(Reverse(entry));
    }

    /// Drop a card from the ordering. Returns false if it was not indexed.
    pub fn remove(&mut self, card_id: &Uuid) -> bool {
        if self.live.remove(card_id).is_none() {
            return false;
        }
        self.settle();
        self.maybe_compact();
        true
    }

    pub fn contains(&self, card_id: &Uuid) -> bool {
        self.live.contains_key(card_id)
    }

    /// Number of cards currently indexed
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Heap entries that no longer belong to any indexed card
    pub fn stale_len(&self) -> usize {
        self.heap.len() - self.live.len()
    }

    fn is_live(live: &HashMap<Uuid, u64>, entry: &DueEntry) -> bool {
        live.get(&entry.card_id) == Some(&entry.seq)
    }

    /// Pop stale entries until the top of the heap is live
    fn settle(&mut self) {
        while let Some(Reverse(top)) = self.heap.peek() {
            if Self::is_live(&self.live, top) {
                break;
            }
            self.heap.pop();
        }
    }

    fn maybe_compact(&mut self) {
        if self.stale_len() <= self.compaction_ratio * self.live.len() + COMPACTION_SLACK {
            return;
        }

        let before = self.heap.len();
        let live = &self.live;
        self.heap.retain(|Reverse(entry)| Self::is_live(live, entry));
        log::info!(
            "Compacted due index: {} -> {} entries",
            before,
            self.heap.len()
        );
    }
}
