//! Scheduler: the single owner of card state
//!
//! Holds the canonical `id -> CardState` map and keeps the due index and the
//! prefix index derived from it. Both indexes store ids only, so they can be
//! rebuilt from the map at any time.
//!
//! The scheduler is not internally synchronized. Hosts sharing it between
//! threads wrap it in a `Mutex` (or give it to a single owning task), since
//! `apply_review` and `due_cards` both mutate the due index.

use std::collections::HashMap;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::algorithm::{calculate_next_review, preview_intervals, Quality};
use super::due_index::DueIndex;
use super::error::{Result, SchedulerError};
use super::models::*;
use super::prefix_index::PrefixIndex;
use crate::config::{DueMode, SchedulerConfig};

#[derive(Debug)]
pub struct Scheduler {
    cards: HashMap<Uuid, CardState>,
    due_index: DueIndex,
    prefix_index: PrefixIndex,
    config: SchedulerConfig,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            cards: HashMap::new(),
            due_index: DueIndex::with_compaction_ratio(config.compaction_ratio),
            prefix_index: PrefixIndex::new(),
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // ==================== Card Registration ====================

    /// Register a new card. Missing scheduling fields make it due immediately.
    pub fn add_card(&mut self, card: NewCard) -> Result<CardState> {
        self.add_card_at(card, Utc::now())
    }

    pub fn add_card_at(&mut self, card: NewCard, now: DateTime<Utc>) -> Result<CardState> {
        if self.cards.contains_key(&card.id) {
            return Err(SchedulerError::DuplicateId(card.id));
        }

        let state = card.into_state(now);
        self.index_card(&state);
        self.cards.insert(state.id, state.clone());

        log::debug!("Added card {} ('{}')", state.id, state.search_text);
        Ok(state)
    }

    /// Register a batch of cards, typically everything the store holds.
    ///
    /// The batch is checked for duplicate ids (against itself and against
    /// cards already registered) before anything is inserted.
    pub fn load<I>(&mut self, cards: I) -> Result<usize>
    where
        I: IntoIterator<Item = NewCard>,
    {
        self.load_at(cards, Utc::now())
    }

    pub fn load_at<I>(&mut self, cards: I, now: DateTime<Utc>) -> Result<usize>
    where
        I: IntoIterator<Item = NewCard>,
    {
        let cards: Vec<NewCard> = cards.into_iter().collect();

        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if self.cards.contains_key(&card.id) || !seen.insert(card.id) {
                return Err(SchedulerError::DuplicateId(card.id));
            }
        }

        let count = cards.len();
        self.cards.reserve(count);
        for card in cards {
            let state = card.into_state(now);
            self.index_card(&state);
            self.cards.insert(state.id, state);
        }

        log::info!("Loaded {} cards ({} total)", count, self.cards.len());
        Ok(count)
    }

    /// Evict a card from the engine and both indexes
    pub fn remove_card(&mut self, id: Uuid) -> Result<CardState> {
        let state = self.cards.remove(&id).ok_or(SchedulerError::NotFound(id))?;
        self.due_index.remove(&id);
        self.prefix_index.remove(&state.search_text, &id);

        log::debug!("Removed card {}", id);
        Ok(state)
    }

    fn index_card(&mut self, state: &CardState) {
        self.due_index.insert(state.id, state.scheduling.next_review);
        self.prefix_index.insert(&state.search_text, state.id);
    }

    // ==================== Reviews ====================

    /// Apply a review and reschedule the card
    pub fn apply_review(&mut self, id: Uuid, submission: ReviewSubmission) -> Result<ReviewOutcome> {
        self.apply_review_at(id, submission, Utc::now())
    }

    pub fn apply_review_at(
        &mut self,
        id: Uuid,
        submission: ReviewSubmission,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        // Validate everything before touching any state
        let card = self.cards.get_mut(&id).ok_or(SchedulerError::NotFound(id))?;
        let quality = Quality::new(submission.quality)?;

        card.scheduling = calculate_next_review(&card.scheduling, quality, now);
        card.stats
            .record(submission.was_correct, submission.response_time, now);

        let updated = card.clone();
        self.due_index.insert(id, updated.scheduling.next_review);

        log::debug!(
            "Reviewed card {} with quality {}: interval {}d, ease {:.2}, repetitions {}",
            id,
            quality.value(),
            updated.scheduling.interval,
            updated.scheduling.ease_factor,
            updated.scheduling.repetitions
        );

        let record = ReviewRecord {
            card_id: id,
            quality: quality.value(),
            response_time: submission.response_time,
            was_correct: submission.was_correct,
            reviewed_at: now,
        };

        Ok(ReviewOutcome {
            card: updated,
            record,
        })
    }

    /// Intervals each rating would give a card, without changing it
    pub fn preview(&self, id: Uuid, now: DateTime<Utc>) -> Result<[(ResponseRating, i64); 4]> {
        let card = self.cards.get(&id).ok_or(SchedulerError::NotFound(id))?;
        Ok(preview_intervals(&card.scheduling, now))
    }

    // ==================== Queries ====================

    /// Up to `limit` due cards, earliest first.
    ///
    /// In `DueMode::Extract` the returned cards leave the due ordering and only
    /// come back through `apply_review` or `requeue`. In `DueMode::Peek` they
    /// are restored to their original positions, so repeated calls return the
    /// same batch.
    pub fn due_cards(&mut self, limit: usize) -> Vec<CardState> {
        self.due_cards_at(limit, Utc::now())
    }

    pub fn due_cards_at(&mut self, limit: usize, now: DateTime<Utc>) -> Vec<CardState> {
        let drained = self.due_index.drain_due(limit, now);

        if self.config.due_mode == DueMode::Peek {
            for entry in &drained {
                self.due_index.restore(*entry);
            }
        }

        log::debug!("Served {} due cards ({:?} mode)", drained.len(), self.config.due_mode);

        drained
            .iter()
            .filter_map(|entry| self.cards.get(&entry.card_id))
            .cloned()
            .collect()
    }

    /// Return a card taken by `due_cards` to the due ordering, unchanged.
    /// Requeueing a card that is already queued is a no-op.
    pub fn requeue(&mut self, id: Uuid) -> Result<()> {
        let card = self.cards.get(&id).ok_or(SchedulerError::NotFound(id))?;
        if !self.due_index.contains(&id) {
            self.due_index.insert(id, card.scheduling.next_review);
            log::debug!("Requeued card {}", id);
        }
        Ok(())
    }

    /// Cards whose text starts with `prefix`, ordered by text then id
    pub fn search(&self, prefix: &str, limit: usize) -> Vec<CardState> {
        let prefix = normalize_text(prefix);
        let Some(ids) = self.prefix_index.matches(&prefix) else {
            return Vec::new();
        };

        if limit == 0 {
            return Vec::new();
        }

        let by_text = |a: &&CardState, b: &&CardState| {
            a.search_text
                .cmp(&b.search_text)
                .then_with(|| a.id.cmp(&b.id))
        };

        let mut results: Vec<&CardState> = ids.iter().filter_map(|id| self.cards.get(id)).collect();
        // Partition out the first `limit` before sorting, so wide prefixes stay linear
        if results.len() > limit {
            results.select_nth_unstable_by(limit - 1, by_text);
            results.truncate(limit);
        }
        results.sort_by(by_text);
        results.into_iter().cloned().collect()
    }

    /// Aggregate statistics, computed by a read-only scan
    pub fn statistics(&self) -> Statistics {
        self.statistics_at(Utc::now())
    }

    pub fn statistics_at(&self, now: DateTime<Utc>) -> Statistics {
        let mut stats = Statistics {
            total_cards: self.cards.len(),
            ..Default::default()
        };

        let mut ease_sum = 0.0;
        let mut correct = 0u64;
        let mut reviewed = 0u64;

        for card in self.cards.values() {
            if card.is_due_at(now) {
                stats.due_cards += 1;
            }
            if card.is_mastered() {
                stats.mastered_cards += 1;
            }
            ease_sum += card.scheduling.ease_factor;
            if card.stats.times_reviewed > 0 {
                correct += card.stats.correct_count as u64;
                reviewed += card.stats.times_reviewed as u64;
            }
        }

        if stats.total_cards > 0 {
            stats.average_ease_factor = ease_sum / stats.total_cards as f64;
        }
        if reviewed > 0 {
            stats.retention_rate = correct as f64 / reviewed as f64;
        }

        stats
    }

    pub fn get(&self, id: &Uuid) -> Option<&CardState> {
        self.cards.get(id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardState> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards currently in the due ordering
    pub fn queued_len(&self) -> usize {
        self.due_index.len()
    }

    /// Recreate both indexes from the canonical map.
    ///
    /// Every card goes back into the due ordering, including cards taken by
    /// `due_cards` and not yet reviewed.
    pub fn rebuild_indexes(&mut self) {
        self.due_index = DueIndex::with_compaction_ratio(self.config.compaction_ratio);
        self.prefix_index = PrefixIndex::new();

        let mut states: Vec<&CardState> = self.cards.values().collect();
        // Keep tie order deterministic across rebuilds
        states.sort_by_key(|s| (s.scheduling.next_review, s.id));
        for state in states {
            self.due_index.insert(state.id, state.scheduling.next_review);
            self.prefix_index.insert(&state.search_text, state.id);
        }

        log::info!("Rebuilt indexes for {} cards", self.cards.len());
    }
}
