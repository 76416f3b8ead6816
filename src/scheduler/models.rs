//! Data models for the scheduling engine

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::{DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR};

/// Normalize card text or a search prefix for the prefix index
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// SM-2 scheduling fields of a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduling {
    /// SM-2 ease factor (default 2.5, never below 1.3)
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Current interval in days
    #[serde(default = "default_interval")]
    pub interval: i64,
    /// Consecutive qualifying reviews since the last lapse
    #[serde(default)]
    pub repetitions: u32,
    /// When the card is next due
    #[serde(default = "Utc::now")]
    pub next_review: DateTime<Utc>,
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

fn default_interval() -> i64 {
    1
}

impl Scheduling {
    /// Fresh scheduling state, immediately due at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: default_interval(),
            repetitions: 0,
            next_review: now,
        }
    }

    /// Repair values that violate the engine invariants.
    ///
    /// Records coming from storage are not trusted: the ease factor is raised
    /// to the floor and the interval to one day where needed.
    pub fn sanitized(mut self, card_id: Uuid) -> Self {
        if self.ease_factor.is_nan() || self.ease_factor < MIN_EASE_FACTOR {
            log::warn!(
                "Card {} has ease factor {} below the floor, clamping to {}",
                card_id,
                self.ease_factor,
                MIN_EASE_FACTOR
            );
            self.ease_factor = MIN_EASE_FACTOR;
        }
        if self.interval < 1 {
            log::warn!("Card {} has interval {}, raising to 1 day", card_id, self.interval);
            self.interval = 1;
        }
        self
    }
}

/// Review statistics tracked per card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStats {
    #[serde(default)]
    pub times_reviewed: u32,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub incorrect_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    /// Running mean of the supplied response times, in seconds
    #[serde(default)]
    pub average_response_time: f64,
}

impl CardStats {
    /// Record one review.
    ///
    /// The running mean uses the post-increment review count. Samples that
    /// are missing, negative or not finite leave the mean unchanged.
    pub fn record(&mut self, was_correct: bool, response_time: Option<f64>, now: DateTime<Utc>) {
        self.times_reviewed += 1;
        if was_correct {
            self.correct_count += 1;
        } else {
            self.incorrect_count += 1;
        }
        self.last_reviewed = Some(now);

        if let Some(sample) = response_time.filter(|t| t.is_finite() && *t >= 0.0) {
            let n = self.times_reviewed as f64;
            self.average_response_time = (self.average_response_time * (n - 1.0) + sample) / n;
        }
    }
}

/// Canonical scheduling record for one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    pub id: Uuid,
    /// Lower-cased, trimmed text used by the prefix index
    pub search_text: String,
    pub scheduling: Scheduling,
    #[serde(default)]
    pub stats: CardStats,
}

impl CardState {
    /// Check if the card is due at `now`
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.scheduling.next_review <= now
    }

    /// Heuristic mastery: at least 3 repetitions with an ease factor of 2.5 or more
    pub fn is_mastered(&self) -> bool {
        self.scheduling.repetitions >= 3 && self.scheduling.ease_factor >= DEFAULT_EASE_FACTOR
    }
}

/// A card entering the engine, either freshly authored or loaded from storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub id: Uuid,
    /// Front text of the card; normalized before indexing
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<Scheduling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CardStats>,
}

impl NewCard {
    pub fn new(id: Uuid, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            scheduling: None,
            stats: None,
        }
    }

    pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
        self.scheduling = Some(scheduling);
        self
    }

    pub fn with_stats(mut self, stats: CardStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Build the canonical state, filling in defaults for missing fields
    pub(crate) fn into_state(self, now: DateTime<Utc>) -> CardState {
        let scheduling = self
            .scheduling
            .map(|s| s.sanitized(self.id))
            .unwrap_or_else(|| Scheduling::new(now));
        CardState {
            id: self.id,
            search_text: normalize_text(&self.text),
            scheduling,
            stats: self.stats.unwrap_or_default(),
        }
    }
}

impl From<CardState> for NewCard {
    fn from(state: CardState) -> Self {
        Self {
            id: state.id,
            text: state.search_text,
            scheduling: Some(state.scheduling),
            stats: Some(state.stats),
        }
    }
}

/// A review submitted for a card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    /// Quality rating (0-5, SM-2 scale)
    pub quality: i32,
    /// Response time in seconds, if measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    pub was_correct: bool,
}

impl ReviewSubmission {
    /// Submission whose correctness follows the quality (>= 3 is correct)
    pub fn new(quality: i32) -> Self {
        Self {
            quality,
            response_time: None,
            was_correct: quality >= 3,
        }
    }

    pub fn with_response_time(mut self, seconds: f64) -> Self {
        self.response_time = Some(seconds);
        self
    }

    pub fn with_correct(mut self, was_correct: bool) -> Self {
        self.was_correct = was_correct;
        self
    }
}

/// A record of a single review attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub card_id: Uuid,
    /// Quality rating (0-5, SM-2 scale)
    /// 0 = complete blackout
    /// 1 = incorrect, but recognized
    /// 2 = incorrect, but easy to recall
    /// 3 = correct with difficulty
    /// 4 = correct with hesitation
    /// 5 = perfect response
    pub quality: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    pub was_correct: bool,
    /// When the review occurred
    pub reviewed_at: DateTime<Utc>,
}

/// Result of applying a review: the updated card and the history entry for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub card: CardState,
    pub record: ReviewRecord,
}

/// Aggregate statistics across all cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_cards: usize,
    pub due_cards: usize,
    pub mastered_cards: usize,
    pub average_ease_factor: f64,
    /// Fraction of correct reviews in `[0, 1]`
    pub retention_rate: f64,
}

/// Self-assessment buttons shown to the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseRating {
    Again,
    Hard,
    Good,
    Easy,
}

impl ResponseRating {
    /// SM-2 quality for this rating
    pub fn quality(self) -> i32 {
        match self {
            Self::Again => 0,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 5,
        }
    }

    /// Parse a rating name, falling back to `Good` for anything unknown
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::Good)
    }
}

impl fmt::Display for ResponseRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        };
        f.write_str(name)
    }
}

impl FromStr for ResponseRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            other => Err(format!("unknown rating '{}'", other)),
        }
    }
}

/// Learner level, used to size study sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl StudyLevel {
    /// Recommended number of cards per session, capped by what exists
    pub fn session_size(self, total_cards: usize) -> usize {
        let size = match self {
            Self::Beginner => 10,
            Self::Intermediate => 20,
            Self::Advanced => 30,
        };
        size.min(total_cards)
    }
}

impl FromStr for StudyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!("unknown study level '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_new_card_defaults() {
        let now = at(0);
        let state = NewCard::new(Uuid::new_v4(), "  Hola Mundo ").into_state(now);

        assert_eq!(state.search_text, "hola mundo");
        assert_eq!(state.scheduling.ease_factor, 2.5);
        assert_eq!(state.scheduling.interval, 1);
        assert_eq!(state.scheduling.repetitions, 0);
        assert_eq!(state.scheduling.next_review, now);
        assert!(state.is_due_at(now));
        assert_eq!(state.stats, CardStats::default());
    }

    #[test]
    fn test_loaded_scheduling_is_sanitized() {
        let scheduling = Scheduling {
            ease_factor: 0.9,
            interval: 0,
            repetitions: 2,
            next_review: at(0),
        };
        let state = NewCard::new(Uuid::new_v4(), "gato")
            .with_scheduling(scheduling)
            .into_state(at(10));

        assert_eq!(state.scheduling.ease_factor, 1.3);
        assert_eq!(state.scheduling.interval, 1);
        assert_eq!(state.scheduling.repetitions, 2);
        assert_eq!(state.scheduling.next_review, at(0));
    }

    #[test]
    fn test_stats_running_mean() {
        let mut stats = CardStats::default();
        stats.record(true, Some(4.0), at(0));
        stats.record(false, Some(2.0), at(1));
        stats.record(true, None, at(2));

        assert_eq!(stats.times_reviewed, 3);
        assert_eq!(stats.correct_count, 2);
        assert_eq!(stats.incorrect_count, 1);
        assert_eq!(stats.last_reviewed, Some(at(2)));
        assert!((stats.average_response_time - 3.0).abs() < 1e-9);

        stats.record(true, Some(7.0), at(3));
        // (3.0 * 3 + 7.0) / 4
        assert!((stats.average_response_time - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_ignores_invalid_samples() {
        let mut stats = CardStats::default();
        stats.record(true, Some(-1.0), at(0));
        stats.record(true, Some(f64::NAN), at(1));

        assert_eq!(stats.times_reviewed, 2);
        assert_eq!(stats.average_response_time, 0.0);
    }

    #[test]
    fn test_missing_scheduling_fields_deserialize_to_defaults() {
        let json = r#"{"nextReview":"2024-01-01T00:00:00Z"}"#;
        let scheduling: Scheduling = serde_json::from_str(json).unwrap();

        assert_eq!(scheduling.ease_factor, 2.5);
        assert_eq!(scheduling.interval, 1);
        assert_eq!(scheduling.repetitions, 0);
    }

    #[test]
    fn test_response_rating_quality() {
        assert_eq!(ResponseRating::Again.quality(), 0);
        assert_eq!(ResponseRating::Hard.quality(), 2);
        assert_eq!(ResponseRating::Good.quality(), 3);
        assert_eq!(ResponseRating::Easy.quality(), 5);
        assert_eq!("EASY".parse::<ResponseRating>(), Ok(ResponseRating::Easy));
        assert_eq!(ResponseRating::parse_lenient("meh"), ResponseRating::Good);
    }

    #[test]
    fn test_session_size() {
        assert_eq!(StudyLevel::Beginner.session_size(50), 10);
        assert_eq!(StudyLevel::Intermediate.session_size(50), 20);
        assert_eq!(StudyLevel::Advanced.session_size(50), 30);
        assert_eq!(StudyLevel::Advanced.session_size(7), 7);
    }

    #[test]
    fn test_mastered_heuristic() {
        let mut state = NewCard::new(Uuid::new_v4(), "perro").into_state(at(0));
        assert!(!state.is_mastered());

        state.scheduling.repetitions = 3;
        assert!(state.is_mastered());

        state.scheduling.ease_factor = 2.4;
        assert!(!state.is_mastered());
    }
}
