//! Per-card learning progress derived from review history

use serde::{Deserialize, Serialize};

use super::models::ReviewRecord;

/// Number of most recent reviews considered by the mastery score
pub const MASTERY_WINDOW: usize = 10;

/// Learning stage of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryLevel {
    #[default]
    New,
    Learning,
    Review,
    Mastered,
}

impl MasteryLevel {
    pub fn from_score(score: u8, total_reviews: usize) -> Self {
        if score >= 90 {
            Self::Mastered
        } else if score >= 70 {
            Self::Review
        } else if total_reviews > 0 {
            Self::Learning
        } else {
            Self::New
        }
    }
}

/// Percentage of correct answers over the last `MASTERY_WINDOW` reviews.
///
/// `records` must be in chronological order.
pub fn mastery_score(records: &[ReviewRecord]) -> u8 {
    let recent = &records[records.len().saturating_sub(MASTERY_WINDOW)..];
    if recent.is_empty() {
        return 0;
    }

    let correct = recent.iter().filter(|r| r.was_correct).count();
    (correct as f64 / recent.len() as f64 * 100.0).round() as u8
}

/// Summary of a card's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total_reviews: usize,
    pub correct_reviews: usize,
    pub mastery_score: u8,
    pub level: MasteryLevel,
}

impl Progress {
    pub fn from_history(records: &[ReviewRecord]) -> Self {
        let score = mastery_score(records);
        Self {
            total_reviews: records.len(),
            correct_reviews: records.iter().filter(|r| r.was_correct).count(),
            mastery_score: score,
            level: MasteryLevel::from_score(score, records.len()),
        }
    }
}
