//! SM-2 Spaced Repetition Algorithm
//!
//! Pure update rule for a card's scheduling state. Nothing in here reads the
//! clock or touches shared state: the caller passes `now` and receives a new
//! value.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing answer, remembered
//! - 2: Incorrect, but answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::{Result, SchedulerError};
use super::models::{ResponseRating, Scheduling};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor of a card that has never been reviewed
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Upper bound on a scheduled interval (100 years)
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

/// A validated SM-2 quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: i32) -> Result<Self> {
        if (0..=5).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SchedulerError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> i32 {
        self.0 as i32
    }

    /// Whether this counts as a qualifying review (quality >= 3)
    pub fn is_passing(self) -> bool {
        self.0 >= 3
    }
}

impl TryFrom<i32> for Quality {
    type Error = SchedulerError;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for i32 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}

impl From<ResponseRating> for Quality {
    fn from(rating: ResponseRating) -> Self {
        Self(rating.quality() as u8)
    }
}

/// EF' = max(1.3, EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)))
pub fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let miss = (5 - quality.value()) as f64;
    (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR)
}

/// Calculate the next scheduling state using the SM-2 algorithm
///
/// # Arguments
/// * `state` - Current scheduling state
/// * `quality` - Validated quality rating
/// * `now` - Moment of the review; the new due date is `now + interval days`
///
/// # Returns
/// A new `Scheduling`; `state` is left untouched
pub fn calculate_next_review(state: &Scheduling, quality: Quality, now: DateTime<Utc>) -> Scheduling {
    // Evaluated on every call, lapses included, from the pre-update factor
    let ease_factor = next_ease_factor(state.ease_factor, quality);

    let (interval, repetitions) = if quality.is_passing() {
        let interval = match state.repetitions {
            0 => 1,
            1 => 6,
            _ => round_interval(state.interval as f64 * ease_factor),
        };
        (interval, state.repetitions + 1)
    } else {
        (1, 0)
    };

    Scheduling {
        ease_factor,
        interval,
        repetitions,
        next_review: now + Duration::days(interval),
    }
}

/// Round half away from zero, keeping the result within `1..=MAX_INTERVAL_DAYS`
fn round_interval(days: f64) -> i64 {
    // `as` saturates, so huge products land on the cap instead of wrapping
    (days.round() as i64).clamp(1, MAX_INTERVAL_DAYS)
}

/// Calculate the preview intervals for each rating
/// Used to show learners what interval each button would give
pub fn preview_intervals(state: &Scheduling, now: DateTime<Utc>) -> [(ResponseRating, i64); 4] {
    [
        ResponseRating::Again,
        ResponseRating::Hard,
        ResponseRating::Good,
        ResponseRating::Easy,
    ]
    .map(|rating| (rating, calculate_next_review(state, rating.into(), now).interval))
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i64) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn scheduling(ease_factor: f64, interval: i64, repetitions: u32) -> Scheduling {
        Scheduling {
            ease_factor,
            interval,
            repetitions,
            next_review: now(),
        }
    }

    fn q(value: i32) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn test_quality_range() {
        for value in 0..=5 {
            assert_eq!(Quality::new(value).unwrap().value(), value);
        }
        assert_eq!(Quality::new(-1), Err(SchedulerError::InvalidQuality(-1)));
        assert_eq!(Quality::new(6), Err(SchedulerError::InvalidQuality(6)));
    }

    #[test]
    fn test_first_review_correct() {
        let state = scheduling(2.5, 1, 0);
        let result = calculate_next_review(&state, q(4), now());

        assert_eq!(result.interval, 1);
        assert_eq!(result.repetitions, 1);
        assert!((result.ease_factor - 2.5).abs() < 1e-9);
        assert_eq!(result.next_review, now() + Duration::days(1));
    }

    #[test]
    fn test_second_review_correct() {
        let state = scheduling(2.5, 1, 1);
        let result = calculate_next_review(&state, q(3), now());

        assert_eq!(result.interval, 6);
        assert_eq!(result.repetitions, 2);
    }

    #[test]
    fn test_subsequent_review_correct() {
        let state = scheduling(2.5, 6, 2);
        let result = calculate_next_review(&state, q(5), now());

        assert!((result.ease_factor - 2.6).abs() < 1e-9);
        // 6 * 2.6 = 15.6
        assert_eq!(result.interval, 16);
        assert_eq!(result.repetitions, 3);
        assert_eq!(result.next_review, now() + Duration::days(16));
    }

    #[test]
    fn test_subsequent_interval_uses_updated_ease_factor() {
        let state = scheduling(2.5, 10, 4);
        let result = calculate_next_review(&state, q(3), now());

        // EF' = 2.5 + (0.1 - 2 * (0.08 + 2 * 0.02)) = 2.36
        assert!((result.ease_factor - 2.36).abs() < 1e-9);
        assert_eq!(result.interval, (10.0 * result.ease_factor).round() as i64);
        assert_eq!(result.interval, 24);
    }

    #[test]
    fn test_review_incorrect_resets() {
        let state = scheduling(2.0, 10, 4);
        let result = calculate_next_review(&state, q(1), now());

        assert_eq!(result.interval, 1);
        assert_eq!(result.repetitions, 0);
        assert!((result.ease_factor - 1.46).abs() < 1e-9);
        assert_eq!(result.next_review, now() + Duration::days(1));
    }

    #[test]
    fn test_update_is_pure() {
        let state = scheduling(2.5, 6, 2);
        let before = state.clone();
        let _ = calculate_next_review(&state, q(0), now());
        assert_eq!(state, before);
    }

    #[test]
    fn test_ease_factor_minimum() {
        let state = scheduling(1.4, 10, 5);
        let result = calculate_next_review(&state, q(0), now());
        assert_eq!(result.ease_factor, MIN_EASE_FACTOR);

        let again = calculate_next_review(&result, q(0), now());
        assert_eq!(again.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_ease_factor_floor_over_random_sequences() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..20 {
            let mut state = scheduling(DEFAULT_EASE_FACTOR, 1, 0);
            for _ in 0..1_500 {
                let quality = q(rng.gen_range(0..=5));
                let prev = state.clone();
                state = calculate_next_review(&state, quality, now());

                assert!(state.ease_factor >= MIN_EASE_FACTOR);
                assert!(state.interval >= 1 && state.interval <= MAX_INTERVAL_DAYS);
                if quality.is_passing() {
                    assert_eq!(state.repetitions, prev.repetitions + 1);
                } else {
                    assert_eq!(state.repetitions, 0);
                    assert_eq!(state.interval, 1);
                }
            }
        }
    }

    #[test]
    fn test_lapse_resets_regardless_of_prior_state() {
        for quality in 0..3 {
            for repetitions in [0, 1, 2, 9] {
                let state = scheduling(3.1, 120, repetitions);
                let result = calculate_next_review(&state, q(quality), now());
                assert_eq!(result.repetitions, 0);
                assert_eq!(result.interval, 1);
            }
        }
    }

    #[test]
    fn test_interval_capped() {
        let state = scheduling(4.0, MAX_INTERVAL_DAYS, 30);
        let result = calculate_next_review(&state, q(5), now());
        assert_eq!(result.interval, MAX_INTERVAL_DAYS);
    }

    #[test]
    fn test_preview_intervals() {
        let state = scheduling(2.5, 6, 2);
        let preview = preview_intervals(&state, now());

        assert_eq!(preview[0], (ResponseRating::Again, 1));
        // hard = quality 2, also a lapse
        assert_eq!(preview[1], (ResponseRating::Hard, 1));
        // good = quality 3: EF 2.36, 6 * 2.36 = 14.16
        assert_eq!(preview[2], (ResponseRating::Good, 14));
        assert_eq!(preview[3], (ResponseRating::Easy, 16));
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }
}
