//! Spaced-repetition scheduling engine
//!
//! This module provides:
//! - SM-2 update rule (pure, in `algorithm`)
//! - Due-date priority index
//! - Prefix trie for card text lookup
//! - `Scheduler`, which owns card state and keeps both indexes consistent
//! - Mastery progress derived from review history

pub mod algorithm;
pub mod due_index;
mod engine;
mod error;
pub mod models;
pub mod prefix_index;
pub mod progress;

pub use algorithm::Quality;
pub use due_index::{DueEntry, DueIndex};
pub use engine::Scheduler;
pub use error::{Result, SchedulerError};
pub use models::*;
pub use prefix_index::PrefixIndex;
pub use progress::{MasteryLevel, Progress};
