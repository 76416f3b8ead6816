//! Spaced-repetition scheduling for language-learning flashcards.
//!
//! The engine lives in [`scheduler`]; [`storage`] is a small JSON-file store
//! used by the command line front end.

pub mod config;
pub mod scheduler;
pub mod storage;

pub use config::{DueMode, SchedulerConfig};
pub use scheduler::{Scheduler, SchedulerError};
