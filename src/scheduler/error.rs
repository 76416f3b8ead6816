use thiserror::Error;
use uuid::Uuid;

/// Errors reported by the scheduling engine.
///
/// Every variant is a local, recoverable condition. The engine leaves its
/// state untouched whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("Invalid quality {0}: expected a value between 0 and 5")]
    InvalidQuality(i32),

    #[error("Card not found: {0}")]
    NotFound(Uuid),

    #[error("Duplicate card id: {0}")]
    DuplicateId(Uuid),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
