pub mod add;
pub mod due;
pub mod preview;
pub mod progress;
pub mod remove;
pub mod review;
pub mod search;
pub mod stats;
