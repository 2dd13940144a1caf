//! Spaced repetition for vocabulary words
//!
//! This module owns everything scheduling-related:
//! - Scheduling state with lazy initialization and invariant repair
//! - The SM-2 review step, driven by a binary correct/incorrect signal
//! - Due-date prioritization and review-queue helpers

pub mod algorithm;
pub mod queue;
pub mod state;

pub use algorithm::review;
pub use queue::{collection_stats, due_count, due_words, is_due, prioritize};
pub use state::{
    ensure_initialized, migrate_batch, validate, Scheduling, SchedulingState,
    DEFAULT_EASE_FACTOR, INITIAL_INTERVAL_DAYS, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR,
};
