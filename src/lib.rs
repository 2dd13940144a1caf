//! # shengci
//!
//! Vocabulary study engine built around SM-2 spaced repetition.
//!
//! - `srs`: scheduling state, the review algorithm, and due-date queues
//! - `models`: words, folders, and collection statistics
//! - `session`: study-session composition and answer replay
//! - `storage`: JSON-file persistence with legacy-state migration
//!
//! The core is pure: scheduling functions take the current time, and
//! session composition takes a random-number generator, from the caller.
//! Only `storage` and the CLI touch the clock and the filesystem.

pub mod models;
pub mod session;
pub mod srs;
pub mod storage;

pub use models::{
    search_words, AnswerResult, CollectionStats, Etymology, EtymologyComponent, Folder,
    PartOfSpeech, Word, WordStatus,
};
pub use session::{
    compose_session, OutputOrder, Score, SessionConfig, TestMode, TestSession,
    DEFAULT_SESSION_CAP,
};
pub use srs::{
    collection_stats, due_count, due_words, ensure_initialized, is_due, migrate_batch,
    prioritize, review, validate, Scheduling, SchedulingState,
};
pub use storage::{StorageError, VocabStorage};
