//! Study sessions: word selection and answer replay
//!
//! A session is a bounded, randomized slice of a folder's words. Normal
//! mode mixes the status buckets at fixed ratios, weighted toward new
//! words; Unseen and Learned drain a single bucket. Answers replay through
//! the SM-2 review engine one word at a time.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AnswerResult, Word, WordStatus};
use crate::srs::{algorithm, queue};

/// Default number of words in a Normal-mode session.
pub const DEFAULT_SESSION_CAP: usize = 10;

/// Share of a Normal session drawn from new words.
const NEW_RATIO: f64 = 0.5;

/// Share of a Normal session drawn from needs-review words.
const REVIEW_RATIO: f64 = 0.3;

/// Needs-review share when no new words are available.
const FALLBACK_REVIEW_RATIO: f64 = 0.7;

/// Word-selection policy for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    /// Ratio mix of new, needs-review, and learned words.
    Normal,
    /// Every new word.
    Unseen,
    /// Every learned word.
    Learned,
}

/// Ordering applied to the composed session before it is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOrder {
    /// Uniform random order (the historical behavior for every mode).
    Shuffled,
    /// Most overdue first.
    DuePriority,
}

/// Tunables for [`compose_session`].
///
/// The defaults reproduce the historical behavior exactly, including the
/// final shuffle that discards Learned mode's due-date ordering; callers
/// wanting due-soonest-first switch that mode to
/// [`OutputOrder::DuePriority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub cap: usize,
    pub normal_output: OutputOrder,
    pub unseen_output: OutputOrder,
    pub learned_output: OutputOrder,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cap: DEFAULT_SESSION_CAP,
            normal_output: OutputOrder::Shuffled,
            unseen_output: OutputOrder::Shuffled,
            learned_output: OutputOrder::Shuffled,
        }
    }
}

impl SessionConfig {
    fn output_order(&self, mode: TestMode) -> OutputOrder {
        match mode {
            TestMode::Normal => self.normal_output,
            TestMode::Unseen => self.unseen_output,
            TestMode::Learned => self.learned_output,
        }
    }
}

fn ratio_count(size: usize, ratio: f64) -> usize {
    (size as f64 * ratio).ceil() as usize
}

/// Shuffle a prioritized bucket and take the first `count` words.
fn draw(bucket: Vec<Word>, count: usize, rng: &mut impl Rng, now: DateTime<Utc>) -> Vec<Word> {
    let mut words = queue::prioritize(bucket, now);
    words.shuffle(rng);
    words.truncate(count);
    words
}

/// Build a study session from `pool` for the given mode.
///
/// Normal mode targets `min(cap, pool)` words at a 50/30/20
/// new/review/learned split, falling back to 70/30 review/learned and then
/// to learned-only as buckets empty out. Unseen takes every new word,
/// Learned every learned word. The result is ordered per `config`; an
/// empty result means the relevant buckets were empty, which the caller
/// surfaces.
pub fn compose_session(
    pool: Vec<Word>,
    mode: TestMode,
    config: &SessionConfig,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Vec<Word> {
    let pool_len = pool.len();
    let mut new_words = Vec::new();
    let mut learned = Vec::new();
    let mut needs_review = Vec::new();
    for word in pool {
        match word.status {
            WordStatus::New => new_words.push(word),
            WordStatus::Learned => learned.push(word),
            WordStatus::NeedsReview => needs_review.push(word),
        }
    }

    let mut selected = match mode {
        TestMode::Normal => {
            if !new_words.is_empty() {
                let size = config.cap.min(pool_len);
                let new_count = ratio_count(size, NEW_RATIO);
                let review_count = ratio_count(size, REVIEW_RATIO);
                let learned_count = size.saturating_sub(new_count + review_count);

                let mut selected = draw(new_words, new_count, rng, now);
                selected.extend(draw(needs_review, review_count, rng, now));
                selected.extend(draw(learned, learned_count, rng, now));
                selected
            } else if !needs_review.is_empty() {
                let size = config.cap.min(needs_review.len() + learned.len());
                let review_count = ratio_count(size, FALLBACK_REVIEW_RATIO);
                let learned_count = size.saturating_sub(review_count);

                let mut selected = draw(needs_review, review_count, rng, now);
                selected.extend(draw(learned, learned_count, rng, now));
                selected
            } else {
                draw(learned, config.cap, rng, now)
            }
        }
        TestMode::Unseen => {
            let mut words = new_words;
            words.shuffle(rng);
            words
        }
        TestMode::Learned => queue::prioritize(learned, now),
    };

    match config.output_order(mode) {
        OutputOrder::Shuffled => selected.shuffle(rng),
        OutputOrder::DuePriority => selected = queue::prioritize(selected, now),
    }
    selected
}

/// Final score for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub score: usize,
    pub percentage: u32,
}

impl Score {
    pub fn from_counts(correct: usize, total: usize) -> Self {
        let percentage = if total > 0 {
            ((correct as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        Self {
            score: correct,
            percentage,
        }
    }
}

/// A study session in progress.
///
/// Words are answered in order; each answer updates the word through the
/// review engine and the caller persists the returned record before
/// moving on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSession {
    pub id: Uuid,
    pub folder_id: Uuid,
    pub mode: TestMode,
    pub words: Vec<Word>,
    pub current_index: usize,
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub incorrect_words: Vec<Word>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
}

impl TestSession {
    pub fn new(folder_id: Uuid, mode: TestMode, words: Vec<Word>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            folder_id,
            mode,
            words,
            current_index: 0,
            correct_count: 0,
            incorrect_count: 0,
            incorrect_words: Vec::new(),
            start_time: now,
        }
    }

    /// The word currently being tested, if the session is not finished.
    pub fn current(&self) -> Option<&Word> {
        self.words.get(self.current_index)
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.words.len()
    }

    /// Record the answer for the current word and advance.
    ///
    /// Bumps the practiced count on correct answers, stamps the result,
    /// and runs the review engine. Returns the updated word for the
    /// caller to persist; `None` once the session is complete.
    pub fn record_answer(&mut self, correct: bool, now: DateTime<Utc>) -> Option<Word> {
        let mut word = self.words.get(self.current_index)?.clone();

        if correct {
            word.practiced_count += 1;
            self.correct_count += 1;
        } else {
            self.incorrect_count += 1;
        }
        word.last_result = Some(if correct {
            AnswerResult::Correct
        } else {
            AnswerResult::Incorrect
        });
        word.updated_at = now;

        let word = algorithm::review(word, correct, now);

        self.words[self.current_index] = word.clone();
        if !correct {
            self.incorrect_words.push(word.clone());
        }
        self.current_index += 1;

        Some(word)
    }

    pub fn score(&self) -> Score {
        Score::from_counts(self.correct_count, self.words.len())
    }
}
