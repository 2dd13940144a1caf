//! SM-2 spaced repetition review step
//!
//! The classic SuperMemo 2 schedule driven by a binary signal: the app
//! records correct/incorrect only, so answers map onto SM-2's 0-5 quality
//! scale as 4 (correct) and 0 (incorrect).
//!
//! - Incorrect: progress resets and the ease factor drops by 0.2
//! - Correct: intervals grow 1 day, 3 days, then previous interval times
//!   the ease factor
//! - The ease factor never falls below 1.3; intervals never exceed 365 days

use chrono::{DateTime, Duration, Utc};

use crate::models::{Word, WordStatus};

use super::state::{self, Scheduling, SchedulingState};
use super::state::{INITIAL_INTERVAL_DAYS, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR};

/// Quality reported for a correct answer.
const CORRECT_QUALITY: u8 = 4;

/// Quality reported for an incorrect answer.
const INCORRECT_QUALITY: u8 = 0;

/// Ease-factor penalty applied on a lapse.
const LAPSE_EASE_PENALTY: f64 = 0.2;

/// Interval after the second consecutive correct answer.
const SECOND_INTERVAL_DAYS: i64 = 3;

fn answer_quality(correct: bool) -> u8 {
    if correct {
        CORRECT_QUALITY
    } else {
        INCORRECT_QUALITY
    }
}

/// One SM-2 step over validated state.
fn sm2_step(state: &SchedulingState, quality: u8, now: DateTime<Utc>) -> SchedulingState {
    let mut ease = state.ease_factor;
    let mut interval = state.interval_days;
    let mut repetitions = state.repetitions;

    if quality < 3 {
        // Lapse: start the schedule over
        repetitions = 0;
        interval = INITIAL_INTERVAL_DAYS;
        ease = (ease - LAPSE_EASE_PENALTY).max(MIN_EASE_FACTOR);
    } else {
        repetitions += 1;
        interval = match repetitions {
            1 => INITIAL_INTERVAL_DAYS,
            2 => SECOND_INTERVAL_DAYS,
            _ => (state.interval_days as f64 * ease).round() as i64,
        };

        // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
        let q = f64::from(quality);
        ease = (ease + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02))).max(MIN_EASE_FACTOR);
    }

    let interval = interval.min(MAX_INTERVAL_DAYS);

    SchedulingState {
        ease_factor: ease,
        interval_days: interval,
        due_date: now + Duration::days(interval),
        repetitions,
        last_reviewed: Some(now),
    }
}

/// Apply an answer to a word, producing its next scheduling state.
///
/// The word is guardian-normalized first, so legacy or corrupt fields
/// never reach the arithmetic. Status is recomputed from this answer
/// alone; practiced-count bookkeeping stays with the caller.
pub fn review(word: Word, correct: bool, now: DateTime<Utc>) -> Word {
    let mut word = state::validate(state::ensure_initialized(word, now), now);

    let current = match word.scheduling.state() {
        Some(state) => state.clone(),
        None => SchedulingState::fresh(now),
    };

    let next = sm2_step(&current, answer_quality(correct), now);
    word.status = if correct {
        WordStatus::Learned
    } else {
        WordStatus::NeedsReview
    };
    word.scheduling = Scheduling::Valid(next);
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn fresh_word() -> Word {
        Word::new("学习", "xuéxí", "to study", Uuid::new_v4(), fixed_now())
    }

    fn word_with_state(state: SchedulingState) -> Word {
        let mut word = fresh_word();
        word.scheduling = Scheduling::Valid(state);
        word
    }

    fn state_of(word: &Word) -> &SchedulingState {
        word.scheduling.state().unwrap()
    }

    #[test]
    fn test_first_correct_answer() {
        let now = fixed_now();
        let word = review(fresh_word(), true, now);

        let state = state_of(&word);
        assert_eq!(state.repetitions, 1);
        assert_eq!(state.interval_days, 1);
        assert_eq!(state.due_date, now + Duration::days(1));
        assert_eq!(state.last_reviewed, Some(now));
        assert_eq!(word.status, WordStatus::Learned);
    }

    #[test]
    fn test_correct_interval_progression() {
        let now = fixed_now();
        let mut word = fresh_word();
        let mut intervals = Vec::new();

        for _ in 0..4 {
            word = review(word, true, now);
            intervals.push(state_of(&word).interval_days);
        }

        // 1, 3, round(3 * 2.5) = 8, round(8 * 2.5) = 20
        assert_eq!(intervals, vec![1, 3, 8, 20]);
    }

    #[test]
    fn test_correct_answer_keeps_ease_factor() {
        // Quality 4 makes the SM-2 ease adjustment exactly zero.
        let now = fixed_now();
        let mut word = fresh_word();
        for _ in 0..3 {
            word = review(word, true, now);
        }
        assert_eq!(state_of(&word).ease_factor, 2.5);
    }

    #[test]
    fn test_incorrect_answer_resets_progress() {
        let now = fixed_now();
        let word = word_with_state(SchedulingState {
            ease_factor: 2.5,
            interval_days: 15,
            due_date: now,
            repetitions: 5,
            last_reviewed: Some(now - Duration::days(15)),
        });

        let word = review(word, false, now);
        let state = state_of(&word);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.interval_days, 1);
        assert_eq!(state.ease_factor, 2.3);
        assert_eq!(state.due_date, now + Duration::days(1));
        assert_eq!(word.status, WordStatus::NeedsReview);
    }

    #[test]
    fn test_ease_factor_floor() {
        let now = fixed_now();
        let mut word = fresh_word();
        for _ in 0..10 {
            word = review(word, false, now);
        }
        assert_eq!(state_of(&word).ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_interval_cap() {
        let now = fixed_now();
        let word = word_with_state(SchedulingState {
            ease_factor: 2.5,
            interval_days: 300,
            due_date: now,
            repetitions: 10,
            last_reviewed: Some(now),
        });

        // round(300 * 2.5) = 750, capped
        let word = review(word, true, now);
        assert_eq!(state_of(&word).interval_days, MAX_INTERVAL_DAYS);
    }

    #[test]
    fn test_lapse_then_recovery_restarts_schedule() {
        let now = fixed_now();
        let mut word = fresh_word();
        for _ in 0..3 {
            word = review(word, true, now);
        }

        word = review(word, false, now);
        assert_eq!(state_of(&word).interval_days, 1);
        assert_eq!(word.status, WordStatus::NeedsReview);

        word = review(word, true, now);
        let state = state_of(&word);
        assert_eq!(state.repetitions, 1);
        assert_eq!(state.interval_days, 1);
        assert_eq!(word.status, WordStatus::Learned);
    }

    #[test]
    fn test_review_normalizes_corrupt_state_first() {
        let now = fixed_now();
        let word = word_with_state(SchedulingState {
            ease_factor: 0.2,
            interval_days: -4,
            due_date: now,
            repetitions: -1,
            last_reviewed: None,
        });

        let word = review(word, true, now);
        let state = state_of(&word);
        // Repaired to defaults before the step, so this is a first answer.
        assert_eq!(state.repetitions, 1);
        assert_eq!(state.interval_days, 1);
        assert_eq!(state.ease_factor, 2.5);
    }

    #[test]
    fn test_review_initializes_legacy_word() {
        let now = fixed_now();
        let word = fresh_word();
        assert!(word.scheduling.state().is_none());

        let word = review(word, true, now);
        assert!(word.scheduling.state().is_some());
    }
}
