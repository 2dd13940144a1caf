//! Scheduling state and the field guardian
//!
//! Words written by older app versions may carry partial, missing, or
//! corrupt scheduling fields. This module owns the repair rules: state is
//! created lazily, every invariant violation is coerced to a safe value,
//! and nothing here ever fails.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Word;

/// Ease factor assigned to fresh or repaired state.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Minimum ease factor allowed.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Interval assigned to fresh or repaired state, in days.
pub const INITIAL_INTERVAL_DAYS: i64 = 1;

/// Maximum review interval, in days.
pub const MAX_INTERVAL_DAYS: i64 = 365;

/// Due dates further out than this are recomputed from the interval.
const MAX_FUTURE_DAYS: i64 = 5 * 365;

/// Current spaced-repetition state for a word.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingState {
    /// SM-2 ease factor (default 2.5, floor 1.3)
    pub ease_factor: f64,
    /// Current interval in days
    pub interval_days: i64,
    /// When the word is due for review
    pub due_date: DateTime<Utc>,
    /// Consecutive correct answers since the last lapse
    pub repetitions: i64,
    /// When the word was last answered
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl SchedulingState {
    /// State for a word that has never been scheduled: due immediately.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: INITIAL_INTERVAL_DAYS,
            due_date: now,
            repetitions: 0,
            last_reviewed: None,
        }
    }
}

/// Scheduling state as it exists on a word: either fully populated or not
/// yet created.
///
/// Words predating spaced repetition have no `sr*` fields; partially
/// written records are treated the same way and re-initialized wholesale.
/// The guardian functions below are the only place `Uninitialized` becomes
/// `Valid`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SchedulingWire", into = "SchedulingRecord")]
pub enum Scheduling {
    #[default]
    Uninitialized,
    Valid(SchedulingState),
}

impl Scheduling {
    pub fn state(&self) -> Option<&SchedulingState> {
        match self {
            Scheduling::Valid(state) => Some(state),
            Scheduling::Uninitialized => None,
        }
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.state().map(|state| state.due_date)
    }
}

/// Incoming wire form of the scheduling fields, flattened into the word
/// record as the legacy `sr*` keys.
///
/// Values are captured untyped: a store corrupted by hand edits or an old
/// bug must load anyway, with bad values repaired by [`validate`] instead
/// of failing the whole file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchedulingWire {
    #[serde(default)]
    sr_ease_factor: Option<Value>,
    #[serde(default)]
    sr_interval: Option<Value>,
    #[serde(default)]
    sr_due_date: Option<Value>,
    #[serde(default)]
    sr_repetitions: Option<Value>,
    #[serde(default)]
    sr_last_reviewed: Option<Value>,
}

/// Outgoing wire form: always fully typed, epoch-millisecond timestamps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SchedulingRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    sr_ease_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sr_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sr_due_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sr_repetitions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sr_last_reviewed: Option<i64>,
}

fn numeric(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn millis_to_datetime(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// Due-date placeholder for values chrono cannot represent; sits before
/// the epoch so [`validate`] resets it to `now`.
fn unrepresentable_due() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH - Duration::milliseconds(1)
}

impl From<SchedulingWire> for Scheduling {
    fn from(wire: SchedulingWire) -> Self {
        // All three core fields must be present for the state to count as
        // created; anything less is re-initialized from scratch.
        let (Some(ease), Some(interval), Some(due)) = (
            wire.sr_ease_factor,
            wire.sr_interval,
            wire.sr_due_date,
        ) else {
            return Scheduling::Uninitialized;
        };

        Scheduling::Valid(SchedulingState {
            ease_factor: numeric(&ease).unwrap_or(f64::NAN),
            interval_days: numeric(&interval).map(|v| v.round() as i64).unwrap_or(0),
            due_date: numeric(&due)
                .and_then(millis_to_datetime)
                .unwrap_or_else(unrepresentable_due),
            repetitions: wire
                .sr_repetitions
                .as_ref()
                .and_then(numeric)
                .map(|v| v.round() as i64)
                .unwrap_or(0),
            last_reviewed: wire
                .sr_last_reviewed
                .as_ref()
                .and_then(numeric)
                .and_then(millis_to_datetime),
        })
    }
}

impl From<Scheduling> for SchedulingRecord {
    fn from(scheduling: Scheduling) -> Self {
        match scheduling {
            Scheduling::Uninitialized => Self {
                sr_ease_factor: None,
                sr_interval: None,
                sr_due_date: None,
                sr_repetitions: None,
                sr_last_reviewed: None,
            },
            Scheduling::Valid(state) => Self {
                sr_ease_factor: Some(state.ease_factor),
                sr_interval: Some(state.interval_days),
                sr_due_date: Some(state.due_date.timestamp_millis()),
                sr_repetitions: Some(state.repetitions),
                sr_last_reviewed: state.last_reviewed.map(|lr| lr.timestamp_millis()),
            },
        }
    }
}

/// Populate scheduling state for a word that has none.
///
/// Words with existing state pass through untouched; run [`validate`]
/// afterwards to repair it.
pub fn ensure_initialized(mut word: Word, now: DateTime<Utc>) -> Word {
    if word.scheduling.state().is_none() {
        word.scheduling = Scheduling::Valid(SchedulingState::fresh(now));
    }
    word
}

/// Repair out-of-invariant scheduling values.
///
/// Every rule coerces rather than rejects:
/// - ease factor below 1.3 or non-finite resets to 2.5
/// - interval clamps into 1..=365
/// - due dates before the epoch reset to `now`; due dates more than five
///   years out are recomputed from the interval
/// - negative repetition counts reset to 0
/// - last-reviewed timestamps before the epoch are dropped
pub fn validate(mut word: Word, now: DateTime<Utc>) -> Word {
    let mut state = match word.scheduling.state() {
        Some(state) => state.clone(),
        None => SchedulingState::fresh(now),
    };

    if !state.ease_factor.is_finite() || state.ease_factor < MIN_EASE_FACTOR {
        state.ease_factor = DEFAULT_EASE_FACTOR;
    }

    if state.interval_days < INITIAL_INTERVAL_DAYS {
        state.interval_days = INITIAL_INTERVAL_DAYS;
    }
    if state.interval_days > MAX_INTERVAL_DAYS {
        state.interval_days = MAX_INTERVAL_DAYS;
    }

    if state.due_date.timestamp_millis() < 0 {
        state.due_date = now;
    }
    if state.due_date > now + Duration::days(MAX_FUTURE_DAYS) {
        state.due_date = now + Duration::days(state.interval_days);
    }

    if state.repetitions < 0 {
        state.repetitions = 0;
    }

    if let Some(last_reviewed) = state.last_reviewed {
        if last_reviewed.timestamp_millis() < 0 {
            state.last_reviewed = None;
        }
    }

    word.scheduling = Scheduling::Valid(state);
    word
}

/// Initialize and validate every word in a collection.
///
/// Order-preserving and pure; runs on every bulk read from storage so the
/// rest of the crate only ever sees valid state. The shared `now` keeps
/// relative ordering deterministic across a batch.
pub fn migrate_batch(words: Vec<Word>, now: DateTime<Utc>) -> Vec<Word> {
    words
        .into_iter()
        .map(|word| validate(ensure_initialized(word, now), now))
        .collect()
}
