//! Due-date ordering and review-queue helpers

use chrono::{DateTime, Utc};

use crate::models::{CollectionStats, Word, WordStatus};

use super::state;

/// Order words for review, most overdue first.
///
/// Words are guardian-normalized first, so entries that never got a due
/// date sort as due immediately. The sort is stable: words sharing a due
/// date keep their relative input order.
pub fn prioritize(words: Vec<Word>, now: DateTime<Utc>) -> Vec<Word> {
    let mut words = state::migrate_batch(words, now);
    words.sort_by_key(|word| word.scheduling.due_date().unwrap_or(now));
    words
}

/// Whether a word is due for review at `now`.
///
/// Words without scheduling state count as due immediately.
pub fn is_due(word: &Word, now: DateTime<Utc>) -> bool {
    word.scheduling.due_date().map_or(true, |due| due <= now)
}

/// Words due for review at `now`.
pub fn due_words<'a>(words: &'a [Word], now: DateTime<Utc>) -> Vec<&'a Word> {
    words.iter().filter(|word| is_due(word, now)).collect()
}

/// Number of words due for review at `now`.
pub fn due_count(words: &[Word], now: DateTime<Utc>) -> usize {
    words.iter().filter(|word| is_due(word, now)).count()
}

/// Aggregate counts for statistics displays.
pub fn collection_stats(words: &[Word], now: DateTime<Utc>) -> CollectionStats {
    let mut stats = CollectionStats {
        total_words: words.len(),
        ..Default::default()
    };

    for word in words {
        match word.status {
            WordStatus::New => stats.new_words += 1,
            WordStatus::Learned => stats.learned_words += 1,
            WordStatus::NeedsReview => stats.needs_review_words += 1,
        }
        if is_due(word, now) {
            stats.due_words += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::state::{Scheduling, SchedulingState};
    use chrono::Duration;
    use uuid::Uuid;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn word_due(offset_days: i64, now: DateTime<Utc>) -> Word {
        let mut word = Word::new("词", "cí", "word", Uuid::new_v4(), now);
        word.scheduling = Scheduling::Valid(SchedulingState {
            due_date: now + Duration::days(offset_days),
            ..SchedulingState::fresh(now)
        });
        word
    }

    #[test]
    fn test_prioritize_overdue_first() {
        let now = fixed_now();
        let upcoming = word_due(1, now);
        let week_overdue = word_due(-7, now);
        let day_overdue = word_due(-1, now);

        let expected = vec![week_overdue.id, day_overdue.id, upcoming.id];
        let sorted = prioritize(vec![upcoming, week_overdue, day_overdue], now);

        let ids: Vec<Uuid> = sorted.iter().map(|w| w.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_prioritize_is_stable_on_ties() {
        let now = fixed_now();
        let words: Vec<Word> = (0..6).map(|_| word_due(-2, now)).collect();
        let ids: Vec<Uuid> = words.iter().map(|w| w.id).collect();

        let sorted = prioritize(words, now);
        let sorted_ids: Vec<Uuid> = sorted.iter().map(|w| w.id).collect();
        assert_eq!(ids, sorted_ids);
    }

    #[test]
    fn test_prioritize_handles_uninitialized_words() {
        let now = fixed_now();
        let legacy = Word::new("旧", "jiù", "old", Uuid::new_v4(), now);
        let legacy_id = legacy.id;
        let future = word_due(5, now);

        // Legacy words default to due now, ahead of anything upcoming.
        let sorted = prioritize(vec![future, legacy], now);
        assert_eq!(sorted[0].id, legacy_id);
        assert!(sorted[0].scheduling.state().is_some());
    }

    #[test]
    fn test_prioritize_empty() {
        assert!(prioritize(Vec::new(), fixed_now()).is_empty());
    }

    #[test]
    fn test_is_due() {
        let now = fixed_now();
        assert!(is_due(&word_due(-1, now), now));
        assert!(is_due(&word_due(0, now), now));
        assert!(!is_due(&word_due(1, now), now));

        let legacy = Word::new("旧", "jiù", "old", Uuid::new_v4(), now);
        assert!(is_due(&legacy, now));
    }

    #[test]
    fn test_due_count_matches_due_words() {
        let now = fixed_now();
        let words = vec![
            word_due(-3, now),
            word_due(2, now),
            word_due(-1, now),
            word_due(10, now),
        ];

        assert_eq!(due_count(&words, now), 2);
        assert_eq!(due_words(&words, now).len(), due_count(&words, now));
        assert!(due_words(&words, now)
            .into_iter()
            .all(|word| is_due(word, now)));
    }

    #[test]
    fn test_collection_stats() {
        let now = fixed_now();
        let mut learned = word_due(3, now);
        learned.status = WordStatus::Learned;
        let mut review = word_due(-1, now);
        review.status = WordStatus::NeedsReview;
        let fresh = word_due(0, now);

        let stats = collection_stats(&[learned, review, fresh], now);
        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.new_words, 1);
        assert_eq!(stats.learned_words, 1);
        assert_eq!(stats.needs_review_words, 1);
        assert_eq!(stats.due_words, 2);
    }
}
