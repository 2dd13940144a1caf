//! Data models for the vocabulary collection
//!
//! Words carry their own spaced-repetition scheduling state (see
//! [`crate::srs`]); everything else here is content and bookkeeping the
//! scheduler treats as opaque.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::srs::Scheduling;

/// Study status of a word, mirroring the most recent answer.
///
/// Serialized with the color names older stores used for these states
/// ("white" = new, "green" = learned, "red" = needs review).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordStatus {
    #[default]
    #[serde(rename = "white")]
    New,
    #[serde(rename = "green")]
    Learned,
    #[serde(rename = "red")]
    NeedsReview,
}

impl WordStatus {
    /// Status implied by the most recent answer, if any.
    pub fn from_result(result: Option<AnswerResult>) -> Self {
        match result {
            Some(AnswerResult::Correct) => WordStatus::Learned,
            Some(AnswerResult::Incorrect) => WordStatus::NeedsReview,
            None => WordStatus::New,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WordStatus::New => "new",
            WordStatus::Learned => "learned",
            WordStatus::NeedsReview => "review",
        }
    }
}

/// Outcome of a single test answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerResult {
    Correct,
    Incorrect,
}

/// One character of an etymology breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtymologyComponent {
    pub character: String,
    pub meaning: String,
    pub explanation: String,
}

/// Character-level etymology for a word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Etymology {
    pub components: Vec<EtymologyComponent>,
    pub full_meaning: String,
}

/// Part of speech, stored with the Chinese labels the word data uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartOfSpeech {
    #[serde(rename = "动词")]
    Verb,
    #[serde(rename = "形容词")]
    Adjective,
    #[serde(rename = "名词")]
    Noun,
    #[serde(rename = "量词")]
    MeasureWord,
    #[serde(rename = "副词")]
    Adverb,
    #[serde(rename = "代词")]
    Pronoun,
    #[serde(rename = "其他")]
    Other,
}

/// A single learnable vocabulary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: Uuid,
    pub chinese: String,
    pub pinyin: String,
    pub english: String,
    #[serde(default)]
    pub status: WordStatus,
    #[serde(default)]
    pub practiced_count: i64,
    #[serde(default)]
    pub last_result: Option<AnswerResult>,
    pub folder_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etymology: Option<Etymology>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<PartOfSpeech>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// Spaced-repetition fields, flattened into the word record as the
    /// legacy `sr*` keys.
    #[serde(flatten)]
    pub scheduling: Scheduling,
}

impl Word {
    pub fn new(
        chinese: impl Into<String>,
        pinyin: impl Into<String>,
        english: impl Into<String>,
        folder_id: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            chinese: chinese.into(),
            pinyin: pinyin.into(),
            english: english.into(),
            status: WordStatus::New,
            practiced_count: 0,
            last_result: None,
            folder_id,
            etymology: None,
            part_of_speech: None,
            created_at: now,
            updated_at: now,
            scheduling: Scheduling::Uninitialized,
        }
    }
}

/// A named group of words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub word_count: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            word_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Aggregate counts for a word collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_words: usize,
    pub new_words: usize,
    pub learned_words: usize,
    pub needs_review_words: usize,
    pub due_words: usize,
}

/// Filter words by a search query, matching Chinese, English, or pinyin.
///
/// A blank query matches everything.
pub fn search_words<'a>(words: &'a [Word], query: &str) -> Vec<&'a Word> {
    let query = query.trim();
    if query.is_empty() {
        return words.iter().collect();
    }

    let lower = query.to_lowercase();
    words
        .iter()
        .filter(|word| {
            word.chinese.contains(query)
                || word.english.to_lowercase().contains(&lower)
                || word.pinyin.to_lowercase().contains(&lower)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn word(chinese: &str, pinyin: &str, english: &str) -> Word {
        Word::new(chinese, pinyin, english, Uuid::new_v4(), fixed_now())
    }

    #[test]
    fn test_status_from_result() {
        assert_eq!(WordStatus::from_result(None), WordStatus::New);
        assert_eq!(
            WordStatus::from_result(Some(AnswerResult::Correct)),
            WordStatus::Learned
        );
        assert_eq!(
            WordStatus::from_result(Some(AnswerResult::Incorrect)),
            WordStatus::NeedsReview
        );
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(WordStatus::NeedsReview).unwrap(),
            serde_json::json!("red")
        );
        let status: WordStatus = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(status, WordStatus::Learned);
    }

    #[test]
    fn test_word_serde_round_trip() {
        let mut word = word("你好", "nǐ hǎo", "hello");
        word.part_of_speech = Some(PartOfSpeech::Other);
        word.etymology = Some(Etymology {
            components: vec![EtymologyComponent {
                character: "你".to_string(),
                meaning: "you".to_string(),
                explanation: "second person".to_string(),
            }],
            full_meaning: "you".to_string(),
        });

        let json = serde_json::to_string(&word).unwrap();
        let back: Word = serde_json::from_str(&json).unwrap();
        assert_eq!(back, word);
    }

    #[test]
    fn test_search_matches_any_field() {
        let words = vec![
            word("你好", "nǐ hǎo", "hello"),
            word("学习", "xuéxí", "to study"),
            word("谢谢", "xièxie", "thanks"),
        ];

        assert_eq!(search_words(&words, "你好").len(), 1);
        assert_eq!(search_words(&words, "STUDY").len(), 1);
        assert_eq!(search_words(&words, "xièxie").len(), 1);
        assert_eq!(search_words(&words, "zzz").len(), 0);
    }

    #[test]
    fn test_search_blank_query_matches_all() {
        let words = vec![word("你好", "nǐ hǎo", "hello")];
        assert_eq!(search_words(&words, "  ").len(), 1);
    }
}
