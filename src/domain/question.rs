// src/domain/question.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of exam question, serialized with the tags used in backup files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuestionKind {
    /// Single-choice
    #[serde(rename = "choice")]
    #[default]
    SingleChoice,
    /// Multiple-choice with an undetermined number of correct options
    #[serde(rename = "indeterminate_choice")]
    MultiChoice,
    #[serde(rename = "fill")]
    FillIn,
    #[serde(rename = "short")]
    ShortAnswer,
}

/// Difficulty on a 1-5 scale. Out-of-range input is clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(3)
    }
}

impl From<i64> for Difficulty {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

/// Structured analysis attached to a question when it was recorded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionAnalysis {
    pub core_concept: String,
    pub error_diagnosis: String,
    pub correct_method: String,
    pub tags: Vec<String>,
    pub difficulty_rating: Difficulty,
}

/// A missed exam question ("mistake").
///
/// `next_review_at` is always set; a fresh question is due immediately.
/// `review_count` only moves forward through the review scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub subject: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub tags: Vec<String>,

    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(default)]
    pub wrong_answer: String,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub ai_diagnosis: String,

    #[serde(default)]
    pub analysis: QuestionAnalysis,
    /// Free-text reflection of the user on this question
    #[serde(default)]
    pub user_notes: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub added_at: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_review_at: DateTime<Utc>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub difficulty_rating: Difficulty,
}

impl Question {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}
