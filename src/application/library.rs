// src/application/library.rs
//
// Question library views: subject/search filtering and headline counts.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::Question;
use crate::util::text::contains_ignore_case;

use super::review_scheduler;

/// Questions in `subject` (all when `None`) whose body, core concept or tags
/// contain `query`, newest first.
pub fn filter_questions<'a>(
    questions: &'a [Question],
    subject: Option<&str>,
    query: &str,
) -> Vec<&'a Question> {
    let needle = query.trim().to_lowercase();
    let mut matches: Vec<&Question> = questions
        .iter()
        .filter(|q| subject.map_or(true, |s| q.subject == s))
        .filter(|q| question_matches(q, &needle))
        .collect();
    matches.sort_by(|a, b| b.added_at.cmp(&a.added_at));
    matches
}

fn question_matches(question: &Question, needle: &str) -> bool {
    contains_ignore_case(&question.question_text, needle)
        || contains_ignore_case(&question.analysis.core_concept, needle)
        || question
            .tags
            .iter()
            .chain(question.analysis.tags.iter())
            .any(|tag| contains_ignore_case(tag, needle))
}

/// Distinct subjects in first-seen order.
pub fn subjects(questions: &[Question]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for q in questions {
        if !seen.contains(&q.subject.as_str()) {
            seen.push(&q.subject);
        }
    }
    seen
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudyStats {
    pub total: usize,
    pub due: usize,
}

impl StudyStats {
    pub fn compute(questions: &[Question], now: DateTime<Utc>) -> Self {
        Self {
            total: questions.len(),
            due: review_scheduler::due_count(questions, now),
        }
    }
}
