// src/domain/backup.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DomainError, Note, Question, QuestionAnalysis};

/// `type` of notes kept among the mistakes by older versions of the app.
const LEGACY_NOTE_KIND: &str = "note";

/// Backup / import document. Also the on-disk format of the JSON store.
///
/// `settings` is an opaque passthrough owned by the settings collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackupDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mistakes: Option<Vec<Question>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

impl BackupDocument {
    /// Parse and validate an import payload.
    ///
    /// Legacy note records found in `mistakes` are moved to `notes`, and a
    /// question without `nextReviewAt` is due from its `addedAt`.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let mut raw: Value = serde_json::from_str(json).map_err(not_a_backup)?;
        let legacy_notes = match raw.get_mut("mistakes").and_then(Value::as_array_mut) {
            Some(mistakes) => normalize_mistakes(mistakes)?,
            None => Vec::new(),
        };

        let mut document: BackupDocument = serde_json::from_value(raw).map_err(not_a_backup)?;
        if !legacy_notes.is_empty() {
            document.notes.get_or_insert_with(Vec::new).extend(legacy_notes);
        }
        document.validate()?;
        Ok(document)
    }

    /// A document carrying neither `mistakes` nor `settings` is rejected.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.mistakes.is_none() && self.settings.is_none() {
            return Err(DomainError::InvalidBackup(
                "document contains neither `mistakes` nor `settings`".to_string(),
            ));
        }
        Ok(())
    }
}

fn not_a_backup(e: serde_json::Error) -> DomainError {
    DomainError::InvalidBackup(format!("not a backup document: {}", e))
}

/// Shape of a note stored as a mistake record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyNote {
    id: String,
    #[serde(default)]
    folder: String,
    #[serde(default)]
    analysis: QuestionAnalysis,
    #[serde(default)]
    user_notes: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    added_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<LegacyNote> for Note {
    fn from(legacy: LegacyNote) -> Self {
        Note {
            id: legacy.id,
            folder: legacy.folder,
            title: legacy.analysis.core_concept,
            content: legacy.user_notes,
            tags: legacy.tags,
            created_at: legacy.added_at,
            updated_at: legacy.updated_at.unwrap_or(legacy.added_at),
            versions: Vec::new(),
        }
    }
}

/// Removes legacy notes from `mistakes` and returns them converted.
/// Fills a missing `nextReviewAt` with `addedAt` on the remaining records.
fn normalize_mistakes(mistakes: &mut Vec<Value>) -> Result<Vec<Note>, DomainError> {
    let (legacy, mut questions): (Vec<Value>, Vec<Value>) = mistakes
        .drain(..)
        .partition(|record| record.get("type").and_then(Value::as_str) == Some(LEGACY_NOTE_KIND));

    for record in &mut questions {
        if let Some(fields) = record.as_object_mut() {
            let missing = fields.get("nextReviewAt").map_or(true, Value::is_null);
            if missing {
                if let Some(added_at) = fields.get("addedAt").cloned() {
                    fields.insert("nextReviewAt".to_string(), added_at);
                }
            }
        }
    }
    *mistakes = questions;

    legacy
        .into_iter()
        .map(|record| serde_json::from_value::<LegacyNote>(record).map(Note::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(not_a_backup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_notes_only_document_when_validating_then_rejects() {
        let json = r#"{"notes": [], "folders": ["Math"]}"#;

        let result = BackupDocument::from_json(json);

        assert!(matches!(result, Err(DomainError::InvalidBackup(_))));
    }

    #[test]
    fn given_settings_only_document_when_validating_then_accepts() {
        let json = r#"{"settings": {"subjects": ["Math"]}}"#;

        let document = BackupDocument::from_json(json).unwrap();

        assert!(document.mistakes.is_none());
        assert!(document.settings.is_some());
    }

    #[test]
    fn given_legacy_note_among_mistakes_when_parsing_then_moves_it_to_notes() {
        // Arrange
        let json = r#"{
            "mistakes": [
                {"id": "q1", "subject": "Math", "questionText": "1 + 1?",
                 "addedAt": 1000, "nextReviewAt": 1000},
                {"id": "n1", "type": "note", "subject": "Math",
                 "analysis": {"coreConcept": "Chain rule"},
                 "userNotes": "Differentiate the outer function first.",
                 "tags": ["calculus"], "addedAt": 2000}
            ],
            "notes": [{"id": "n0", "title": "Existing", "createdAt": 1, "updatedAt": 1}]
        }"#;

        // Act
        let document = BackupDocument::from_json(json).unwrap();

        // Assert
        let mistakes = document.mistakes.unwrap();
        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].id, "q1");
        let notes = document.notes.unwrap();
        assert_eq!(notes.len(), 2);
        let migrated = &notes[1];
        assert_eq!(migrated.id, "n1");
        assert_eq!(migrated.title, "Chain rule");
        assert_eq!(migrated.content, "Differentiate the outer function first.");
        assert_eq!(migrated.folder, "");
        assert_eq!(migrated.tags, vec!["calculus"]);
        assert_eq!(migrated.updated_at.timestamp_millis(), 2000);
        assert!(migrated.versions.is_empty());
    }

    #[test]
    fn given_question_without_next_review_when_parsing_then_due_from_added_at() {
        let json = r#"{"mistakes": [{"id": "q1", "subject": "Math", "questionText": "?",
            "addedAt": 1700000000000}]}"#;

        let document = BackupDocument::from_json(json).unwrap();

        let question = &document.mistakes.unwrap()[0];
        assert_eq!(question.next_review_at, question.added_at);
    }

    #[test]
    fn given_malformed_json_when_parsing_then_reports_invalid_backup() {
        let result = BackupDocument::from_json("{ not json");

        assert!(matches!(result, Err(DomainError::InvalidBackup(msg)) if msg.contains("not a backup")));
    }
}
