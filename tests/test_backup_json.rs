use anyhow::Result;
use nexus_study::domain::{BackupDocument, QuestionKind};
use nexus_study::util::testing::{note, question};

const LEGACY_BACKUP: &str = r#"{
  "version": 3,
  "timestamp": 1718000000000,
  "mistakes": [
    {
      "id": "m1",
      "subject": "Physics",
      "type": "fill",
      "questionText": "Speed of light?",
      "wrongAnswer": "3e5 km/h",
      "correctAnswer": "3e8 m/s",
      "explanation": "Units.",
      "analysis": {"coreConcept": "Units", "difficultyRating": 9},
      "addedAt": 1717000000000,
      "nextReviewAt": 1717100000000,
      "reviewCount": 2
    }
  ],
  "notes": [
    {
      "id": "n1",
      "folder": "Physics/Optics",
      "title": "Lenses",
      "content": "f = $\\frac{1}{f}$",
      "createdAt": 1717000000000,
      "updatedAt": 1717000500000,
      "versions": [
        {"id": "v1", "timestamp": 1717000400000, "content": "old", "title": "Lenses", "name": "draft"}
      ]
    }
  ],
  "folders": ["Physics", "Physics/Optics"],
  "settings": {"apiKey": "", "theme": "dark"}
}"#;

#[test]
fn given_backup_with_camel_case_fields_when_parsing_then_reads_records() -> Result<()> {
    // Act
    let document = BackupDocument::from_json(LEGACY_BACKUP)?;

    // Assert
    let mistakes = document.mistakes.expect("mistakes");
    assert_eq!(mistakes[0].kind, QuestionKind::FillIn);
    assert_eq!(mistakes[0].review_count, 2);
    assert_eq!(mistakes[0].next_review_at.timestamp_millis(), 1717100000000);
    assert_eq!(mistakes[0].analysis.difficulty_rating.value(), 5);
    assert!(mistakes[0].options.is_none());

    let notes = document.notes.expect("notes");
    assert_eq!(notes[0].versions[0].name.as_deref(), Some("draft"));
    assert_eq!(notes[0].updated_at.timestamp_millis(), 1717000500000);
    assert_eq!(document.settings.expect("settings")["theme"], "dark");
    Ok(())
}

#[test]
fn given_question_when_serializing_then_uses_camel_case_and_millis() -> Result<()> {
    // Arrange
    let q = question("q1");

    // Act
    let json = serde_json::to_value(&q)?;

    // Assert
    assert_eq!(json["type"], "choice");
    assert_eq!(json["questionText"], "What is 2 + 2?");
    assert_eq!(json["nextReviewAt"], q.next_review_at.timestamp_millis());
    assert!(json.get("question_text").is_none());
    assert!(json.get("questionImage").is_none());
    Ok(())
}

#[test]
fn given_note_when_serializing_then_versions_and_dates_are_present() -> Result<()> {
    let n = note("n1", "Math", "Limits");

    let json = serde_json::to_value(&n)?;

    assert_eq!(json["createdAt"], n.created_at.timestamp_millis());
    assert!(json["versions"].as_array().is_some_and(|v| v.is_empty()));
    Ok(())
}

#[test]
fn given_settings_only_document_when_parsing_then_is_accepted() -> Result<()> {
    let document = BackupDocument::from_json(r#"{"settings": {"theme": "light"}}"#)?;

    assert!(document.mistakes.is_none());
    assert!(document.notes.is_none());
    Ok(())
}

#[test]
fn given_parsed_backup_when_reserializing_then_parses_to_equal_document() -> Result<()> {
    let document = BackupDocument::from_json(LEGACY_BACKUP)?;

    let again = BackupDocument::from_json(&serde_json::to_string(&document)?)?;

    assert_eq!(again, document);
    Ok(())
}
