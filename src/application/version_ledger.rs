// src/application/version_ledger.rs
//
// Bounded per-note history. Snapshots capture the state *before* an update
// is applied and are never modified afterwards.
use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use crate::constants::MAX_NOTE_VERSIONS;
use crate::domain::{Note, NoteVersion};

/// Title and content to write back into the live note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredContent {
    pub title: String,
    pub content: String,
}

/// Capture the note's current title and content.
///
/// Without a label the snapshot is named after the local time of day.
pub fn snapshot(note: &Note, label: Option<&str>, now: DateTime<Utc>) -> NoteVersion {
    let name = label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "Snapshot {}",
                now.with_timezone(&Local).format("%H:%M:%S")
            )
        });

    NoteVersion {
        id: Uuid::new_v4().to_string(),
        timestamp: now,
        content: note.content.clone(),
        title: note.title.clone(),
        name: Some(name),
    }
}

/// New history with `version` first, cut to the most recent entries.
pub fn prepend(history: &[NoteVersion], version: NoteVersion) -> Vec<NoteVersion> {
    std::iter::once(version)
        .chain(history.iter().cloned())
        .take(MAX_NOTE_VERSIONS)
        .collect()
}

pub fn restore(version: &NoteVersion) -> RestoredContent {
    RestoredContent {
        title: version.title.clone(),
        content: version.content.clone(),
    }
}

/// Copy of `note` without the given snapshot. Unknown ids leave it unchanged.
pub fn delete_version(note: &Note, version_id: &str) -> Note {
    Note {
        versions: note
            .versions
            .iter()
            .filter(|v| v.id != version_id)
            .cloned()
            .collect(),
        ..note.clone()
    }
}
