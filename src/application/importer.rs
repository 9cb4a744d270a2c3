// src/application/importer.rs
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BackupDocument, Note, Question};

/// Conflict policy for combining an incoming record set with the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ImportStrategy {
    /// Incoming records supersede the existing set
    Replace,
    /// Union by id, incoming wins on collision
    #[default]
    Merge,
    /// Incoming records get fresh ids and are appended
    #[value(name = "keep_both")]
    KeepBoth,
}

/// Records that can be reconciled by id.
pub trait Identified: Clone {
    fn id(&self) -> &str;
    fn with_id(self, id: String) -> Self;
}

impl Identified for Question {
    fn id(&self) -> &str {
        &self.id
    }

    fn with_id(self, id: String) -> Self {
        Self { id, ..self }
    }
}

impl Identified for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn with_id(self, id: String) -> Self {
        Self { id, ..self }
    }
}

/// How many incoming ids already exist. Read-only.
pub fn count_collisions<T: Identified>(existing: &[T], incoming: &[T]) -> usize {
    let existing_ids: HashSet<&str> = existing.iter().map(|record| record.id()).collect();
    incoming
        .iter()
        .filter(|record| existing_ids.contains(record.id()))
        .count()
}

/// Combine `existing` and `incoming` under `strategy`.
///
/// `merge` keeps existing order, overwrites colliding records in place and
/// appends new ones in incoming order.
pub fn reconcile<T: Identified>(existing: &[T], incoming: Vec<T>, strategy: ImportStrategy) -> Vec<T> {
    match strategy {
        ImportStrategy::Replace => incoming,
        ImportStrategy::Merge => {
            let mut merged: Vec<T> = existing.to_vec();
            let mut positions: HashMap<String, usize> = merged
                .iter()
                .enumerate()
                .map(|(i, record)| (record.id().to_string(), i))
                .collect();
            for record in incoming {
                match positions.get(record.id()) {
                    Some(&i) => merged[i] = record,
                    None => {
                        positions.insert(record.id().to_string(), merged.len());
                        merged.push(record);
                    }
                }
            }
            merged
        }
        ImportStrategy::KeepBoth => existing
            .iter()
            .cloned()
            .chain(
                incoming
                    .into_iter()
                    .map(|record| record.with_id(Uuid::new_v4().to_string())),
            )
            .collect(),
    }
}

/// What an import would do, shown before the user commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportPreview {
    pub question_count: usize,
    pub note_count: usize,
    pub duplicate_questions: usize,
    pub duplicate_notes: usize,
    pub folder_count: Option<usize>,
    pub has_settings: bool,
}

pub fn preview_import(
    questions: &[Question],
    notes: &[Note],
    document: &BackupDocument,
) -> ImportPreview {
    let incoming_questions = document.mistakes.as_deref().unwrap_or_default();
    let incoming_notes = document.notes.as_deref().unwrap_or_default();
    ImportPreview {
        question_count: incoming_questions.len(),
        note_count: incoming_notes.len(),
        duplicate_questions: count_collisions(questions, incoming_questions),
        duplicate_notes: count_collisions(notes, incoming_notes),
        folder_count: document.folders.as_ref().map(Vec::len),
        has_settings: document.settings.is_some(),
    }
}
