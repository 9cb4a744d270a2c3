// src/application/record_store.rs
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::clock::Clock;
use super::importer::{self, ImportPreview, ImportStrategy};
use super::review_scheduler::{self, ReviewOutcome};
use super::version_ledger;
use crate::constants::{BACKUP_FORMAT_VERSION, MAX_QUESTION_OPTIONS};
use crate::domain::{
    BackupDocument, Difficulty, DomainError, FolderPath, Note, Question, QuestionAnalysis,
    QuestionKind,
};
use crate::infrastructure::markdown::{extract_citations, QuestionLookup};

/// Canonical in-memory collections.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreState {
    pub questions: Vec<Question>,
    pub notes: Vec<Note>,
    /// Declared folder paths, in declaration order
    pub folders: Vec<String>,
    /// Opaque settings passthrough
    pub settings: Option<serde_json::Value>,
}

impl StoreState {
    pub fn from_document(document: BackupDocument) -> Self {
        Self {
            questions: document.mistakes.unwrap_or_default(),
            notes: document.notes.unwrap_or_default(),
            folders: document.folders.unwrap_or_default(),
            settings: document.settings,
        }
    }

    pub fn to_document(&self, now: DateTime<Utc>) -> BackupDocument {
        BackupDocument {
            version: Some(BACKUP_FORMAT_VERSION),
            timestamp: Some(now),
            mistakes: Some(self.questions.clone()),
            notes: Some(self.notes.clone()),
            folders: Some(self.folders.clone()),
            settings: self.settings.clone(),
        }
    }
}

/// Durable storage behind the store. Writes are best effort.
pub trait StorePersistence {
    fn load(&mut self) -> Result<Option<StoreState>, DomainError>;
    fn save(&mut self, state: &StoreState) -> Result<(), DomainError>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuestionDraft {
    pub subject: String,
    pub kind: QuestionKind,
    pub question_text: String,
    pub question_image: Option<String>,
    pub options: Option<Vec<String>>,
    pub wrong_answer: String,
    pub correct_answer: String,
    pub explanation: String,
    pub ai_diagnosis: String,
    pub analysis: QuestionAnalysis,
    pub user_notes: String,
    pub tags: Vec<String>,
    pub difficulty_rating: Difficulty,
}

/// Field updates for a question. Scheduling fields are not patchable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuestionPatch {
    pub subject: Option<String>,
    pub kind: Option<QuestionKind>,
    pub question_text: Option<String>,
    pub question_image: Option<Option<String>>,
    pub options: Option<Option<Vec<String>>>,
    pub wrong_answer: Option<String>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub ai_diagnosis: Option<String>,
    pub analysis: Option<QuestionAnalysis>,
    pub user_notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub difficulty_rating: Option<Difficulty>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteDraft {
    pub folder: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotePatch {
    pub folder: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Request to snapshot the pre-update state of a note.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VersionRequest {
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddQuestion(Question),
    UpdateQuestion { id: String, patch: QuestionPatch },
    DeleteQuestion { id: String },
    RecordReview { id: String, outcome: ReviewOutcome },
    AddNote(Note),
    UpdateNote { id: String, patch: NotePatch, version: Option<VersionRequest> },
    RestoreNoteVersion { note_id: String, version_id: String },
    DeleteNoteVersion { note_id: String, version_id: String },
    DeleteNote { id: String },
    DeclareFolder { path: String },
    SetFolders { folders: Vec<String> },
    Import { document: BackupDocument, strategy: ImportStrategy },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddQuestion(_) => "add_question",
            Mutation::UpdateQuestion { .. } => "update_question",
            Mutation::DeleteQuestion { .. } => "delete_question",
            Mutation::RecordReview { .. } => "record_review",
            Mutation::AddNote(_) => "add_note",
            Mutation::UpdateNote { .. } => "update_note",
            Mutation::RestoreNoteVersion { .. } => "restore_note_version",
            Mutation::DeleteNoteVersion { .. } => "delete_note_version",
            Mutation::DeleteNote { .. } => "delete_note",
            Mutation::DeclareFolder { .. } => "declare_folder",
            Mutation::SetFolders { .. } => "set_folders",
            Mutation::Import { .. } => "import",
        }
    }
}

/// Single owner of question and note records and the declared folders.
///
/// Every change goes through [`apply`](Self::apply), which computes the next
/// state, swaps it in, then hands it to the persistence adapter. A failed
/// write is logged and the in-memory state stays.
pub struct RecordStore<P: StorePersistence> {
    state: StoreState,
    persistence: P,
    clock: Box<dyn Clock>,
}

impl<P: StorePersistence> RecordStore<P> {
    pub fn new(persistence: P, clock: impl Clock + 'static) -> Self {
        Self {
            state: StoreState::default(),
            persistence,
            clock: Box::new(clock),
        }
    }

    /// Open with whatever the persistence adapter has stored.
    pub fn open(mut persistence: P, clock: impl Clock + 'static) -> Result<Self, DomainError> {
        let state = persistence.load()?.unwrap_or_default();
        info!(
            questions = state.questions.len(),
            notes = state.notes.len(),
            folders = state.folders.len(),
            "Opened record store"
        );
        Ok(Self {
            state,
            persistence,
            clock: Box::new(clock),
        })
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.state.questions
    }

    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    pub fn folders(&self) -> &[String] {
        &self.state.folders
    }

    pub fn settings(&self) -> Option<&serde_json::Value> {
        self.state.settings.as_ref()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.state.questions.iter().find(|q| q.id == id)
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.state.notes.iter().find(|n| n.id == id)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    #[instrument(level = "debug", skip_all, fields(mutation = mutation.name()))]
    pub fn apply(&mut self, mutation: Mutation) -> Result<&StoreState, DomainError> {
        let next = reduce(&self.state, mutation, self.clock.now())?;
        if next == self.state {
            debug!("Mutation left the store unchanged");
            return Ok(&self.state);
        }
        self.state = next;

        if let Err(e) = self.persistence.save(&self.state) {
            warn!(error = %e, "Persisting store failed, keeping in-memory state");
        }
        Ok(&self.state)
    }

    // --- Questions ---

    pub fn add_question(&mut self, draft: QuestionDraft) -> Result<String, DomainError> {
        let now = self.clock.now();
        let id = Uuid::new_v4().to_string();
        let question = Question {
            id: id.clone(),
            subject: draft.subject,
            kind: draft.kind,
            tags: draft.tags,
            question_text: draft.question_text,
            question_image: draft.question_image,
            options: draft.options,
            wrong_answer: draft.wrong_answer,
            correct_answer: draft.correct_answer,
            explanation: draft.explanation,
            ai_diagnosis: draft.ai_diagnosis,
            analysis: draft.analysis,
            user_notes: draft.user_notes,
            added_at: now,
            updated_at: Some(now),
            next_review_at: now,
            review_count: 0,
            difficulty_rating: draft.difficulty_rating,
        };
        self.apply(Mutation::AddQuestion(question))?;
        Ok(id)
    }

    pub fn update_question(&mut self, id: &str, patch: QuestionPatch) -> Result<(), DomainError> {
        self.apply(Mutation::UpdateQuestion {
            id: id.to_string(),
            patch,
        })
        .map(|_| ())
    }

    pub fn delete_question(&mut self, id: &str) -> Result<(), DomainError> {
        self.apply(Mutation::DeleteQuestion { id: id.to_string() })
            .map(|_| ())
    }

    pub fn rate_question(&mut self, id: &str, outcome: ReviewOutcome) -> Result<(), DomainError> {
        if self.question(id).is_none() {
            return Err(DomainError::QuestionNotFound(id.to_string()));
        }
        self.apply(Mutation::RecordReview {
            id: id.to_string(),
            outcome,
        })
        .map(|_| ())
    }

    /// Due questions, most overdue first, recomputed on every call.
    pub fn due_questions(&self) -> Vec<&Question> {
        review_scheduler::due_set(&self.state.questions, self.clock.now())
    }

    pub fn current_card(&self) -> Option<&Question> {
        review_scheduler::current_card(&self.state.questions, self.clock.now())
    }

    // --- Notes ---

    pub fn add_note(&mut self, draft: NoteDraft) -> Result<String, DomainError> {
        let now = self.clock.now();
        let id = Uuid::new_v4().to_string();
        let note = Note {
            id: id.clone(),
            folder: draft.folder,
            title: draft.title,
            content: draft.content,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
            versions: Vec::new(),
        };
        self.apply(Mutation::AddNote(note))?;
        Ok(id)
    }

    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> Result<(), DomainError> {
        self.apply(Mutation::UpdateNote {
            id: id.to_string(),
            patch,
            version: None,
        })
        .map(|_| ())
    }

    /// Snapshot the note as it is now, under an optional label.
    pub fn save_version(&mut self, id: &str, label: Option<&str>) -> Result<(), DomainError> {
        self.apply(Mutation::UpdateNote {
            id: id.to_string(),
            patch: NotePatch::default(),
            version: Some(VersionRequest {
                label: label.map(str::to_string),
            }),
        })
        .map(|_| ())
    }

    pub fn move_note(&mut self, id: &str, folder: &str) -> Result<(), DomainError> {
        self.update_note(
            id,
            NotePatch {
                folder: Some(folder.to_string()),
                ..NotePatch::default()
            },
        )
    }

    pub fn add_tag(&mut self, note_id: &str, tag: &str) -> Result<(), DomainError> {
        let tag = tag.trim();
        let Some(note) = self.note(note_id) else {
            return Err(DomainError::NoteNotFound(note_id.to_string()));
        };
        if tag.is_empty() || note.tags.iter().any(|t| t == tag) {
            return Ok(());
        }
        let tags: Vec<String> = note.tags.iter().cloned().chain([tag.to_string()]).collect();
        self.update_note(
            note_id,
            NotePatch {
                tags: Some(tags),
                ..NotePatch::default()
            },
        )
    }

    pub fn remove_tag(&mut self, note_id: &str, tag: &str) -> Result<(), DomainError> {
        let Some(note) = self.note(note_id) else {
            return Err(DomainError::NoteNotFound(note_id.to_string()));
        };
        let tags: Vec<String> = note.tags.iter().filter(|t| *t != tag).cloned().collect();
        self.update_note(
            note_id,
            NotePatch {
                tags: Some(tags),
                ..NotePatch::default()
            },
        )
    }

    pub fn restore_version(&mut self, note_id: &str, version_id: &str) -> Result<(), DomainError> {
        self.apply(Mutation::RestoreNoteVersion {
            note_id: note_id.to_string(),
            version_id: version_id.to_string(),
        })
        .map(|_| ())
    }

    pub fn delete_version(&mut self, note_id: &str, version_id: &str) -> Result<(), DomainError> {
        self.apply(Mutation::DeleteNoteVersion {
            note_id: note_id.to_string(),
            version_id: version_id.to_string(),
        })
        .map(|_| ())
    }

    pub fn delete_note(&mut self, id: &str) -> Result<(), DomainError> {
        self.apply(Mutation::DeleteNote { id: id.to_string() })
            .map(|_| ())
    }

    /// Notes whose body cites the question.
    pub fn notes_citing(&self, question_id: &str) -> Vec<&Note> {
        self.state
            .notes
            .iter()
            .filter(|n| extract_citations(&n.content).iter().any(|id| id == question_id))
            .collect()
    }

    // --- Folders ---

    pub fn declare_folder(&mut self, path: &str) -> Result<(), DomainError> {
        self.apply(Mutation::DeclareFolder {
            path: path.to_string(),
        })
        .map(|_| ())
    }

    pub fn set_folders(&mut self, folders: Vec<String>) -> Result<(), DomainError> {
        self.apply(Mutation::SetFolders { folders }).map(|_| ())
    }

    // --- Import / export ---

    pub fn preview_import(&self, document: &BackupDocument) -> ImportPreview {
        importer::preview_import(&self.state.questions, &self.state.notes, document)
    }

    pub fn import_backup(
        &mut self,
        document: BackupDocument,
        strategy: ImportStrategy,
    ) -> Result<(), DomainError> {
        self.apply(Mutation::Import { document, strategy }).map(|_| ())
    }

    pub fn export_backup(&self) -> BackupDocument {
        self.state.to_document(self.clock.now())
    }
}

impl<P: StorePersistence> QuestionLookup for RecordStore<P> {
    fn lookup_question(&self, id: &str) -> Option<&Question> {
        self.question(id)
    }
}

fn reduce(
    state: &StoreState,
    mutation: Mutation,
    now: DateTime<Utc>,
) -> Result<StoreState, DomainError> {
    let mut next = state.clone();
    match mutation {
        Mutation::AddQuestion(question) => {
            check_options(question.options.as_deref())?;
            if state.questions.iter().any(|q| q.id == question.id) {
                return Err(DomainError::InvalidQuestion(format!(
                    "duplicate id {}",
                    question.id
                )));
            }
            next.questions = prepend(question, &state.questions);
        }
        Mutation::UpdateQuestion { id, patch } => {
            if let Some(Some(options)) = &patch.options {
                check_options(Some(options.as_slice()))?;
            }
            next.questions = update_where(&state.questions, |q| q.id == id, |q| {
                patch_question(q, patch.clone(), now)
            });
        }
        Mutation::DeleteQuestion { id } => {
            next.questions.retain(|q| q.id != id);
        }
        Mutation::RecordReview { id, outcome } => {
            next.questions = update_where(&state.questions, |q| q.id == id, |q| {
                let update = review_scheduler::rate(q, outcome, now);
                Question {
                    next_review_at: update.next_review_at,
                    review_count: update.review_count,
                    ..q.clone()
                }
            });
        }
        Mutation::AddNote(note) => {
            next.folders = ensure_folder(&state.folders, &note.folder);
            next.notes = prepend(note, &state.notes);
        }
        Mutation::UpdateNote { id, patch, version } => {
            let exists = state.notes.iter().any(|n| n.id == id);
            if let Some(folder) = patch.folder.as_ref().filter(|_| exists) {
                next.folders = ensure_folder(&state.folders, folder);
            }
            next.notes = update_where(&state.notes, |n| n.id == id, |n| {
                let versions = match &version {
                    Some(request) => version_ledger::prepend(
                        &n.versions,
                        version_ledger::snapshot(n, request.label.as_deref(), now),
                    ),
                    None => n.versions.clone(),
                };
                Note {
                    folder: patch.folder.clone().unwrap_or_else(|| n.folder.clone()),
                    title: patch.title.clone().unwrap_or_else(|| n.title.clone()),
                    content: patch.content.clone().unwrap_or_else(|| n.content.clone()),
                    tags: patch.tags.clone().unwrap_or_else(|| n.tags.clone()),
                    updated_at: now,
                    versions,
                    ..n.clone()
                }
            });
        }
        Mutation::RestoreNoteVersion { note_id, version_id } => {
            let restored = state
                .notes
                .iter()
                .find(|n| n.id == note_id)
                .and_then(|n| n.find_version(&version_id))
                .map(version_ledger::restore);
            match restored {
                Some(restored) => {
                    next.notes = update_where(&state.notes, |n| n.id == note_id, |n| Note {
                        title: restored.title.clone(),
                        content: restored.content.clone(),
                        updated_at: now,
                        ..n.clone()
                    });
                }
                None => debug!(%note_id, %version_id, "Nothing to restore"),
            }
        }
        Mutation::DeleteNoteVersion { note_id, version_id } => {
            next.notes = update_where(&state.notes, |n| n.id == note_id, |n| {
                version_ledger::delete_version(n, &version_id)
            });
        }
        Mutation::DeleteNote { id } => {
            next.notes.retain(|n| n.id != id);
        }
        Mutation::DeclareFolder { path } => {
            next.folders = ensure_folder(&state.folders, &path);
        }
        Mutation::SetFolders { folders } => {
            next.folders = normalize_folders(&folders);
        }
        Mutation::Import { document, strategy } => {
            document.validate()?;
            if let Some(incoming) = document.mistakes {
                next.questions = importer::reconcile(&state.questions, incoming, strategy);
            }
            if let Some(incoming) = document.notes {
                next.notes = importer::reconcile(&state.notes, incoming, strategy);
            }
            if let Some(folders) = document.folders {
                next.folders = normalize_folders(&folders);
            }
            if document.settings.is_some() {
                next.settings = document.settings;
            }
            info!(
                ?strategy,
                questions = next.questions.len(),
                notes = next.notes.len(),
                "Imported backup"
            );
        }
    }
    Ok(next)
}

fn prepend<T: Clone>(record: T, existing: &[T]) -> Vec<T> {
    std::iter::once(record).chain(existing.iter().cloned()).collect()
}

/// New vector with matching records replaced by `update(record)`.
fn update_where<T, M, U>(records: &[T], matches: M, mut update: U) -> Vec<T>
where
    T: Clone,
    M: Fn(&T) -> bool,
    U: FnMut(&T) -> T,
{
    let mut found = false;
    let updated = records
        .iter()
        .map(|record| {
            if matches(record) {
                found = true;
                update(record)
            } else {
                record.clone()
            }
        })
        .collect();
    if !found {
        debug!("No record with that id, nothing updated");
    }
    updated
}

fn patch_question(question: &Question, patch: QuestionPatch, now: DateTime<Utc>) -> Question {
    let q = question.clone();
    Question {
        subject: patch.subject.unwrap_or(q.subject),
        kind: patch.kind.unwrap_or(q.kind),
        question_text: patch.question_text.unwrap_or(q.question_text),
        question_image: patch.question_image.unwrap_or(q.question_image),
        options: patch.options.unwrap_or(q.options),
        wrong_answer: patch.wrong_answer.unwrap_or(q.wrong_answer),
        correct_answer: patch.correct_answer.unwrap_or(q.correct_answer),
        explanation: patch.explanation.unwrap_or(q.explanation),
        ai_diagnosis: patch.ai_diagnosis.unwrap_or(q.ai_diagnosis),
        analysis: patch.analysis.unwrap_or(q.analysis),
        user_notes: patch.user_notes.unwrap_or(q.user_notes),
        tags: patch.tags.unwrap_or(q.tags),
        difficulty_rating: patch.difficulty_rating.unwrap_or(q.difficulty_rating),
        updated_at: Some(now),
        ..q
    }
}

fn check_options(options: Option<&[String]>) -> Result<(), DomainError> {
    match options {
        Some(options) if options.len() > MAX_QUESTION_OPTIONS => Err(DomainError::InvalidQuestion(
            format!(
                "{} options given, at most {} allowed",
                options.len(),
                MAX_QUESTION_OPTIONS
            ),
        )),
        _ => Ok(()),
    }
}

/// Declared folders plus `raw` and all of its ancestors.
fn ensure_folder(folders: &[String], raw: &str) -> Vec<String> {
    let path = FolderPath::parse(raw);
    let mut next = folders.to_vec();
    if path.is_root() || path.is_uncategorized() {
        return next;
    }
    for ancestor in path.ancestors_and_self() {
        if !next.contains(&ancestor) {
            next.push(ancestor);
        }
    }
    next
}

fn normalize_folders(folders: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(folders.len());
    for raw in folders {
        let path = FolderPath::parse(raw).as_path_string();
        if !path.is_empty() && !normalized.contains(&path) {
            normalized.push(path);
        }
    }
    normalized
}
