// src/application/mod.rs
pub mod clock;
pub mod importer;
pub mod library;
pub mod record_store;
pub mod review_scheduler;
pub mod tree_organizer;
pub mod version_ledger;

pub use clock::{Clock, SystemClock};
pub use importer::{ImportPreview, ImportStrategy};
pub use library::StudyStats;
pub use record_store::{
    Mutation, NoteDraft, NotePatch, QuestionDraft, QuestionPatch, RecordStore, StorePersistence,
    StoreState,
};
pub use review_scheduler::ReviewOutcome;
pub use tree_organizer::{ExpandedPaths, SortMode};
