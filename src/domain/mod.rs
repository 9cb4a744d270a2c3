// src/domain/mod.rs
pub mod backup;
pub mod error;
pub mod folder;
pub mod note;
pub mod question;
pub mod tree;

pub use backup::BackupDocument;
pub use error::DomainError;
pub use folder::FolderPath;
pub use note::{Note, NoteVersion};
pub use question::{Difficulty, Question, QuestionAnalysis, QuestionKind};
pub use tree::{FolderNode, NoteNode, TreeNode};
