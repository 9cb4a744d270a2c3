// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Question not found: {0}")]
    QuestionNotFound(String),
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Invalid backup document: {0}")]
    InvalidBackup(String),
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}
