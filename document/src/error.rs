//! FILENAME: document/src/error.rs
//! Integrity errors: invalid operations are rejected before any mutation.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Sheet index {0} out of range")]
    SheetIndexOutOfRange(usize),

    #[error("Cannot delete the last sheet")]
    LastSheet,

    #[error("Sheet name cannot be empty")]
    EmptySheetName,

    #[error("Sheet '{0}' already exists")]
    DuplicateSheetName(String),
}

pub type Result<T> = std::result::Result<T, DocumentError>;
