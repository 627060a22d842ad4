//! Error types for todo storage.
//!
//! # Design
//! `NotFound` and `EditConflict` get dedicated variants because callers map
//! them to distinct client-visible outcomes. Everything the backend reports
//! beyond that is passed through untouched in `Database`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the requested id exists.
    #[error("todo {0} not found")]
    NotFound(i64),

    /// The conditional update matched no row: the stored version moved on,
    /// or the record is gone. Either way the caller should re-read.
    #[error("edit conflict on todo {id} at version {version}")]
    EditConflict { id: i64, version: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
