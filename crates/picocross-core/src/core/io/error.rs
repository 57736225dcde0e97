use crate::core::units::UnitsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineListError {
    #[error("File or directory not found: '{path}'", path = path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error in '{path}' on line {line}: {kind}", path = path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        kind: ParseErrorKind,
    },

    #[error("Cannot write cross-section to '{path}': {source}", path = path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: OutputError,
    },

    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,
}

/// Failures while serialising a cross-section table.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Units(#[from] UnitsError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("expected at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },
    #[error("invalid integer in column {column} (value: '{value}')")]
    InvalidInt { column: usize, value: String },
    #[error("invalid number in column {column} (value: '{value}')")]
    InvalidFloat { column: usize, value: String },
    #[error("duplicate state id {0}")]
    DuplicateId(u64),
}
