//! Readers for ExoMol line-list files and writers for computed cross-sections.
//!
//! ExoMol files are whitespace-delimited tables. Only the leading columns the pipeline
//! needs are parsed; trailing columns (quantum numbers, lifetimes, ...) are ignored.

pub mod error;
pub mod output;
pub mod states;
pub mod traits;
pub mod transitions;

pub(crate) mod fields;
