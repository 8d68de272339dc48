//! Error types shared by the Aviary crates.
//!
//! Failures fall into two disjoint classes. Resource exhaustion
//! ([`StoreError::AllocationFailure`], I/O) is fatal to the operation in
//! progress. Data validity problems ([`ValueError`], [`Rejection`]) only
//! fail the record or query instance that carries them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A single field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A mandatory field was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the field.
        field: &'static str,
    },

    /// The text does not have the expected shape.
    #[error("malformed {kind}")]
    Malformed {
        /// What was being parsed.
        kind: &'static str,
    },

    /// The text is well formed but the value is outside its domain.
    #[error("{kind} out of range")]
    OutOfRange {
        /// What was being parsed.
        kind: &'static str,
    },

    /// Two fields of the same record contradict each other.
    #[error("inconsistent record: {0}")]
    Inconsistent(&'static str),

    /// The record refers to an entity that is not in the store.
    #[error("unknown {kind}")]
    UnknownReference {
        /// Kind of the missing entity.
        kind: &'static str,
    },
}

/// Failures of the store itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A pool could not reserve a new block.
    #[error("failed to allocate {bytes} bytes for {what}")]
    AllocationFailure {
        /// The pool that ran out of memory.
        what: &'static str,
        /// Size of the rejected reservation.
        bytes: usize,
    },

    /// A lookup by identifier found nothing.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of the entity looked up.
        kind: &'static str,
        /// Canonical form of the identifier.
        id: String,
    },
}

impl StoreError {
    /// Returns `true` for errors that must abort the current load.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::AllocationFailure { .. })
    }
}

/// Why a single record was not committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The record did not split into the expected number of fields.
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        /// Number of fields the grammar declares.
        expected: usize,
        /// Number of fields the record actually had.
        found: usize,
    },

    /// A field callback refused its value.
    #[error("field {index}: {source}")]
    Field {
        /// Zero-based position of the field.
        index: usize,
        /// The validation failure.
        #[source]
        source: ValueError,
    },

    /// The record is not valid UTF-8.
    #[error("record is not valid UTF-8")]
    Encoding,
}

/// Failures that abort a parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store could not accept a record.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures that abort a dataset load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// An input or rejection file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A load step stopped on a fatal error.
    #[error("loading {step} failed: {source}")]
    Step {
        /// Name of the step (`users`, `flights`, ...).
        step: &'static str,
        /// What went wrong.
        #[source]
        source: ParseError,
    },
}

/// A query line could not be turned into a query instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The line had no query identifier.
    #[error("empty query line")]
    Empty,

    /// The identifier token is not a number optionally followed by `F`.
    #[error("malformed query identifier {0:?}")]
    MalformedType(String),

    /// No query type is registered under this identifier.
    #[error("unknown query type {0}")]
    UnknownType(u8),

    /// The query type refused the arguments.
    #[error("invalid arguments for query {query}: {source}")]
    Arguments {
        /// Identifier of the query type.
        query: u8,
        /// Why the arguments were refused.
        #[source]
        source: ValueError,
    },

    /// A double-quoted argument was never closed.
    #[error("unterminated quoted argument")]
    UnterminatedQuote,
}

/// Failures while loading a [`crate::StoreConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid configuration JSON.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = Rejection::Field {
            index: 4,
            source: ValueError::Malformed { kind: "date" },
        };
        assert_eq!(err.to_string(), "field 4: malformed date");

        let err = StoreError::NotFound {
            kind: "user",
            id: "JoAo".into(),
        };
        assert_eq!(err.to_string(), "user JoAo not found");

        let err = LoadError::Open {
            path: PathBuf::from("/nope/users.csv"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "cannot open /nope/users.csv: missing");
    }

    #[test]
    fn only_allocation_is_fatal() {
        assert!(StoreError::AllocationFailure {
            what: "users",
            bytes: 64
        }
        .is_fatal());
        assert!(!StoreError::NotFound {
            kind: "flight",
            id: "1".into()
        }
        .is_fatal());
    }

    #[test]
    fn store_errors_convert_into_parse_errors() {
        let err: ParseError = StoreError::AllocationFailure {
            what: "strings",
            bytes: 8,
        }
        .into();
        assert!(matches!(err, ParseError::Store(e) if e.is_fatal()));
    }
}
