//! Error types
//!
//! Only loading can fail. Everything after a [`Dataset`](crate::Dataset) exists
//! is total: missing compliance entries and out-of-range scores are handled
//! where they are read, never raised.

use thiserror::Error;

/// Failure to build a [`Dataset`](crate::Dataset) from its JSON resource.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The resource could not be read.
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// Structural or type violation in the resource.
    #[error("malformed dataset at line {line}, column {column}: {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },
}

impl DatasetError {
    /// Malformed error for a violation found after parsing, where no
    /// source position is available.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        DatasetError::Malformed {
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, DatasetError::Malformed { .. })
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return DatasetError::Io(err.into());
        }
        DatasetError::Malformed {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Invalid organization list supplied by the host.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OrgSetError {
    #[error("organization list is empty")]
    Empty,

    #[error("duplicate organization: {0}")]
    Duplicate(String),

    #[error("blank organization identifier at position {0}")]
    Blank(usize),
}
