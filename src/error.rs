// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Error types shared by the netlist parser, the placement parser and the
//! assembled design.
//!
//! Structural errors abort a load. Data errors on a single record or field are
//! pushed onto a diagnostics list instead, so one bad line does not prevent the
//! rest of a large design from loading.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Result type for netlist/placement operations
pub type PlcResult<T> = Result<T, PlcError>;

#[derive(Debug, Clone, Error)]
pub enum PlcError {
    /// A structural token appeared out of the expected sequence.
    #[error("line {line}: malformed record: {message}")]
    MalformedRecord { line: usize, message: String },

    /// The stream ended while a node record was still open.
    #[error("input ended inside the node record opened at line {line}")]
    TruncatedInput { line: usize },

    #[error("line {line}: malformed placement: {message}")]
    MalformedPlacement { line: usize, message: String },

    #[error("{element}: missing required attribute `{attribute}`")]
    MissingRequiredAttribute { element: String, attribute: String },

    #[error("index {index} is out of range ({len} elements)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("pin {pin} refers to macro {owner}, which is not in the netlist")]
    DanglingPinReference { pin: String, owner: String },

    #[error("invalid operation on {element}: {message}")]
    InvalidOperation { element: String, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PlcError {
    /// Whether this error aborts a whole load rather than a single record.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlcError::MalformedRecord { .. } | PlcError::TruncatedInput { .. } | PlcError::Io { .. }
        )
    }
}

/// Log a recoverable error and keep it for the caller.
pub(crate) fn record(diagnostics: &mut Vec<PlcError>, error: PlcError) {
    debug_assert!(!error.is_fatal(), "fatal error recorded as diagnostic: {error}");
    log::warn!("[WARN] {error}");
    diagnostics.push(error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(PlcError::TruncatedInput { line: 3 }.is_fatal());
        assert!(!PlcError::IndexOutOfRange { index: 9, len: 2 }.is_fatal());
        assert!(!PlcError::DanglingPinReference {
            pin: "m1/a".to_string(),
            owner: "m1".to_string(),
        }
        .is_fatal());
    }

    #[test]
    fn test_display_mentions_line() {
        let err = PlcError::MalformedRecord {
            line: 12,
            message: "expected `name`".to_string(),
        };
        assert_eq!(err.to_string(), "line 12: malformed record: expected `name`");
    }

    #[test]
    fn test_record_keeps_diagnostic() {
        let mut diagnostics = Vec::new();
        record(
            &mut diagnostics,
            PlcError::IndexOutOfRange { index: 4, len: 1 },
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "fatal error recorded")]
    fn test_record_rejects_fatal_error() {
        record(&mut Vec::new(), PlcError::TruncatedInput { line: 1 });
    }
}
