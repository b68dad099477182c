//! Error type for puzzle construction, parsing and results files.
//!
//! The search itself never fails: "no placement" and "no solution" are
//! ordinary outcomes. Everything here is raised while building inputs or
//! touching the file system.

use std::fmt;
use std::path::PathBuf;

use crate::grid::Cell;

/// Errors raised while validating or loading puzzle data.
#[derive(Debug)]
pub enum PuzzleError {
    /// A shape pattern is empty, ragged, non-binary or has no filled cells.
    InvalidPattern {
        /// What is wrong with the pattern
        reason: String,
    },

    /// A grid is empty, ragged or holds values below -1.
    InvalidGrid {
        /// What is wrong with the grid
        reason: String,
    },

    /// Shape ids must be positive since they are written into the grid.
    InvalidShapeId {
        /// The rejected id
        id: Cell,
    },

    /// Two shapes of one puzzle share an id.
    DuplicateShapeId {
        /// The repeated id
        id: Cell,
    },

    /// The initial grid already contains a cell labelled with a shape id.
    ShapeIdInGrid {
        /// The colliding id
        id: Cell,
    },

    /// The initial grid holds a positive label that belongs to no shape.
    UnknownLabel {
        /// The stray label
        label: Cell,
    },

    /// A puzzle or results file could not be parsed.
    Parse {
        /// 1-based line number of the offending line
        line: usize,
        /// What was expected
        reason: String,
    },

    /// No built-in puzzle has the requested name.
    UnknownPuzzle {
        /// The requested name
        name: String,
    },

    /// File system operation failed.
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { reason } => write!(f, "Invalid shape pattern: {reason}"),
            Self::InvalidGrid { reason } => write!(f, "Invalid grid: {reason}"),
            Self::InvalidShapeId { id } => {
                write!(f, "Shape id {id} is not a positive integer")
            }
            Self::DuplicateShapeId { id } => {
                write!(f, "Shape id {id} is used by more than one shape")
            }
            Self::ShapeIdInGrid { id } => {
                write!(f, "Shape id {id} already occupies cells of the initial grid")
            }
            Self::UnknownLabel { label } => {
                write!(f, "Cell label {label} does not belong to any shape")
            }
            Self::Parse { line, reason } => write!(f, "Parse error on line {line}: {reason}"),
            Self::UnknownPuzzle { name } => write!(f, "No built-in puzzle named '{name}'"),
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for PuzzleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for puzzle results
pub type Result<T> = std::result::Result<T, PuzzleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_parse_error_reports_line() {
        let error = PuzzleError::Parse {
            line: 7,
            reason: "expected an integer".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Parse error on line 7: expected an integer"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn test_file_system_error_exposes_source() {
        let error = PuzzleError::FileSystem {
            path: PathBuf::from("results/out.txt"),
            operation: "open",
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(error.to_string().contains("results/out.txt"));
        assert!(error.source().is_some(), "I/O errors should be chained");
    }
}
