//! Error type shared by the loaders, the comparators and the binaries.
//!
//! Every failure is surfaced to the caller; nothing is retried or patched up
//! locally. The binaries turn a `CompareError` into a stderr message and an
//! exit code via [`CompareError::exit_code`].

use phylotree::tree::TreeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading inputs or comparing them.
#[derive(Error, Debug)]
pub enum CompareError {
    /// An input or output file could not be read or written
    #[error("Could not access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The tree text is not a valid Newick tree
    #[error("Failed to parse tree {path:?}: {reason}")]
    TreeParse { path: PathBuf, reason: String },
    /// The NEXUS container has no `Begin ...` or no `End;` line
    #[error("No tree block in {path:?}: missing '{marker}' line")]
    MissingBlock { path: PathBuf, marker: &'static str },
    /// The parsed tree is structurally unusable (no root, dangling node ids)
    #[error("Malformed tree structure: {0}")]
    Tree(#[from] TreeError),
    /// A date column value is not `YYYY-MM-DD`
    #[error("Invalid date '{value}' in {path:?} at line {line}: {source}")]
    DateParse {
        path: PathBuf,
        line: usize,
        value: String,
        #[source]
        source: InvalidDate,
    },
    /// A table row lacks one of the columns it must have
    #[error("Missing tab-separated column in {path:?} at line {line}")]
    MalformedRow { path: PathBuf, line: usize },
    /// A table header does not name a required column
    #[error("No '{column}' column in the header of {path:?}")]
    MissingColumn { path: PathBuf, column: String },
    /// The two inputs share nothing to compare
    #[error("Nothing to compare: no {0} in common between the two inputs")]
    EmptyInput(&'static str),
}

impl CompareError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompareError::Io { path: path.into(), source }
    }

    /// Process exit code used by the command-line tools.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompareError::Io { .. } => 2,
            CompareError::TreeParse { .. }
            | CompareError::MissingBlock { .. }
            | CompareError::Tree(_) => 3,
            CompareError::DateParse { .. }
            | CompareError::MalformedRow { .. }
            | CompareError::MissingColumn { .. } => 4,
            CompareError::EmptyInput(_) => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompareError>;

/// Why a date value was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidDate {
    /// The year is signed or does not have exactly four digits
    #[error("year must be exactly four digits")]
    Year,
    #[error(transparent)]
    Chrono(#[from] chrono::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_group_by_input_kind() {
        let io = CompareError::io("a.nwk", std::io::Error::from(std::io::ErrorKind::NotFound));
        let block = CompareError::MissingBlock { path: "a.nexus".into(), marker: "End;" };
        let rows = CompareError::MalformedRow { path: "d.tsv".into(), line: 3 };
        let empty = CompareError::EmptyInput("taxa");
        let column = CompareError::MissingColumn {
            path: "meta.tsv".into(),
            column: "date".into(),
        };

        assert_eq!(io.exit_code(), 2);
        assert_eq!(block.exit_code(), 3);
        assert_eq!(rows.exit_code(), 4);
        assert_eq!(empty.exit_code(), 5);
        assert_eq!(column.exit_code(), 4);
    }

    #[test]
    fn messages_name_the_offending_input() {
        let err = CompareError::MissingBlock { path: "run.nexus".into(), marker: "Begin" };
        let msg = err.to_string();
        assert!(msg.contains("run.nexus"));
        assert!(msg.contains("Begin"));
    }
}
