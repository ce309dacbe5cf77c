//! Crate root: lightweight module orchestration and public re-exports.
//!
//! Modules:
//! - `signature`: order-independent leaf-set signatures.
//! - `index`: signature → node index of a tree.
//! - `compare`: branch-length RMSE over nodes matched by signature.
//! - `dates`: date tables, date RMSE and lower median of squared differences.
//! - `io`: reading Newick / NEXUS tree files and writing TSV tables.
//! - `report`: one full comparison run and its report line.
//! - `batch`: many trials against one ground truth, in parallel.
//! - `error`: the shared error type.
//! - `api`: Python bindings via `pyo3` (gated behind "python" feature).

pub mod batch;
pub mod compare;
pub mod dates;
pub mod error;
pub mod index;
pub mod io;
pub mod report;
pub mod signature;

#[cfg(feature = "python")]
pub mod api;

// Re-export frequently used types & functions
pub use compare::{BranchComparison, compare_lengths, compare_trees};
pub use dates::{DateComparison, DateTable, compare_date_files, compare_dates};
pub use error::CompareError;
pub use index::{NodeIndex, build_index};
pub use io::{TreeFormat, read_tree, write_tsv};
pub use report::{ComparisonInput, ComparisonReport, run_comparison};
pub use signature::LeafSignature;
