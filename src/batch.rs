//! Many trial outputs compared against one ground truth.
//!
//! A manifest lists the trials, one per row after a header:
//!
//! ```text
//! trial	tree	dates
//! run_01	run_01/out.nexus	run_01/dates.tsv
//! run_02	run_02/out.nexus
//! ```
//!
//! Relative paths are taken from the manifest's directory. Every trial yields
//! one result row, in manifest order.

use crate::compare::compare_lengths;
use crate::dates::{DateTable, compare_dates};
use crate::error::{CompareError, Result};
use crate::index::{NodeIndex, build_index};
use crate::io::{TreeFormat, read_tree};
use crate::report::{NOT_COMPUTED, format_float};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Columns of a batch result table.
pub const BATCH_HEADER: [&str; 5] =
    ["trial", "branch_rmse", "matched_nodes", "date_rmse", "date_median"];

/// One manifest row.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub name: String,
    pub tree: PathBuf,
    pub dates: Option<PathBuf>,
}

/// The ground truth every trial is compared against.
#[derive(Debug, Clone)]
pub struct GroundTruth {
    pub index: NodeIndex,
    pub dates: Option<DateTable>,
}

impl GroundTruth {
    /// Load the truth tree and, when given, its date table.
    pub fn load<P: AsRef<Path>>(
        tree: P,
        dates: Option<P>,
        format: TreeFormat,
        use_real_taxa: bool,
    ) -> Result<Self> {
        let tree = read_tree(tree, format, use_real_taxa)?;
        let index = build_index(&tree)?;
        let dates = dates.map(DateTable::from_file).transpose()?;
        Ok(GroundTruth { index, dates })
    }
}

/// A trial that could not be compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTrial {
    pub name: String,
    pub message: String,
    pub exit_code: i32,
}

/// Parse manifest text; relative paths are joined onto `base`.
///
/// # Errors
/// `MalformedRow` for a row without a tree column.
pub fn parse_manifest(content: &str, path: &Path, base: &Path) -> Result<Vec<Trial>> {
    content
        .lines()
        .enumerate()
        .skip(1)
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            let mut parts = line.split('\t');
            match (parts.next(), parts.next().filter(|t| !t.is_empty())) {
                (Some(name), Some(tree)) => Ok(Trial {
                    name: name.to_string(),
                    tree: base.join(tree),
                    dates: parts.next().filter(|d| !d.is_empty()).map(|d| base.join(d)),
                }),
                _ => Err(CompareError::MalformedRow { path: path.to_path_buf(), line: line_no }),
            }
        })
        .collect()
}

/// Read a manifest file.
pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<Trial>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| CompareError::io(path, e))?;
    let base = path.parent().unwrap_or(Path::new(""));
    parse_manifest(&content, path, base)
}

/// Compare one trial; the row follows [`BATCH_HEADER`].
///
/// Date metrics are `-1` unless both the trial and the truth have dates.
pub fn run_trial(
    trial: &Trial,
    truth: &GroundTruth,
    format: TreeFormat,
    use_real_taxa: bool,
) -> Result<Vec<String>> {
    let tree = read_tree(&trial.tree, format, use_real_taxa)?;
    let branch = compare_lengths(&build_index(&tree)?, &truth.index)?;

    let (date_rmse, date_median) = match (&trial.dates, &truth.dates) {
        (Some(path), Some(truth_dates)) => {
            let cmp = compare_dates(&DateTable::from_file(path)?, truth_dates)?;
            (format_float(cmp.rmse_days), cmp.median_sq_days.to_string())
        }
        _ => (NOT_COMPUTED.to_string(), NOT_COMPUTED.to_string()),
    };

    Ok(vec![
        trial.name.clone(),
        format_float(branch.rmse),
        branch.matched.to_string(),
        date_rmse,
        date_median,
    ])
}

/// Compare all trials in parallel. Results come back in manifest order.
pub fn run_batch(
    trials: &[Trial],
    truth: &GroundTruth,
    format: TreeFormat,
    use_real_taxa: bool,
) -> Vec<std::result::Result<Vec<String>, FailedTrial>> {
    // Errors become plain data before leaving the worker threads.
    trials
        .par_iter()
        .map(|trial| {
            run_trial(trial, truth, format, use_real_taxa).map_err(|e| FailedTrial {
                name: trial.name.clone(),
                message: e.to_string(),
                exit_code: e.exit_code(),
            })
        })
        .collect()
}
