//! One comparison run: two trees, optionally two date tables, one report line.
//!
//! The report line `<branch_rmse>,<date_rmse>,<date_median>` is what other
//! tooling parses, so its shape is fixed: floats are written as Python's `repr`
//! writes them (see [`format_float`]) and date metrics that were not requested
//! are written as `-1`.

use crate::compare::{BranchComparison, compare_lengths};
use crate::dates::{DateComparison, DateTable, compare_dates};
use crate::error::Result;
use crate::index::build_index;
use crate::io::{TreeFormat, read_tree};
use log::info;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

/// Sentinel written for date metrics that were not computed.
pub const NOT_COMPUTED: i64 = -1;

/// Shortest round-trip form of `x`, always with a decimal point or exponent.
///
/// Scientific notation kicks in below `1e-4` and from `1e16` on, with a signed
/// exponent of at least two digits: `4.4721359549995794e+19`, `1e-05`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{x:?}");
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// Inputs of a comparison run.
#[derive(Debug, Clone, Default)]
pub struct ComparisonInput {
    /// Reconstructed tree
    pub comparator_tree: PathBuf,
    /// Ground-truth tree
    pub ground_truth_tree: PathBuf,
    /// Date table of the comparator
    pub comparator_dates: Option<PathBuf>,
    /// Date table of the ground truth
    pub ground_truth_dates: Option<PathBuf>,
    pub format: TreeFormat,
    pub use_real_taxa: bool,
}

impl ComparisonInput {
    pub fn new(
        comparator_tree: impl Into<PathBuf>,
        ground_truth_tree: impl Into<PathBuf>,
    ) -> Self {
        ComparisonInput {
            comparator_tree: comparator_tree.into(),
            ground_truth_tree: ground_truth_tree.into(),
            ..Default::default()
        }
    }

    /// Adds both date tables; dates are only compared when both are present.
    pub fn with_dates(
        mut self,
        comparator: impl Into<PathBuf>,
        ground_truth: impl Into<PathBuf>,
    ) -> Self {
        self.comparator_dates = Some(comparator.into());
        self.ground_truth_dates = Some(ground_truth.into());
        self
    }
}

/// Combined result of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonReport {
    pub branch: BranchComparison,
    pub dates: Option<DateComparison>,
}

impl ComparisonReport {
    /// Date RMSE, or `-1.0` when dates were not compared.
    pub fn date_rmse(&self) -> f64 {
        self.dates.map_or(NOT_COMPUTED as f64, |d| d.rmse_days)
    }

    /// Median squared day difference, or `-1` when dates were not compared.
    pub fn date_median(&self) -> i64 {
        self.dates.map_or(NOT_COMPUTED, |d| d.median_sq_days)
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},", format_float(self.branch.rmse))?;
        match self.dates {
            Some(d) => write!(f, "{},{}", format_float(d.rmse_days), d.median_sq_days),
            None => write!(f, "{NOT_COMPUTED},{NOT_COMPUTED}"),
        }
    }
}

/// Run a full comparison.
///
/// Date tables are read only when both paths are set; a single table is
/// ignored and reported as not computed.
///
/// # Errors
/// Any loader or comparator error is returned unchanged.
pub fn run_comparison(input: &ComparisonInput) -> Result<ComparisonReport> {
    let t0 = Instant::now();
    let comparator = read_tree(&input.comparator_tree, input.format, input.use_real_taxa)?;
    let ground_truth = read_tree(&input.ground_truth_tree, input.format, input.use_real_taxa)?;
    info!(
        "Read trees with {} and {} leaves in {:.3}s",
        comparator.get_leaves().len(),
        ground_truth.get_leaves().len(),
        t0.elapsed().as_secs_f64()
    );

    let t1 = Instant::now();
    let index_a = build_index(&comparator)?;
    let index_b = build_index(&ground_truth)?;
    let branch = compare_lengths(&index_a, &index_b)?;
    info!(
        "Matched {} node signatures, branch RMSE {} in {:.3}s",
        branch.matched,
        branch.rmse,
        t1.elapsed().as_secs_f64()
    );

    let dates = match (&input.comparator_dates, &input.ground_truth_dates) {
        (Some(a), Some(b)) => {
            let t2 = Instant::now();
            let table_a = DateTable::from_file(a)?;
            let table_b = DateTable::from_file(b)?;
            let cmp = compare_dates(&table_a, &table_b)?;
            info!(
                "Matched {} dated taxa, date RMSE {} days in {:.3}s",
                cmp.matched,
                cmp.rmse_days,
                t2.elapsed().as_secs_f64()
            );
            Some(cmp)
        }
        (None, None) => None,
        _ => {
            info!("Only one date table given; date metrics not computed");
            None
        }
    };

    Ok(ComparisonReport { branch, dates })
}
