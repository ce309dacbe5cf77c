//! Python binding layer for tree and date comparisons.
//!
//! Mirrors the command-line tool so a sweep driver can call the comparison
//! in-process instead of parsing the report line of a subprocess.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::compare::compare_lengths;
use crate::dates::compare_date_files;
use crate::error::CompareError;
use crate::index::build_index;
use crate::io::{TreeFormat, read_tree};
use crate::report::{ComparisonInput, run_comparison};

fn to_py_err(e: CompareError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Compare two trees and, optionally, two date tables.
///
/// Args:
///     path1: Comparator (reconstructed) tree, Newick or NEXUS
///     path2: Ground-truth tree, Newick or NEXUS
///     tsv1: Date table of the comparator (default: None)
///     tsv2: Date table of the ground truth (default: None)
///     use_real_taxa: Use TRANSLATE block for taxon names when available (default: False)
///
/// Returns:
///     A tuple (branch_rmse, date_rmse, date_median); the date values are -1
///     unless both tables are given.
///
/// Raises:
///     ValueError: If a file cannot be parsed or the inputs share nothing to compare
#[pyfunction]
#[pyo3(signature = (path1, path2, tsv1=None, tsv2=None, use_real_taxa=false))]
fn compare(
    path1: String,
    path2: String,
    tsv1: Option<String>,
    tsv2: Option<String>,
    use_real_taxa: bool,
) -> PyResult<(f64, f64, f64)> {
    let mut input = ComparisonInput::new(path1, path2);
    input.use_real_taxa = use_real_taxa;
    if let (Some(a), Some(b)) = (tsv1, tsv2) {
        input = input.with_dates(a, b);
    }

    let report = run_comparison(&input).map_err(to_py_err)?;
    Ok((report.branch.rmse, report.date_rmse(), report.date_median() as f64))
}

/// Branch-length RMSE between two trees.
///
/// Returns:
///     A tuple (rmse, matched_nodes)
///
/// Raises:
///     ValueError: If a tree cannot be parsed or no node signature is shared
#[pyfunction]
#[pyo3(signature = (path1, path2, use_real_taxa=false))]
fn branch_length_rmse(
    path1: String,
    path2: String,
    use_real_taxa: bool,
) -> PyResult<(f64, usize)> {
    let tree_a = read_tree(&path1, TreeFormat::Auto, use_real_taxa).map_err(to_py_err)?;
    let tree_b = read_tree(&path2, TreeFormat::Auto, use_real_taxa).map_err(to_py_err)?;
    let index_a = build_index(&tree_a).map_err(|e| to_py_err(e.into()))?;
    let index_b = build_index(&tree_b).map_err(|e| to_py_err(e.into()))?;

    let cmp = compare_lengths(&index_a, &index_b).map_err(to_py_err)?;
    Ok((cmp.rmse, cmp.matched))
}

/// Date RMSE (days) and lower median of squared day differences.
///
/// Returns:
///     A tuple (rmse_days, median_squared_days)
///
/// Raises:
///     ValueError: If a date is not YYYY-MM-DD or no taxon is shared
#[pyfunction]
fn date_rmse(tsv1: String, tsv2: String) -> PyResult<(f64, i64)> {
    let cmp = compare_date_files(&tsv1, &tsv2).map_err(to_py_err)?;
    Ok((cmp.rmse_days, cmp.median_sq_days))
}

/// Python module definition
#[pymodule]
fn rust_python_tree_rmse(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compare, m)?)?;
    m.add_function(wrap_pyfunction!(branch_length_rmse, m)?)?;
    m.add_function(wrap_pyfunction!(date_rmse, m)?)?;
    Ok(())
}
