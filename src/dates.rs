//! Per-taxon date tables and their comparison.
//!
//! A date table is a header-first TSV: column 0 is the taxon (strain) name and
//! column 1 a `YYYY-MM-DD` date. Anything after the first space in the date
//! column (a time of day, say) is ignored:
//!
//! ```text
//! strain	date
//! hCoV-19/A/1	2020-03-01
//! hCoV-19/B/2	2020-03-04 12:00:00
//! ```
//!
//! Two tables are compared over the taxa they share, in the first table's order.

use crate::error::{CompareError, InvalidDate, Result};
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date column value, keeping only the text before the first space.
///
/// The year must be four unsigned digits; `%Y` alone would also take `202` or
/// `+2020`.
pub fn parse_date(value: &str) -> std::result::Result<NaiveDate, InvalidDate> {
    let date = value.split(' ').next().unwrap_or(value);
    let year = date.split('-').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidDate::Year);
    }
    Ok(NaiveDate::parse_from_str(date, DATE_FORMAT)?)
}

/// Rows of a header-first TSV, taking the taxon and the date from the given
/// column positions.
fn parse_rows(
    content: &str,
    path: &Path,
    taxon_col: usize,
    date_col: usize,
) -> Result<Vec<(String, NaiveDate)>> {
    content
        .lines()
        .enumerate()
        .skip(1)
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            let parts: Vec<&str> = line.split('\t').collect();
            let malformed = || CompareError::MalformedRow {
                path: path.to_path_buf(),
                line: line_no,
            };
            let taxon = parts.get(taxon_col).ok_or_else(malformed)?;
            let value = parts.get(date_col).ok_or_else(malformed)?;
            let date = parse_date(value).map_err(|source| CompareError::DateParse {
                path: path.to_path_buf(),
                line: line_no,
                value: value.to_string(),
                source,
            })?;
            Ok((taxon.to_string(), date))
        })
        .collect()
}

/// Every `(taxon, date)` row of a table, in file order, duplicates included.
///
/// The first line is the header and is skipped; the taxon is column 0 and the
/// date column 1. Lines are trimmed; blank lines are ignored.
///
/// # Errors
/// - `MalformedRow` when a line has no tab-separated date column
/// - `DateParse` when the date column is not `YYYY-MM-DD`
pub fn parse_date_rows(content: &str, path: &Path) -> Result<Vec<(String, NaiveDate)>> {
    parse_rows(content, path, 0, 1)
}

/// Like [`parse_date_rows`], but the columns are looked up by header name.
///
/// Suits metadata tables such as Nextstrain's, where `date` is not the second
/// column.
///
/// # Errors
/// `MissingColumn` when the header lacks either name, then as [`parse_date_rows`].
pub fn parse_named_date_rows(
    content: &str,
    path: &Path,
    taxon_column: &str,
    date_column: &str,
) -> Result<Vec<(String, NaiveDate)>> {
    let header = content.lines().next().unwrap_or_default().trim();
    let columns: Vec<&str> = header.split('\t').collect();
    let find = |name: &str| {
        columns
            .iter()
            .position(|col| *col == name)
            .ok_or_else(|| CompareError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let taxon_col = find(taxon_column)?;
    let date_col = find(date_column)?;
    parse_rows(content, path, taxon_col, date_col)
}

/// Read all rows of a date table file.
pub fn read_date_rows<P: AsRef<Path>>(path: P) -> Result<Vec<(String, NaiveDate)>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| CompareError::io(path, e))?;
    parse_date_rows(&content, path)
}

/// Read the `taxon_column`/`date_column` rows of a table file.
pub fn read_named_date_rows<P: AsRef<Path>>(
    path: P,
    taxon_column: &str,
    date_column: &str,
) -> Result<Vec<(String, NaiveDate)>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| CompareError::io(path, e))?;
    parse_named_date_rows(&content, path, taxon_column, date_column)
}

/// Taxon → date, in first-insertion order.
///
/// A taxon listed twice keeps its first position but takes the later date.
#[derive(Debug, Clone, Default)]
pub struct DateTable {
    entries: Vec<(String, NaiveDate)>,
    positions: HashMap<String, usize>,
}

impl DateTable {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, NaiveDate)>,
    {
        let mut table = DateTable::default();
        for (taxon, date) in rows {
            table.insert(taxon, date);
        }
        table
    }

    /// Load a date table file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = Self::from_rows(read_date_rows(&path)?);
        debug!("Read {} dated taxa from {:?}", table.len(), path.as_ref());
        Ok(table)
    }

    pub fn insert(&mut self, taxon: String, date: NaiveDate) {
        match self.positions.get(&taxon) {
            Some(&pos) => self.entries[pos].1 = date,
            None => {
                self.positions.insert(taxon.clone(), self.entries.len());
                self.entries.push((taxon, date));
            }
        }
    }

    pub fn get(&self, taxon: &str) -> Option<NaiveDate> {
        self.positions.get(taxon).map(|&pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NaiveDate)> {
        self.entries.iter().map(|(taxon, date)| (taxon.as_str(), *date))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a date comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateComparison {
    /// Root-mean-square difference in days
    pub rmse_days: f64,

    /// Lower median of the squared day differences
    pub median_sq_days: i64,

    /// Number of taxa dated in both tables
    pub matched: usize,
}

/// Squared day differences `(a - b)²` for taxa in both tables, in `a`'s order.
pub fn squared_day_differences(a: &DateTable, b: &DateTable) -> Vec<i64> {
    a.iter()
        .filter_map(|(taxon, date_a)| {
            b.get(taxon).map(|date_b| {
                let days = date_a.signed_duration_since(date_b).num_days();
                days * days
            })
        })
        .collect()
}

/// Element at index `n / 2` of the ascending sort.
///
/// Called the lower median here after the convention it reproduces, though for
/// even `n` the element picked is the upper of the two middle values, never
/// their mean: `[1, 4, 9, 16]` gives `9`.
pub fn lower_median(values: &[i64]) -> Option<i64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.get(sorted.len() / 2).copied()
}

/// Compare two date tables.
///
/// # Errors
/// Returns `CompareError::EmptyInput` when no taxon is dated in both tables.
pub fn compare_dates(a: &DateTable, b: &DateTable) -> Result<DateComparison> {
    let squared = squared_day_differences(a, b);
    debug!("Matched {} of {} / {} dated taxa", squared.len(), a.len(), b.len());

    let median_sq_days = lower_median(&squared).ok_or(CompareError::EmptyInput("taxa"))?;
    let sum: f64 = squared.iter().map(|&sq| sq as f64).sum();
    let rmse_days = (sum / squared.len() as f64).sqrt();

    Ok(DateComparison { rmse_days, median_sq_days, matched: squared.len() })
}

/// Load and compare two date table files.
pub fn compare_date_files<P: AsRef<Path>, Q: AsRef<Path>>(a: P, b: Q) -> Result<DateComparison> {
    let table_a = DateTable::from_file(a)?;
    let table_b = DateTable::from_file(b)?;
    compare_dates(&table_a, &table_b)
}

/// Decimal year as used by LSD date files: `year + (day_of_year - 1) / 365`.
///
/// The divisor is 365 in leap years too, so 31 December of a leap year maps to
/// the next integer year.
pub fn fractional_year(date: NaiveDate) -> f64 {
    date.year() as f64 + (date.ordinal0() as f64) / 365.0
}

/// Write rows as an LSD date file: the row count, then `<taxon>\t<decimal year>`
/// per row with two decimals.
pub fn write_lsd<W: Write>(out: &mut W, rows: &[(String, NaiveDate)]) -> io::Result<()> {
    writeln!(out, "{}", rows.len())?;
    for (taxon, date) in rows {
        writeln!(out, "{taxon}\t{:.2}", fractional_year(*date))?;
    }
    out.flush()
}
