//! End-to-end comparisons on files written to a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use rust_python_tree_rmse::error::CompareError;
use rust_python_tree_rmse::io::{TreeFormat, read_tree};
use rust_python_tree_rmse::report::{ComparisonInput, run_comparison};
use rust_python_tree_rmse::{build_index, compare_date_files, compare_lengths};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const TRUTH: &str = "((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);\n";

#[test]
fn reordered_children_give_zero_rmse() {
    let dir = TempDir::new().unwrap();
    let truth = write(dir.path(), "truth.nwk", TRUTH);
    let shuffled = write(
        dir.path(),
        "shuffled.nwk",
        "(\n  (D:0.5, C:0.4):0.6,\n  (B:0.2, A:0.1):0.3\n);\n",
    );

    let report = run_comparison(&ComparisonInput::new(&shuffled, &truth)).unwrap();
    assert_eq!(report.branch.rmse, 0.0);
    assert_eq!(report.branch.matched, 7);
    assert_eq!(report.to_string(), "0.0,-1,-1");
}

#[test]
fn nexus_comparator_against_newick_truth() {
    let dir = TempDir::new().unwrap();
    let truth = write(dir.path(), "truth.nwk", TRUTH);
    let nexus = write(
        dir.path(),
        "inferred.nexus",
        "#NEXUS\n\
         Begin trees;\n\
         \ttree tree_1 [&lnL=-10] = [&R] ((A:0.1,B:0.2)[&support=1]:0.3,(C:0.4,D:1.5):0.6);\n\
         End;\n",
    );

    let report = run_comparison(&ComparisonInput::new(&nexus, &truth)).unwrap();
    assert_eq!(report.branch.matched, 7);
    // Only D differs, by 1.0, over 7 matched nodes
    assert!((report.branch.rmse - (1.0f64 / 7.0).sqrt()).abs() < 1e-12);
}

#[test]
fn translate_table_relabels_leaves() {
    let dir = TempDir::new().unwrap();
    let truth = write(dir.path(), "truth.nwk", TRUTH);
    let nexus = write(
        dir.path(),
        "beast.trees",
        "#NEXUS\n\
         Begin trees;\n\
         \tTranslate\n\
         \t\t1 A,\n\
         \t\t2 B,\n\
         \t\t3 C,\n\
         \t\t4 D\n\
         \t\t;\n\
         tree STATE_0 = ((1:0.1,2:0.2):0.3,(3:0.4,4:0.5):0.6);\n\
         End;\n",
    );

    // Without translation the leaves are "1".."4" and nothing is shared
    let plain = run_comparison(&ComparisonInput::new(&nexus, &truth));
    assert!(matches!(plain, Err(CompareError::EmptyInput(_))));

    let mut input = ComparisonInput::new(&nexus, &truth);
    input.use_real_taxa = true;
    let report = run_comparison(&input).unwrap();
    assert_eq!(report.branch.matched, 7);
    assert_eq!(report.branch.rmse, 0.0);
}

#[test]
fn missing_end_marker_is_reported() {
    let dir = TempDir::new().unwrap();
    let truth = write(dir.path(), "truth.nwk", TRUTH);
    let nexus = write(dir.path(), "broken.nexus", "#NEXUS\nBegin trees;\ntree t = (A:1,B:1);\n");

    let err = run_comparison(&ComparisonInput::new(&nexus, &truth)).unwrap_err();
    assert!(matches!(err, CompareError::MissingBlock { marker: "End;", .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn malformed_tree_is_reported() {
    let dir = TempDir::new().unwrap();
    let truth = write(dir.path(), "truth.nwk", TRUTH);
    let bad = write(dir.path(), "bad.nwk", "((A:0.1,B:0.2):0.3,(C:0.4,D:0.5)");

    let err = run_comparison(&ComparisonInput::new(&bad, &truth)).unwrap_err();
    assert!(matches!(err, CompareError::TreeParse { .. }));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let truth = write(dir.path(), "truth.nwk", TRUTH);
    let input = ComparisonInput::new(dir.path().join("nope.nwk"), &truth);
    let err = run_comparison(&input).unwrap_err();
    assert!(matches!(err, CompareError::Io { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn disjoint_labels_are_empty_input() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.nwk", "((A:1,B:1):1,C:1);");
    let b = write(dir.path(), "b.nwk", "((X:1,Y:1):1,Z:1);");

    let err = run_comparison(&ComparisonInput::new(&a, &b)).unwrap_err();
    assert!(matches!(err, CompareError::EmptyInput(_)));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn dates_are_compared_when_both_tables_given() {
    let dir = TempDir::new().unwrap();
    let truth = write(dir.path(), "truth.nwk", TRUTH);
    let tsv1 = write(dir.path(), "truth_dates.tsv", "strain\tdate\ntaxonX\t2020-01-01\n");
    let tsv2 = write(dir.path(), "run_dates.tsv", "strain\tdate\ntaxonX\t2020-01-11 00:00:00\n");

    let input = ComparisonInput::new(&truth, &truth).with_dates(&tsv1, &tsv2);
    let report = run_comparison(&input).unwrap();
    assert_eq!(report.to_string(), "0.0,10.0,100");

    // One table alone is ignored
    let mut input = ComparisonInput::new(&truth, &truth);
    input.comparator_dates = Some(tsv1);
    assert_eq!(run_comparison(&input).unwrap().to_string(), "0.0,-1,-1");
}

#[test]
fn date_median_uses_index_half_n() {
    let dir = TempDir::new().unwrap();
    let a = write(
        dir.path(),
        "a.tsv",
        "strain\tdate\nw\t2020-01-02\nx\t2020-01-03\ny\t2020-01-04\nz\t2020-01-05\n",
    );
    let b = write(
        dir.path(),
        "b.tsv",
        "strain\tdate\nz\t2020-01-01\ny\t2020-01-01\nx\t2020-01-01\nw\t2020-01-01\n",
    );

    // Squared differences 1, 4, 9, 16
    let cmp = compare_date_files(&a, &b).unwrap();
    assert_eq!(cmp.median_sq_days, 9);
    assert!((cmp.rmse_days - 7.5f64.sqrt()).abs() < 1e-12);
}

#[test]
fn bad_date_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let truth = write(dir.path(), "truth.nwk", TRUTH);
    let good = write(dir.path(), "good.tsv", "strain\tdate\nA\t2020-01-01\n");
    let bad = write(dir.path(), "bad.tsv", "strain\tdate\nA\t01/02/2020\n");

    let input = ComparisonInput::new(&truth, &truth).with_dates(&good, &bad);
    let err = run_comparison(&input).unwrap_err();
    assert!(matches!(err, CompareError::DateParse { line: 2, .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn unary_chain_in_file() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "unary.nwk", "(((A:1,B:2):0.5):0.7,C:4);");
    let tree = read_tree(&path, TreeFormat::Newick, false).unwrap();
    let index = build_index(&tree).unwrap();
    assert!(index.len() < index.num_nodes());

    let cmp = compare_lengths(&index, &index).unwrap();
    assert_eq!(cmp.matched, index.len());
    assert_eq!(cmp.rmse, 0.0);
}
