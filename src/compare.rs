//! Branch-length agreement between two trees.
//!
//! Nodes are paired by leaf-set signature (see [`crate::index`]); a node whose
//! exact leaf set does not occur in the other tree takes no part. Over the
//! matched pairs we report the root-mean-square error:
//!
//! ```text
//! rmse = sqrt( Σ (length_a - length_b)² / n )
//! ```
//!
//! Unlike the Kuhner-Felsenstein branch score, unmatched branches are not
//! penalised, and the sum is averaged over the number of matched nodes.

use crate::error::{CompareError, Result};
use crate::index::{NodeIndex, build_index};
use log::debug;
use phylotree::tree::Tree as PhyloTree;

/// Outcome of a branch-length comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchComparison {
    /// Root-mean-square error over matched branch lengths
    pub rmse: f64,

    /// Number of nodes found in both trees
    pub matched: usize,
}

/// Branch lengths of the nodes present in both indexes.
///
/// Returned as two parallel vectors in the iteration order of `a`.
pub fn matched_lengths(a: &NodeIndex, b: &NodeIndex) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .filter_map(|(signature, node_a)| {
            b.get(signature)
                .map(|node_b| (node_a.branch_length, node_b.branch_length))
        })
        .unzip()
}

/// Root-mean-square error of two equally long sequences.
///
/// # Errors
/// Returns `CompareError::EmptyInput` when the sequences are empty; the mean of
/// nothing is undefined and must not turn into NaN.
pub fn rmse(xs: &[f64], ys: &[f64], what: &'static str) -> Result<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.is_empty() {
        return Err(CompareError::EmptyInput(what));
    }
    let sum_squared: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum();
    Ok((sum_squared / xs.len() as f64).sqrt())
}

/// Compare branch lengths of two indexed trees.
///
/// # Example
/// ```text
/// Tree A: ((X:1,Y:2):1,Z:1);
/// Tree B: ((Y:4,X:1):1,Z:1);
///
/// Matched: root, {X,Y}, {X}, {Y}, {Z}     n = 5
/// Squared differences: 0, 0, 0, 4, 0
/// RMSE = sqrt(4 / 5)
/// ```
///
/// # Errors
/// Returns `CompareError::EmptyInput` if the two trees share no leaf set at all,
/// which in practice means their taxon labels do not match.
pub fn compare_lengths(a: &NodeIndex, b: &NodeIndex) -> Result<BranchComparison> {
    let (lengths_a, lengths_b) = matched_lengths(a, b);
    debug!(
        "Matched {} of {} / {} node signatures",
        lengths_a.len(),
        a.len(),
        b.len()
    );
    let rmse = rmse(&lengths_a, &lengths_b, "node signatures")?;
    Ok(BranchComparison { rmse, matched: lengths_a.len() })
}

/// Index both trees and compare their branch lengths.
pub fn compare_trees(
    comparator: &PhyloTree,
    ground_truth: &PhyloTree,
) -> Result<BranchComparison> {
    let index_a = build_index(comparator)?;
    let index_b = build_index(ground_truth)?;
    compare_lengths(&index_a, &index_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn index(newick: &str) -> NodeIndex {
        build_index(&PhyloTree::from_newick(newick).unwrap()).unwrap()
    }

    #[test]
    fn rmse_of_two_pairs() {
        let value = rmse(&[1.0, 2.0], &[1.0, 4.0], "pairs").unwrap();
        assert!((value - 2f64.sqrt()).abs() <= f64::EPSILON);
    }

    #[test]
    fn rmse_of_nothing_is_an_error() {
        assert!(matches!(rmse(&[], &[], "pairs"), Err(CompareError::EmptyInput("pairs"))));
    }

    #[test]
    fn tree_against_itself() {
        let idx = index("((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);");
        let cmp = compare_lengths(&idx, &idx).unwrap();
        assert_eq!(cmp.rmse, 0.0);
        assert_eq!(cmp.matched, idx.len());
        assert_eq!(cmp.matched, 7);
    }

    #[test]
    fn child_order_is_irrelevant() {
        let a = index("((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);");
        let b = index("((D:0.5,C:0.4):0.6,(B:0.2,A:0.1):0.3);");
        let cmp = compare_lengths(&a, &b).unwrap();
        assert_eq!(cmp.rmse, 0.0);
        assert_eq!(cmp.matched, 7);
    }

    #[test]
    fn worked_example() {
        let a = index("((X:1,Y:2):1,Z:1);");
        let b = index("((Y:4,X:1):1,Z:1);");
        let cmp = compare_lengths(&a, &b).unwrap();
        assert_eq!(cmp.matched, 5);
        assert!((cmp.rmse - (4.0f64 / 5.0).sqrt()).abs() <= f64::EPSILON);
    }

    #[test]
    fn unmatched_clades_are_skipped() {
        // {A,B} vs {A,C}: only the root and the leaves match
        let a = index("((A:1,B:1):5,C:1);");
        let b = index("((A:1,C:1):9,B:1);");
        let (la, lb) = matched_lengths(&a, &b);
        assert_eq!(la.len(), 4);
        assert_eq!(la, lb);
        assert_eq!(compare_lengths(&a, &b).unwrap().rmse, 0.0);
    }

    #[test]
    fn disjoint_taxa_fail() {
        let a = index("(A:1,B:1);");
        let b = index("(C:1,D:1);");
        assert!(matches!(compare_lengths(&a, &b), Err(CompareError::EmptyInput(_))));
    }

    #[test]
    fn swapping_arguments_keeps_rmse_and_count() {
        let trees = [
            "((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);",
            "((A:0.3,C:0.2):0.1,(B:0.4,D:0.7):0.2);",
            "(((A:0.5,B:0.1):0.2,C:0.9):0.3,D:0.4);",
            "((D:0.1,(C:0.2,B:0.3):0.4):0.5,A:0.6);",
        ];
        for pair in trees.iter().combinations(2) {
            let a = index(pair[0]);
            let b = index(pair[1]);
            let ab = compare_lengths(&a, &b).unwrap();
            let ba = compare_lengths(&b, &a).unwrap();
            assert_eq!(ab.matched, ba.matched);
            assert!((ab.rmse - ba.rmse).abs() <= 1e-12);
        }
    }

    #[test]
    fn matched_order_follows_first_index() {
        let a = index("((A:1,B:2):3,C:4);");
        let b = index("(C:40,(B:20,A:10):30);");
        let (la, lb) = matched_lengths(&a, &b);
        assert_eq!(la, [0.0, 3.0, 1.0, 2.0, 4.0]);
        assert_eq!(lb, [0.0, 30.0, 10.0, 20.0, 40.0]);
    }

    #[test]
    fn compare_trees_indexes_both() {
        let a = PhyloTree::from_newick("((A:1,B:1):1,C:1);").unwrap();
        let b = PhyloTree::from_newick("((A:1,B:1):3,C:1);").unwrap();
        let cmp = compare_trees(&a, &b).unwrap();
        assert_eq!(cmp.matched, 5);
        assert!((cmp.rmse - (4.0f64 / 5.0).sqrt()).abs() <= f64::EPSILON);
    }
}
