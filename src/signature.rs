//! Order-independent leaf-set signatures for tree nodes.
//!
//! # Overview
//! Two trees built independently list children in arbitrary order and assign
//! unrelated node ids, but a clade is the same clade if it holds the same taxa.
//! A signature is therefore the **sorted** list of leaf names below a node.
//!
//! # Example
//! ```text
//!        root
//!       /    \
//!     n1      C
//!    /  \
//!   B    A
//! ```
//! - `A` → `[A]`
//! - `n1` → `[A, B]` (sorted, whatever the child order was)
//! - `root` → `[A, B, C]`
//!
//! Names are compared as plain strings, so signatures from two different trees
//! can be looked up in each other's index directly.

use std::fmt;

/// The sorted leaf names found below a node.
///
/// Equality and hashing are on the full sorted name list, so two nodes from
/// different trees share a signature exactly when their leaf sets coincide.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct LeafSignature(Vec<String>);

impl LeafSignature {
    /// Signature of a single leaf.
    ///
    /// # Example
    /// ```
    /// # use rust_python_tree_rmse::signature::LeafSignature;
    /// let sig = LeafSignature::leaf("A");
    /// assert_eq!(sig.names(), ["A"]);
    /// ```
    pub fn leaf(name: impl Into<String>) -> Self {
        LeafSignature(vec![name.into()])
    }

    /// Builds a signature from names in any order.
    ///
    /// # Example
    /// ```
    /// # use rust_python_tree_rmse::signature::LeafSignature;
    /// let a = LeafSignature::from_names(["C", "A", "B"]);
    /// let b = LeafSignature::from_names(["B", "C", "A"]);
    /// assert_eq!(a, b);
    /// ```
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort_unstable();
        LeafSignature(names)
    }

    /// Union of several child signatures (the signature of their parent).
    ///
    /// Children are already sorted, so this concatenates and re-sorts. Names are
    /// not deduplicated: with unique leaf names the children are disjoint.
    ///
    /// # Example
    /// ```
    /// # use rust_python_tree_rmse::signature::LeafSignature;
    /// let left = LeafSignature::from_names(["D", "B"]);
    /// let right = LeafSignature::leaf("A");
    /// let parent = LeafSignature::merge([&left, &right]);
    /// assert_eq!(parent.names(), ["A", "B", "D"]);
    /// ```
    pub fn merge<'a, I>(children: I) -> Self
    where
        I: IntoIterator<Item = &'a LeafSignature>,
    {
        let mut names: Vec<String> = children
            .into_iter()
            .flat_map(|child| child.0.iter().cloned())
            .collect();
        names.sort_unstable();
        LeafSignature(names)
    }

    /// The sorted leaf names.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of leaves below the node.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LeafSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_is_singleton() {
        let sig = LeafSignature::leaf("taxonX");
        assert_eq!(sig.len(), 1);
        assert_eq!(sig.names(), ["taxonX"]);
    }

    #[test]
    fn test_order_independent() {
        let a = LeafSignature::merge([&LeafSignature::leaf("B"), &LeafSignature::leaf("A")]);
        let b = LeafSignature::merge([&LeafSignature::leaf("A"), &LeafSignature::leaf("B")]);
        assert_eq!(a, b);
    }

    /// ```text
    ///           root
    ///          /    \
    ///        node1   D
    ///        /   \
    ///       C    node2
    ///            /   \
    ///           B     A
    /// ```
    #[test]
    fn test_mini_tree_example() {
        let node2 = LeafSignature::merge([&LeafSignature::leaf("B"), &LeafSignature::leaf("A")]);
        assert_eq!(node2.names(), ["A", "B"]);

        let node1 = LeafSignature::merge([&LeafSignature::leaf("C"), &node2]);
        assert_eq!(node1.names(), ["A", "B", "C"]);

        let root = LeafSignature::merge([&node1, &LeafSignature::leaf("D")]);
        assert_eq!(root.len(), 4);
        assert_eq!(root.to_string(), "{A,B,C,D}");
    }

    #[test]
    fn test_unary_parent_shares_child_signature() {
        let child = LeafSignature::from_names(["A", "B"]);
        let parent = LeafSignature::merge([&child]);
        assert_eq!(parent, child);
    }

    #[test]
    fn test_sorting_is_bytewise() {
        // Uppercase sorts before lowercase, as with plain string comparison.
        let sig = LeafSignature::from_names(["b", "B", "a"]);
        assert_eq!(sig.names(), ["B", "a", "b"]);
    }
}
