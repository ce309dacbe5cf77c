//! Map every node of a tree to its leaf-set signature.
//!
//! # Overview
//! A [`NodeIndex`] answers "which node of this tree holds exactly these taxa?".
//! Built once per tree and read-only afterwards, it lets two trees be compared
//! without aligning their topologies: nodes are matched by signature alone.
//!
//! # Why taxon NAMES and not node ids
//! Node ids are assigned while parsing and differ across files. Taxon names are
//! the only thing two trees over the same taxa agree on, so signatures are built
//! from names (see [`crate::signature`]).
//!
//! # Duplicate signatures
//! With unique leaf names and no unary nodes every node has its own signature.
//! A unary node shares its child's signature; the child is visited later in
//! preorder and overwrites the entry. The entry keeps the position of its first
//! insertion, so iteration order is preorder order of first appearance.

use crate::signature::LeafSignature;
use log::{debug, warn};
use phylotree::tree::{Tree as PhyloTree, TreeError};
use std::collections::{HashMap, HashSet};

/// The node an index entry points at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedNode {
    /// Node id inside the tree the index was built from
    pub id: usize,

    /// Length of the branch leading to this node (`0.0` when absent)
    pub branch_length: f64,
}

/// Leaf-set signature → node, for every node of one tree.
///
/// # Fields
/// - `entries`: signature/node pairs in first-insertion order
/// - `positions`: signature → position in `entries` for O(1) lookup
/// - `num_nodes`: how many nodes the source tree had
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    entries: Vec<(LeafSignature, IndexedNode)>,
    positions: HashMap<LeafSignature, usize>,
    num_nodes: usize,
}

impl NodeIndex {
    /// Build the index of a tree.
    ///
    /// # Algorithm
    /// 1. Postorder traversal so children are done before their parent
    /// 2. Leaf → singleton signature, internal node → merge of its children
    /// 3. Insert in preorder, later duplicates overwriting earlier ones
    ///
    /// # Errors
    /// Returns `TreeError` if the tree has no root or refers to missing nodes.
    pub fn from_tree(tree: &PhyloTree) -> Result<Self, TreeError> {
        let root_id = tree.get_root()?;
        let order = tree.preorder(&root_id)?;

        // Step 1-2: signatures bottom-up
        let mut signatures: HashMap<usize, LeafSignature> = HashMap::with_capacity(order.len());
        let mut seen_names: HashSet<&str> = HashSet::new();
        for node_id in &tree.postorder(&root_id)? {
            let node = tree.get(node_id)?;
            let signature = if node.children.is_empty() {
                let name = node.name.as_deref().unwrap_or_default();
                if !seen_names.insert(name) {
                    warn!("Leaf name '{name}' occurs more than once; signatures may collide");
                }
                LeafSignature::leaf(name)
            } else {
                let children = node
                    .children
                    .iter()
                    .map(|child| signatures.get(child).ok_or(TreeError::NodeNotFound(*child)))
                    .collect::<Result<Vec<_>, _>>()?;
                LeafSignature::merge(children)
            };
            signatures.insert(*node_id, signature);
        }

        // Step 3: insert in preorder
        let mut index = NodeIndex {
            entries: Vec::with_capacity(order.len()),
            positions: HashMap::with_capacity(order.len()),
            num_nodes: order.len(),
        };
        for node_id in &order {
            let node = tree.get(node_id)?;
            let signature = signatures
                .remove(node_id)
                .ok_or(TreeError::NodeNotFound(*node_id))?;
            index.insert(
                signature,
                IndexedNode {
                    id: *node_id,
                    branch_length: node.parent_edge.unwrap_or(0.0),
                },
            );
        }

        if index.len() < index.num_nodes {
            debug!(
                "{} of {} nodes share a signature with another node (unary nodes)",
                index.num_nodes - index.len(),
                index.num_nodes
            );
        }

        Ok(index)
    }

    /// Insert or overwrite. An overwritten entry keeps its original position.
    pub fn insert(&mut self, signature: LeafSignature, node: IndexedNode) {
        match self.positions.get(&signature) {
            Some(&pos) => self.entries[pos].1 = node,
            None => {
                self.positions.insert(signature.clone(), self.entries.len());
                self.entries.push((signature, node));
            }
        }
    }

    pub fn get(&self, signature: &LeafSignature) -> Option<&IndexedNode> {
        self.positions.get(signature).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, signature: &LeafSignature) -> bool {
        self.positions.contains_key(signature)
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&LeafSignature, &IndexedNode)> {
        self.entries.iter().map(|(sig, node)| (sig, node))
    }

    /// Number of distinct signatures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of nodes in the tree the index was built from.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }
}

/// Build the signature index of `tree`.
pub fn build_index(tree: &PhyloTree) -> Result<NodeIndex, TreeError> {
    NodeIndex::from_tree(tree)
}
