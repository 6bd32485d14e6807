use std::fmt;

use crate::{
    bitstreams::{BinaryReader, BinaryWriterBuilder},
    constants::{ALPH_SIZE, BITS_PER_LEAF_VALUE, PSEUDO_EOF},
    error::{BitstreamError, HuffError, Result},
    frequency::FrequencyTable,
    ranked_queue::{RankedQueue, Weighted},
};

/// Sequence of branch choices from the root to a leaf: `false` goes left,
/// `true` goes right.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct CodePath {
    bits: Vec<bool>,
}

impl CodePath {
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_prefix_of(&self, other: &CodePath) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl From<Vec<bool>> for CodePath {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl fmt::Display for CodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in self.bits.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TreeNode {
    Leaf {
        symbol: usize,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn leaf(symbol: usize, weight: u64) -> Self {
        TreeNode::Leaf { symbol, weight }
    }

    /// `first` becomes the left child.
    pub fn merge(first: Self, second: Self) -> Self {
        TreeNode::Internal {
            weight: first.weight() + second.weight(),
            left: Box::new(first),
            right: Box::new(second),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn symbol(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { symbol, .. } => Some(*symbol),
            TreeNode::Internal { .. } => None,
        }
    }
}

impl Weighted for TreeNode {
    fn weight(&self) -> u64 {
        match self {
            TreeNode::Leaf { weight, .. } => *weight,
            TreeNode::Internal { weight, .. } => *weight,
        }
    }
}

/// A Huffman code tree together with the path of every leaf.
///
/// Built either greedily from a [`RankedQueue`] of weighted leaves or by
/// parsing the pre-order form written by [`CodeTree::write_tree`]. Both
/// routes give the same shape for the same input, so the encoder and the
/// decoder always agree on the paths.
#[derive(Clone, Debug)]
pub struct CodeTree {
    root: TreeNode,
    size: usize,
    num_leaf: usize,
    paths: Vec<Option<CodePath>>,
}

impl CodeTree {
    /// Merges the two lightest entries until one is left. A queue holding a
    /// single entry yields a tree whose root is that leaf.
    pub fn build(mut queue: RankedQueue<TreeNode>) -> Result<Self> {
        let mut size = 0;

        let root = loop {
            let first = queue.remove_front().ok_or_else(|| {
                HuffError::InvalidArgument("cannot build a code tree from an empty queue".to_string())
            })?;

            let Some(second) = queue.remove_front() else {
                break first;
            };

            queue.insert(TreeNode::merge(first, second))?;
            // two children consumed, one parent queued
            size += 2;
        };

        Ok(Self::with_root(root, size + 1))
    }

    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        Self::build(freqs.to_queue()?)
    }

    /// Parses a pre-order tree. Every failure, including running out of
    /// input halfway through, is reported as [`HuffError::CorruptFormat`].
    pub fn read_tree(reader: &mut BinaryReader) -> Result<Self> {
        let mut size = 0;
        let mut seen = vec![false; PSEUDO_EOF + 1];

        let root = Self::read_node(reader, 0, &mut size, &mut seen)?;

        if !seen[PSEUDO_EOF] {
            return Err(HuffError::CorruptFormat("tree has no end-of-stream leaf".to_string()));
        }

        Ok(Self::with_root(root, size))
    }

    fn read_node(reader: &mut BinaryReader, depth: usize, size: &mut usize, seen: &mut [bool]) -> Result<TreeNode> {
        if depth > ALPH_SIZE {
            return Err(HuffError::CorruptFormat(format!("tree nesting exceeds {} levels", ALPH_SIZE)));
        }

        let is_leaf = reader.read_bit().map_err(|e| tree_read_error("node tag", e))?;
        *size += 1;

        if is_leaf {
            let value = reader
                .read_int(BITS_PER_LEAF_VALUE as u64)
                .map_err(|e| tree_read_error("leaf value", e))? as usize;

            if value > PSEUDO_EOF {
                return Err(HuffError::CorruptFormat(format!("leaf value {} is outside the alphabet", value)));
            }
            if seen[value] {
                return Err(HuffError::CorruptFormat(format!("symbol {} appears in two leaves", value)));
            }
            seen[value] = true;

            return Ok(TreeNode::leaf(value, 1));
        }

        let left = Self::read_node(reader, depth + 1, size, seen)?;
        let right = Self::read_node(reader, depth + 1, size, seen)?;

        // Weights are irrelevant once the shape is fixed
        Ok(TreeNode::Internal { weight: 1, left: Box::new(left), right: Box::new(right) })
    }

    fn with_root(root: TreeNode, size: usize) -> Self {
        let mut tree = Self { root, size, num_leaf: 0, paths: vec![None; PSEUDO_EOF + 1] };

        let mut path = Vec::new();
        collect_paths(&tree.root, &mut path, &mut tree.paths, &mut tree.num_leaf);

        tree
    }

    /// Pre-order: `1` plus the symbol for a leaf, `0` for an internal node
    /// followed by its left and right subtrees. Returns the bits written.
    pub fn write_tree(&self, writer: &mut BinaryWriterBuilder) -> u64 {
        write_node(&self.root, writer)
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Total number of nodes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_leaf(&self) -> usize {
        self.num_leaf
    }

    /// Exact length in bits of what [`write_tree`](CodeTree::write_tree) emits.
    pub fn serialized_bits(&self) -> u64 {
        (self.num_leaf * BITS_PER_LEAF_VALUE + self.size) as u64
    }

    /// Indexed by symbol, `PSEUDO_EOF` included; `None` for symbols not in the tree.
    pub fn paths(&self) -> &[Option<CodePath>] {
        &self.paths
    }

    pub fn path(&self, symbol: usize) -> Option<&CodePath> {
        self.paths.get(symbol).and_then(|p| p.as_ref())
    }
}

fn tree_read_error(what: &str, e: BitstreamError) -> HuffError {
    HuffError::CorruptFormat(format!("bad tree header while reading {}: {}", what, e))
}

fn collect_paths(node: &TreeNode, path: &mut Vec<bool>, paths: &mut [Option<CodePath>], num_leaf: &mut usize) {
    match node {
        TreeNode::Leaf { symbol, .. } => {
            paths[*symbol] = Some(CodePath::from(path.clone()));
            *num_leaf += 1;
        }
        TreeNode::Internal { left, right, .. } => {
            path.push(false);
            collect_paths(left, path, paths, num_leaf);
            path.pop();

            path.push(true);
            collect_paths(right, path, paths, num_leaf);
            path.pop();
        }
    }
}

fn write_node(node: &TreeNode, writer: &mut BinaryWriterBuilder) -> u64 {
    match node {
        TreeNode::Leaf { symbol, .. } => {
            writer.push_bit(true) + writer.push_bits(*symbol as u64, BITS_PER_LEAF_VALUE as u64)
        }
        TreeNode::Internal { left, right, .. } => {
            writer.push_bit(false) + write_node(left, writer) + write_node(right, writer)
        }
    }
}
