//! Combining leaf digests into a tree hash.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::TreeHashError;

/// A SHA-256 digest of one tree node.
pub type NodeHash = [u8; 32];

/// SHA-256 of `data` as a [`NodeHash`].
pub(crate) fn sha256(data: &[u8]) -> NodeHash {
    to_node_hash(&Sha256::digest(data))
}

pub(crate) fn to_node_hash(bytes: &[u8]) -> NodeHash {
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    out
}

fn hash_pair(left: &NodeHash, right: &NodeHash) -> NodeHash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    to_node_hash(&hasher.finalize())
}

/// The root digest of a tree hash.
///
/// Renders as 64 lowercase hex characters and parses back from them.
///
/// # Examples
///
/// ```
/// use glacier_treehash::TreeHash;
///
/// let hex = "9bc1b2a288b26af7257a36277ae3816a7d4f16e89c1e7e77d0a5c48bad62b360";
/// let hash: TreeHash = hex.parse().unwrap();
/// assert_eq!(hash.to_string(), hex);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeHash(NodeHash);

impl TreeHash {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: NodeHash) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &NodeHash {
        &self.0
    }

    /// The digest as 64 lowercase hex characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TreeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TreeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeHash({})", self.to_hex())
    }
}

impl FromStr for TreeHash {
    type Err = TreeHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| TreeHashError::InvalidHex(s.to_owned()))?;
        Ok(Self(bytes))
    }
}

/// Combine leaf digests into the root digest.
///
/// A single leaf is its own root. An empty slice is treated as one empty
/// chunk.
///
/// # Examples
///
/// ```
/// use glacier_treehash::combine;
///
/// let leaf = [7u8; 32];
/// assert_eq!(combine(&[leaf]), leaf);
/// ```
#[must_use]
pub fn combine(leaves: &[NodeHash]) -> NodeHash {
    match leaves {
        [] => sha256(&[]),
        [root] => *root,
        _ => {
            let mut level = next_level(leaves);
            while level.len() > 1 {
                level = next_level(&level);
            }
            level[0]
        }
    }
}

/// Pair adjacent digests left to right; an odd last digest moves up as-is.
fn next_level(level: &[NodeHash]) -> Vec<NodeHash> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            _ => pair[0],
        })
        .collect()
}

/// Combine the tree hashes of consecutive upload parts into the tree hash of
/// the whole archive.
///
/// The result matches hashing the archive directly when every part but the
/// last spans the same power-of-two number of chunks and the last part spans
/// no more than that, which is what multipart uploads require. Parts of
/// differing sizes pair up chunks differently and give another root.
#[must_use]
pub fn combine_tree_hashes(parts: &[TreeHash]) -> TreeHash {
    let leaves: Vec<NodeHash> = parts.iter().map(|part| part.0).collect();
    TreeHash(combine(&leaves))
}

/// One node of an explicit hash tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    hash: NodeHash,
    left: Option<Box<TreeNode>>,
    right: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn leaf(hash: NodeHash) -> Self {
        Self {
            hash,
            left: None,
            right: None,
        }
    }

    fn parent(left: Self, right: Self) -> Self {
        Self {
            hash: hash_pair(&left.hash, &right.hash),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// The digest of this node.
    #[must_use]
    pub fn hash(&self) -> &NodeHash {
        &self.hash
    }

    /// The left child, if this is an internal node.
    #[must_use]
    pub fn left(&self) -> Option<&TreeNode> {
        self.left.as_deref()
    }

    /// The right child, if this is an internal node.
    #[must_use]
    pub fn right(&self) -> Option<&TreeNode> {
        self.right.as_deref()
    }

    /// Whether this node is a chunk digest.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none()
    }

    /// Number of edges on the longest path down to a leaf.
    ///
    /// For a root this equals the number of combining rounds.
    #[must_use]
    pub fn height(&self) -> usize {
        let left = self.left.as_ref().map_or(0, |node| node.height() + 1);
        let right = self.right.as_ref().map_or(0, |node| node.height() + 1);
        left.max(right)
    }
}

/// Build the explicit tree over the given leaf digests.
///
/// The root hash equals [`combine`] over the same leaves.
#[must_use]
pub fn build_tree(leaves: &[NodeHash]) -> TreeNode {
    let mut level: Vec<TreeNode> = if leaves.is_empty() {
        vec![TreeNode::leaf(sha256(&[]))]
    } else {
        leaves.iter().copied().map(TreeNode::leaf).collect()
    };

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut nodes = level.into_iter();
        while let Some(left) = nodes.next() {
            match nodes.next() {
                Some(right) => next.push(TreeNode::parent(left, right)),
                None => next.push(left),
            }
        }
        level = next;
    }

    level.swap_remove(0)
}
