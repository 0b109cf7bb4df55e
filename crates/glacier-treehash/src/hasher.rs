//! Incremental tree hashing.

use std::{fmt, io};

use sha2::{Digest, Sha256};

use crate::tree::{NodeHash, TreeHash, combine, to_node_hash};

/// Size of one leaf chunk: 1 MiB.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Everything an archive upload needs to describe its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksums {
    /// Tree hash of the content.
    pub tree_hash: TreeHash,
    /// Lowercase hex SHA-256 of the whole content, hashed linearly.
    pub linear_hash: String,
    /// Number of bytes hashed.
    pub content_length: u64,
    /// Number of leaf chunks, at least one.
    pub chunk_count: usize,
}

/// Computes a tree hash from data fed in arbitrary pieces.
///
/// Chunk boundaries depend only on the total byte offset, never on how the
/// input was split between calls to [`TreeHasher::update`].
///
/// # Examples
///
/// ```
/// use glacier_treehash::{TreeHasher, tree_hash};
///
/// let mut hasher = TreeHasher::new();
/// hasher.update(b"Hello ");
/// hasher.update(b"World");
/// assert_eq!(hasher.finalize().tree_hash, tree_hash(&b"Hello World"[..]).unwrap());
/// ```
#[derive(Clone, Default)]
pub struct TreeHasher {
    chunk: Sha256,
    chunk_len: usize,
    leaves: Vec<NodeHash>,
    linear: Sha256,
    content_length: u64,
}

impl TreeHasher {
    /// Create an empty hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more content.
    pub fn update(&mut self, mut data: &[u8]) {
        self.linear.update(data);
        self.content_length += data.len() as u64;

        while !data.is_empty() {
            let take = (CHUNK_SIZE - self.chunk_len).min(data.len());
            let (head, rest) = data.split_at(take);
            self.chunk.update(head);
            self.chunk_len += take;
            data = rest;

            if self.chunk_len == CHUNK_SIZE {
                self.leaves.push(to_node_hash(&self.chunk.finalize_reset()));
                self.chunk_len = 0;
            }
        }
    }

    /// Number of bytes fed so far.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Finish the last chunk and compute the checksums.
    #[must_use]
    pub fn finalize(mut self) -> Checksums {
        if self.chunk_len > 0 || self.leaves.is_empty() {
            self.leaves.push(to_node_hash(&self.chunk.finalize()));
        }

        Checksums {
            tree_hash: TreeHash::from_bytes(combine(&self.leaves)),
            linear_hash: hex::encode(self.linear.finalize()),
            content_length: self.content_length,
            chunk_count: self.leaves.len(),
        }
    }
}

impl fmt::Debug for TreeHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeHasher")
            .field("chunk_len", &self.chunk_len)
            .field("leaves", &self.leaves.len())
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl io::Write for TreeHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
