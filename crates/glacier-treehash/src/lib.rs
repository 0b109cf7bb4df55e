//! SHA-256 tree hash of archive content.
//!
//! The input is cut into 1 MiB chunks (the last one may be shorter; an empty
//! input is one empty chunk). Each chunk is hashed with SHA-256 to form the
//! leaves. Adjacent digests are then paired left to right and replaced by the
//! SHA-256 of their concatenation; an odd digest at the end of a level moves
//! up unchanged. This repeats until a single root digest remains.
//!
//! # Usage
//!
//! ```rust
//! use glacier_treehash::tree_hash;
//!
//! let hash = tree_hash(&b"Hello World"[..]).unwrap();
//! assert_eq!(
//!     hash.to_string(),
//!     "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e"
//! );
//! ```
//!
//! # Modules
//!
//! - [`error`] - Error types
//! - [`hasher`] - Incremental [`TreeHasher`]
//! - [`reader`] - Hashing of blocking and async readers
//! - [`tree`] - Level combining, explicit trees, and the [`TreeHash`] value

pub mod error;
pub mod hasher;
pub mod reader;
pub mod tree;

pub use error::TreeHashError;
pub use hasher::{CHUNK_SIZE, Checksums, TreeHasher};
pub use reader::{checksums, checksums_async, tree_hash, tree_hash_async};
pub use tree::{NodeHash, TreeHash, TreeNode, build_tree, combine, combine_tree_hashes};
