//! Tree hashing of whole input streams.
//!
//! Readers are consumed to end of stream. A read that returns fewer bytes
//! than requested only ends the input when it returns zero bytes.

use std::io::{self, Read};

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::error::TreeHashError;
use crate::hasher::{Checksums, TreeHasher};
use crate::tree::TreeHash;

/// Read buffer size for async readers.
const ASYNC_READ_BUFFER: usize = 64 * 1024;

/// Compute the tree hash of everything `reader` yields.
///
/// # Errors
///
/// Returns [`TreeHashError::Read`] if the reader fails.
///
/// # Examples
///
/// ```
/// use glacier_treehash::tree_hash;
///
/// let hash = tree_hash(std::io::empty()).unwrap();
/// assert_eq!(
///     hash.to_hex(),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn tree_hash(reader: impl Read) -> Result<TreeHash, TreeHashError> {
    checksums(reader).map(|checksums| checksums.tree_hash)
}

/// Compute the tree hash, linear hash, and length of everything `reader`
/// yields in one pass.
///
/// # Errors
///
/// Returns [`TreeHashError::Read`] if the reader fails.
pub fn checksums(mut reader: impl Read) -> Result<Checksums, TreeHashError> {
    let mut hasher = TreeHasher::new();
    io::copy(&mut reader, &mut hasher).map_err(TreeHashError::Read)?;
    Ok(finish(hasher))
}

/// Async variant of [`tree_hash`].
///
/// # Errors
///
/// Returns [`TreeHashError::Read`] if the reader fails.
pub async fn tree_hash_async<R>(reader: R) -> Result<TreeHash, TreeHashError>
where
    R: AsyncRead + Unpin,
{
    checksums_async(reader)
        .await
        .map(|checksums| checksums.tree_hash)
}

/// Async variant of [`checksums`].
///
/// # Errors
///
/// Returns [`TreeHashError::Read`] if the reader fails.
pub async fn checksums_async<R>(mut reader: R) -> Result<Checksums, TreeHashError>
where
    R: AsyncRead + Unpin,
{
    let mut hasher = TreeHasher::new();
    let mut buf = vec![0u8; ASYNC_READ_BUFFER];
    loop {
        let n = reader.read(&mut buf).await.map_err(TreeHashError::Read)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(finish(hasher))
}

fn finish(hasher: TreeHasher) -> Checksums {
    let checksums = hasher.finalize();
    debug!(
        content_length = checksums.content_length,
        chunk_count = checksums.chunk_count,
        tree_hash = %checksums.tree_hash,
        "Computed tree hash"
    );
    checksums
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::CHUNK_SIZE;
    use crate::tree::combine_tree_hashes;

    const HELLO: &[u8] = b"Hello World";

    fn a_bytes(mib: usize, suffix: &[u8]) -> Vec<u8> {
        let mut data = vec![b'a'; mib * CHUNK_SIZE];
        data.extend_from_slice(suffix);
        data
    }

    fn hash_hex(data: &[u8]) -> String {
        tree_hash(data).unwrap().to_hex()
    }

    #[test]
    fn test_should_match_hello_world_vector() {
        assert_eq!(
            hash_hex(HELLO),
            "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e"
        );
    }

    #[test]
    fn test_should_match_one_mib_vector() {
        assert_eq!(
            hash_hex(&a_bytes(1, b"")),
            "9bc1b2a288b26af7257a36277ae3816a7d4f16e89c1e7e77d0a5c48bad62b360"
        );
    }

    #[test]
    fn test_should_match_one_mib_plus_hello_vector() {
        assert_eq!(
            hash_hex(&a_bytes(1, HELLO)),
            "7a398c79d8fc266cde4766b105d56a49361b22142aaa35a22ef505660c7edf59"
        );
    }

    #[test]
    fn test_should_match_two_mib_vector() {
        assert_eq!(
            hash_hex(&a_bytes(2, b"")),
            "3d95be8a6b55f83b93db329b8657ef6e8496361cb7b9a882b263fb2fb6197564"
        );
    }

    #[test]
    fn test_should_match_three_mib_vector() {
        assert_eq!(
            hash_hex(&a_bytes(3, b"")),
            "d96d417c167a3bef2eaab2e637095834c2023e867f8287b6e5aa4da66eb0a555"
        );
    }

    #[test]
    fn test_should_match_two_mib_plus_hello_vector() {
        assert_eq!(
            hash_hex(&a_bytes(2, HELLO)),
            "7cf44f7e83180f709ad6f8376dd704609d28a117f3a1878c301bc9e78c870344"
        );
    }

    #[test]
    fn test_should_match_four_mib_vector() {
        assert_eq!(
            hash_hex(&a_bytes(4, b"")),
            "ab7404d312438a79f8164a6714f2b7aa42b52fbfc8f3b2db62b372b182fc6619"
        );
    }

    #[test]
    fn test_should_match_five_mib_vector() {
        assert_eq!(
            hash_hex(&a_bytes(5, b"")),
            "ede4a38ec783a37bd243daa9693fbabaaf7ea2a370a511a72b02aaa8bfe0dda6"
        );
    }

    #[test]
    fn test_should_match_seven_mib_vector() {
        assert_eq!(
            hash_hex(&a_bytes(7, b"")),
            "3ff5623fb1ab0ef60adab85d698aa03560d24890e51d7d69d3296dccfb774ac7"
        );
    }

    #[test]
    fn test_should_report_linear_hash_and_length() {
        let checksums = checksums(HELLO).unwrap();
        assert_eq!(checksums.content_length, 11);
        assert_eq!(checksums.chunk_count, 1);
        assert_eq!(
            checksums.linear_hash,
            "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e"
        );
    }

    #[test]
    fn test_should_keep_reading_after_short_reads() {
        struct Trickle<'a> {
            data: &'a [u8],
        }

        impl Read for Trickle<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                let n = buf.len().min(self.data.len()).min(1000);
                buf[..n].copy_from_slice(&self.data[..n]);
                self.data = &self.data[n..];
                Ok(n)
            }
        }

        let data = a_bytes(2, HELLO);
        assert_eq!(
            tree_hash(Trickle { data: &data }).unwrap(),
            tree_hash(data.as_slice()).unwrap()
        );
    }

    #[test]
    fn test_should_surface_read_failure() {
        struct Broken {
            served: bool,
        }

        impl Read for Broken {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.served {
                    return Err(io::Error::other("connection reset"));
                }
                self.served = true;
                buf[0] = b'a';
                Ok(1)
            }
        }

        let result = tree_hash(Broken { served: false });
        assert!(matches!(result, Err(TreeHashError::Read(_))));
    }

    #[test]
    fn test_should_combine_multipart_hashes_into_archive_hash() {
        let part = a_bytes(2, b"");
        let last = a_bytes(1, HELLO);
        let parts = [
            tree_hash(part.as_slice()).unwrap(),
            tree_hash(part.as_slice()).unwrap(),
            tree_hash(last.as_slice()).unwrap(),
        ];

        let mut whole = part.clone();
        whole.extend_from_slice(&part);
        whole.extend_from_slice(&last);

        assert_eq!(
            combine_tree_hashes(&parts),
            tree_hash(whole.as_slice()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_should_hash_async_reader_like_blocking_reader() {
        let data = a_bytes(3, HELLO);
        let blocking = checksums(data.as_slice()).unwrap();
        let async_result = checksums_async(data.as_slice()).await.unwrap();
        assert_eq!(async_result, blocking);
    }

    #[tokio::test]
    async fn test_should_match_vector_from_async_reader() {
        let data = a_bytes(5, b"");
        assert_eq!(
            tree_hash_async(data.as_slice()).await.unwrap().to_hex(),
            "ede4a38ec783a37bd243daa9693fbabaaf7ea2a370a511a72b02aaa8bfe0dda6"
        );
    }
}
