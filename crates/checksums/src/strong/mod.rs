//! Strong (cryptographic) checksums.
//!
//! Strong sums are the canonical content identifiers of the block index: two
//! blocks, files, or directories with equal [`StrongSum`] values are treated as
//! having identical content. They are always computed fresh over an exact byte
//! range and never rolled.

mod sha1;
mod sum;

pub use self::sha1::Sha1;
pub use self::sum::{STRONG_LEN, StrongSum, StrongSumParseError};

/// Streaming strong digest.
pub trait StrongDigest: Sized {
    /// Digest produced by the algorithm.
    type Digest;
    /// Width of [`Self::Digest`] in bytes.
    const DIGEST_LEN: usize;

    /// Creates an empty hasher.
    fn new() -> Self;

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Finalises the digest.
    fn finalize(self) -> Self::Digest;

    /// Computes the digest of `data` in one shot.
    fn digest(data: &[u8]) -> Self::Digest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}
