use digest::Digest;
use std::fmt;

use super::{STRONG_LEN, StrongDigest, StrongSum};

/// Streaming SHA-1 hasher producing [`StrongSum`] values.
///
/// Files are hashed with one running instance across all of their blocks, so
/// the file sum equals the SHA-1 of the whole content.
#[derive(Clone, Default)]
pub struct Sha1 {
    inner: ::sha1::Sha1,
}

impl fmt::Debug for Sha1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sha1").finish_non_exhaustive()
    }
}

impl Sha1 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ::sha1::Sha1::new(),
        }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    /// Finalises the digest.
    #[must_use]
    pub fn finalize(self) -> StrongSum {
        let bytes: [u8; STRONG_LEN] = self.inner.finalize().into();
        StrongSum::from_bytes(bytes)
    }

    /// Convenience helper that computes the SHA-1 digest for `data` in one shot.
    #[must_use]
    pub fn digest(data: &[u8]) -> StrongSum {
        <Self as StrongDigest>::digest(data)
    }
}

impl StrongDigest for Sha1 {
    type Digest = StrongSum;
    const DIGEST_LEN: usize = STRONG_LEN;

    fn new() -> Self {
        Self::new()
    }

    fn update(&mut self, data: &[u8]) {
        self.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.finalize()
    }
}

impl std::io::Write for Sha1 {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
