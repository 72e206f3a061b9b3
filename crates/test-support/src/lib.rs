//! Shared fixtures for blocksync tests.
//!
//! [`FixtureTree`] owns a temporary directory and offers terse helpers for
//! laying out files relative to it. [`patterned_bytes`] produces deterministic
//! content that does not repeat within a block, so distinct offsets hash to
//! distinct strong sums.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory tree removed on drop.
///
/// The root is canonical, so paths built from it compare equal to the ones
/// stores report.
#[derive(Debug)]
pub struct FixtureTree {
    _dir: TempDir,
    root: PathBuf,
}

impl FixtureTree {
    /// Creates an empty fixture directory.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = fs::canonicalize(dir.path())?;
        Ok(Self { _dir: dir, root })
    }

    /// Returns the fixture root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `relative` onto the fixture root.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes `contents` to `relative`, creating parent directories.
    pub fn write(
        &self,
        relative: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
    ) -> io::Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Creates the directory `relative` and any missing parents.
    pub fn mkdir(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.path(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// Returns `len` bytes from a xorshift stream seeded with `seed`.
pub fn patterned_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let remaining = len - out.len();
        let bytes = state.to_le_bytes();
        out.extend_from_slice(&bytes[..remaining.min(bytes.len())]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents() {
        let tree = FixtureTree::new().expect("tempdir");
        let path = tree.write("a/b/c.txt", b"hello").expect("write");
        assert_eq!(fs::read(path).expect("read"), b"hello");
        assert!(tree.path("a/b").is_dir());
    }

    #[test]
    fn root_is_canonical() {
        let tree = FixtureTree::new().expect("tempdir");
        assert_eq!(fs::canonicalize(tree.root()).expect("canonical"), tree.root());
    }

    #[test]
    fn patterned_bytes_are_deterministic() {
        assert_eq!(patterned_bytes(100, 7), patterned_bytes(100, 7));
        assert_ne!(patterned_bytes(100, 7), patterned_bytes(100, 8));
        assert_eq!(patterned_bytes(13, 1).len(), 13);
    }
}
