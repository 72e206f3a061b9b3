//! crates/store/src/traits.rs
//! Store capabilities shared by every backend.

use std::io::Write;
use std::path::{Path, PathBuf};

use checksums::StrongSum;
use index::{BlockIndex, IndexTree, NodeRef};

use crate::error::{StoreError, StoreResult};

/// Read access to content-addressed bytes.
///
/// The tree and [`BlockIndex`] are immutable between reindexes, so reads of
/// different checksums may run concurrently; each read opens its own handle.
pub trait BlockStore: Send + Sync {
    /// Lookup index over the current tree.
    fn index(&self) -> &BlockIndex;

    /// Current tree.
    fn tree(&self) -> &IndexTree {
        self.index().tree()
    }

    /// Top-level node: a directory or a single file depending on the backend.
    fn root(&self) -> NodeRef<'_> {
        self.tree().root()
    }

    /// Returns the bytes of the block whose strong checksum is `strong`.
    ///
    /// The result is exactly the block's length; the final block of a file
    /// may be shorter than [`index::BLOCK_SIZE`].
    ///
    /// # Errors
    ///
    /// [`StoreError::BlockNotFound`] when no block carries `strong`, or any
    /// error from [`read_into`](Self::read_into).
    fn read_block(&self, strong: &StrongSum) -> StoreResult<Vec<u8>> {
        let block = self
            .index()
            .strong_block(strong)
            .ok_or(StoreError::BlockNotFound(*strong))?;
        let file = block.parent().ok_or(StoreError::BlockNotFound(*strong))?;
        let (offset, length) = block
            .block_range()
            .ok_or(StoreError::BlockNotFound(*strong))?;

        let mut bytes = Vec::with_capacity(usize::try_from(length).unwrap_or_default());
        self.read_into(&file.strong(), offset, length, &mut bytes)?;
        Ok(bytes)
    }

    /// Copies `length` bytes starting at `offset` of the file whose strong
    /// checksum is `strong` into `destination`.
    ///
    /// Returns `length` on success. Relocated files are read from their
    /// current location.
    ///
    /// # Errors
    ///
    /// [`StoreError::FileNotFound`] when no file carries `strong`,
    /// [`StoreError::Io`] when opening, seeking, or copying fails, and
    /// [`StoreError::ShortRead`] when the file ends early.
    fn read_into(
        &self,
        strong: &StrongSum,
        offset: u64,
        length: u64,
        destination: &mut dyn Write,
    ) -> StoreResult<u64>;
}

/// A [`BlockStore`] backed by a local filesystem root, with a relocation
/// table that remaps logical paths to staged copies.
pub trait LocalStore: BlockStore {
    /// Path the store was opened on.
    fn root_path(&self) -> &Path;

    /// Directory relative paths are anchored at. Relocation targets are
    /// created directly inside it.
    fn base_path(&self) -> &Path;

    /// Strips the base directory from `full`, yielding the key used by the
    /// relocation table.
    ///
    /// # Errors
    ///
    /// [`StoreError::OutsideRoot`] when `full` is not under the base.
    fn rel_path(&self, full: &Path) -> StoreResult<PathBuf>;

    /// Moves the file or directory at `full` to a fresh reserved name under
    /// the base and records the mapping. Returns the new physical path.
    ///
    /// # Errors
    ///
    /// [`StoreError::RelocateRoot`] for the base itself,
    /// [`StoreError::OutsideRoot`] for foreign paths, and
    /// [`StoreError::Io`] when claiming or renaming fails.
    fn relocate(&self, full: &Path) -> StoreResult<PathBuf>;

    /// Physical location currently holding the bytes of `rel`.
    fn resolve(&self, rel: &Path) -> PathBuf;

    /// Relocated paths and their targets relative to the base.
    fn relocations(&self) -> Vec<(PathBuf, PathBuf)>;

    /// Deletes staged copies and empties the relocation table. Returns the
    /// number of copies removed.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] when a staged copy cannot be deleted.
    fn purge_relocations(&self) -> StoreResult<usize>;

    /// Rebuilds the tree and index from disk, replacing both on success.
    /// Relocations whose original path exists again are forgotten so reads
    /// see the new content; their staged copies remain until
    /// [`purge_relocations`](Self::purge_relocations).
    ///
    /// # Errors
    ///
    /// [`StoreError::Index`] when the walk fails and
    /// [`StoreError::WrongRootKind`] when the root changed kind.
    fn reindex(&mut self) -> StoreResult<()>;
}
