//! crates/store/src/builder.rs
//! Opening the right backend for a filesystem root.

use std::fs;
use std::path::{Path, PathBuf};

use index::NodeKind;

use crate::error::{StoreError, StoreResult};
use crate::local::{DirStore, FileStore};
use crate::traits::LocalStore;

/// Configures how a store is opened.
///
/// The backend is chosen by inspecting the root: directories open a
/// [`DirStore`] and regular files a [`FileStore`].
#[derive(Clone, Debug)]
pub struct StoreBuilder {
    root: PathBuf,
    parallel: bool,
}

impl StoreBuilder {
    /// Creates a builder for `root`.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            parallel: true,
        }
    }

    /// Controls whether indexing hashes sibling files in parallel.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Opens a directory store, failing if the root is not a directory.
    ///
    /// # Errors
    ///
    /// See [`DirStore::open`].
    pub fn open_dir(&self) -> StoreResult<DirStore> {
        DirStore::with_parallel(&self.root, self.parallel)
    }

    /// Opens a file store, failing if the root is not a regular file.
    ///
    /// # Errors
    ///
    /// See [`FileStore::open`].
    pub fn open_file(&self) -> StoreResult<FileStore> {
        FileStore::with_parallel(&self.root, self.parallel)
    }

    /// Inspects the root and opens the matching backend. Symbolic links are
    /// followed.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] when the root cannot be inspected,
    /// [`StoreError::WrongRootKind`] when it is neither a directory nor a
    /// regular file, and [`StoreError::Index`] when indexing fails.
    pub fn open(&self) -> StoreResult<Box<dyn LocalStore>> {
        let metadata = fs::metadata(&self.root)
            .map_err(|error| StoreError::io("inspect", &self.root, error))?;

        if metadata.is_dir() {
            Ok(Box::new(self.open_dir()?))
        } else if metadata.is_file() {
            Ok(Box::new(self.open_file()?))
        } else {
            Err(StoreError::WrongRootKind {
                path: self.root.clone(),
                expected: NodeKind::Dir,
            })
        }
    }
}

/// Opens a store over `root` with default settings.
///
/// # Errors
///
/// See [`StoreBuilder::open`].
pub fn open<P: AsRef<Path>>(root: P) -> StoreResult<Box<dyn LocalStore>> {
    StoreBuilder::new(root.as_ref()).open()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::BlockStore;
    use test_support::FixtureTree;

    #[test]
    fn directory_opens_dir_store() {
        let fixture = FixtureTree::new().expect("fixture");
        fixture.write("a", b"a").expect("write");
        let store = open(fixture.root()).expect("open");
        assert_eq!(store.root().kind(), NodeKind::Dir);
    }

    #[test]
    fn file_opens_file_store() {
        let fixture = FixtureTree::new().expect("fixture");
        let path = fixture.write("a", b"a").expect("write");
        let store = StoreBuilder::new(&path).parallel(false).open().expect("open");
        assert_eq!(store.root().kind(), NodeKind::File);
        assert_eq!(store.base_path(), fixture.root());
    }

    #[test]
    fn missing_root_is_io_error() {
        let fixture = FixtureTree::new().expect("fixture");
        let error = open(fixture.path("absent")).err().expect("missing root");
        assert!(matches!(error, StoreError::Io { action: "inspect", .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_roots_open_their_target() {
        let fixture = FixtureTree::new().expect("fixture");
        let target = fixture.write("dir/target", b"x").expect("write");
        let file_link = fixture.path("file-link");
        let dir_link = fixture.path("dir-link");
        std::os::unix::fs::symlink(&target, &file_link).expect("symlink");
        std::os::unix::fs::symlink(fixture.path("dir"), &dir_link).expect("symlink");

        let file = open(&file_link).expect("file link");
        assert_eq!(file.root().kind(), NodeKind::File);
        assert_eq!(file.root_path(), target);

        let dir = open(&dir_link).expect("dir link");
        assert_eq!(dir.root().kind(), NodeKind::Dir);
        assert_eq!(dir.tree().file_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_root_is_io_error() {
        let fixture = FixtureTree::new().expect("fixture");
        let link = fixture.path("dangling");
        std::os::unix::fs::symlink(fixture.path("absent"), &link).expect("symlink");

        let error = open(&link).err().expect("dangling root");
        assert!(matches!(error, StoreError::Io { action: "inspect", .. }));
    }

    #[cfg(unix)]
    #[test]
    fn device_root_is_wrong_kind() {
        let error = open("/dev/null").err().expect("device root");
        assert!(matches!(
            error,
            StoreError::WrongRootKind {
                expected: NodeKind::Dir,
                ..
            }
        ));
    }
}
