//! crates/store/src/local.rs
//! Directory- and file-rooted stores sharing one relocation-aware core.

use std::fs;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use checksums::StrongSum;
use index::{BlockIndex, IndexBuilder, NodeKind};

use crate::error::{StoreError, StoreResult};
use crate::relocation::{RELOC_PREFIX, Relocations};
use crate::traits::{BlockStore, LocalStore};

#[derive(Debug)]
struct StoreCore {
    kind: NodeKind,
    root_path: PathBuf,
    base_path: PathBuf,
    alias_base: PathBuf,
    parallel: bool,
    index: BlockIndex,
    relocations: Relocations,
}

impl StoreCore {
    fn open(root: &Path, kind: NodeKind, parallel: bool) -> StoreResult<Self> {
        let alias =
            std::path::absolute(root).map_err(|error| StoreError::io("resolve", root, error))?;
        let root_path =
            fs::canonicalize(&alias).map_err(|error| StoreError::io("inspect", &alias, error))?;
        let metadata = fs::metadata(&root_path)
            .map_err(|error| StoreError::io("inspect", &root_path, error))?;
        let matches = match kind {
            NodeKind::Dir => metadata.is_dir(),
            NodeKind::File => metadata.is_file(),
            NodeKind::Block => false,
        };
        if !matches {
            return Err(StoreError::WrongRootKind {
                path: root_path,
                expected: kind,
            });
        }

        let base_path = base_of(&root_path, kind);
        let alias_base = base_of(&alias, kind);

        let index = build_index(&root_path, kind, parallel)?;
        Ok(Self {
            kind,
            root_path,
            base_path,
            alias_base,
            parallel,
            index,
            relocations: Relocations::new(),
        })
    }

    /// Accepts paths under either the canonical base or the spelling the
    /// store was opened with.
    fn rel_path(&self, full: &Path) -> StoreResult<PathBuf> {
        let absolute =
            std::path::absolute(full).map_err(|error| StoreError::io("resolve", full, error))?;
        let rel = [&self.base_path, &self.alias_base]
            .into_iter()
            .find_map(|base| absolute.strip_prefix(base).ok())
            .map(Path::to_path_buf);
        match rel {
            Some(rel) => Ok(rel),
            None => Err(StoreError::OutsideRoot { path: absolute }),
        }
    }

    fn relocate(&self, full: &Path) -> StoreResult<PathBuf> {
        let rel = self.rel_path(full)?;
        if rel.as_os_str().is_empty() {
            return Err(StoreError::RelocateRoot);
        }
        self.relocations.relocate(&self.base_path, &rel)
    }

    fn resolve(&self, rel: &Path) -> PathBuf {
        self.relocations.resolve(&self.base_path, rel)
    }

    fn read_into(
        &self,
        strong: &StrongSum,
        offset: u64,
        length: u64,
        destination: &mut dyn Write,
    ) -> StoreResult<u64> {
        let rel = self
            .index
            .strong_file(strong)
            .and_then(|file| file.rel_path())
            .ok_or(StoreError::FileNotFound(*strong))?;
        let path = self.resolve(&rel);

        let mut file =
            fs::File::open(&path).map_err(|error| StoreError::io("open", &path, error))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|error| StoreError::io("seek", &path, error))?;
        let copied = io::copy(&mut io::Read::take(file, length), destination)
            .map_err(|error| StoreError::io("copy", &path, error))?;

        logging::trace_store!(
            trace,
            path = %path.display(),
            offset,
            length,
            copied,
            "read file range"
        );

        if copied < length {
            return Err(StoreError::ShortRead {
                path,
                expected: length,
                copied,
            });
        }
        Ok(copied)
    }

    fn reindex(&mut self) -> StoreResult<()> {
        self.index = build_index(&self.root_path, self.kind, self.parallel)?;
        self.relocations.forget_reoccupied(&self.base_path);
        Ok(())
    }
}

fn base_of(root: &Path, kind: NodeKind) -> PathBuf {
    match kind {
        NodeKind::File => root.parent().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
        NodeKind::Dir | NodeKind::Block => root.to_path_buf(),
    }
}

fn build_index(root: &Path, kind: NodeKind, parallel: bool) -> StoreResult<BlockIndex> {
    let mut builder = IndexBuilder::new(root).parallel(parallel);
    if kind == NodeKind::Dir {
        builder = builder.skip_prefix(RELOC_PREFIX);
    }
    let tree = builder.build()?;

    let found = tree.root().kind();
    if found != kind {
        return Err(StoreError::WrongRootKind {
            path: root.to_path_buf(),
            expected: kind,
        });
    }

    logging::trace_store!(
        debug,
        root = %root.display(),
        files = tree.file_count(),
        blocks = tree.block_count(),
        "store indexed"
    );
    Ok(BlockIndex::new(Arc::new(tree)))
}

macro_rules! local_store {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            core: StoreCore,
        }

        impl $name {
            /// Indexes `root` and opens a store over it.
            ///
            /// # Errors
            ///
            /// [`StoreError::WrongRootKind`] when `root` has the wrong kind,
            /// [`StoreError::Io`] when it cannot be inspected, and
            /// [`StoreError::Index`] when indexing fails.
            pub fn open<P: AsRef<Path>>(root: P) -> StoreResult<Self> {
                Self::with_parallel(root.as_ref(), true)
            }

            pub(crate) fn with_parallel(root: &Path, parallel: bool) -> StoreResult<Self> {
                StoreCore::open(root, $kind, parallel).map(|core| Self { core })
            }

            /// Relocation table backing this store.
            #[must_use]
            pub const fn relocation_table(&self) -> &Relocations {
                &self.core.relocations
            }
        }

        impl BlockStore for $name {
            fn index(&self) -> &BlockIndex {
                &self.core.index
            }

            fn read_into(
                &self,
                strong: &StrongSum,
                offset: u64,
                length: u64,
                destination: &mut dyn Write,
            ) -> StoreResult<u64> {
                self.core.read_into(strong, offset, length, destination)
            }
        }

        impl LocalStore for $name {
            fn root_path(&self) -> &Path {
                &self.core.root_path
            }

            fn base_path(&self) -> &Path {
                &self.core.base_path
            }

            fn rel_path(&self, full: &Path) -> StoreResult<PathBuf> {
                self.core.rel_path(full)
            }

            fn relocate(&self, full: &Path) -> StoreResult<PathBuf> {
                self.core.relocate(full)
            }

            fn resolve(&self, rel: &Path) -> PathBuf {
                self.core.resolve(rel)
            }

            fn relocations(&self) -> Vec<(PathBuf, PathBuf)> {
                self.core.relocations.snapshot()
            }

            fn purge_relocations(&self) -> StoreResult<usize> {
                self.core.relocations.purge(&self.core.base_path)
            }

            fn reindex(&mut self) -> StoreResult<()> {
                self.core.reindex()
            }
        }
    };
}

local_store!(
    /// Store rooted at a directory.
    ///
    /// Relative paths are anchored at the directory itself. Top-level entries
    /// named with [`RELOC_PREFIX`] are staged copies and are never indexed.
    DirStore,
    NodeKind::Dir
);

local_store!(
    /// Store rooted at a single regular file.
    ///
    /// Relative paths are anchored at the file's parent directory, so the
    /// root file's own relative path is its name and relocation targets are
    /// its siblings.
    FileStore,
    NodeKind::File
);
