//! crates/store/src/relocation.rs
//! Relocation table mapping logical paths to staged physical locations.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{StoreError, StoreResult};

/// Name prefix reserved for relocation targets directly under a store base.
pub const RELOC_PREFIX: &str = "_reloc";

#[derive(Debug, Default)]
struct Table {
    /// Relative path -> relative relocation target.
    moved: HashMap<PathBuf, PathBuf>,
    /// Every target created, including ones superseded by a later relocation
    /// of the same path.
    staged: Vec<PathBuf>,
}

/// Relocation state owned by one store.
///
/// All operations take the same lock, and [`relocate`](Self::relocate) holds
/// it from claiming a target name until the mapping is recorded.
#[derive(Debug, Default)]
pub struct Relocations {
    table: Mutex<Table>,
}

impl Relocations {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves `base/rel` to a fresh `_reloc*` name directly under `base` and
    /// records the mapping. Returns the new physical path.
    pub fn relocate(&self, base: &Path, rel: &Path) -> StoreResult<PathBuf> {
        let source = base.join(rel);
        let mut table = self.lock();

        let placeholder = tempfile::Builder::new()
            .prefix(RELOC_PREFIX)
            .tempfile_in(base)
            .map_err(|error| StoreError::io("claim relocation target in", base, error))?;
        let target = placeholder.path().to_path_buf();
        placeholder
            .close()
            .map_err(|error| StoreError::io("remove relocation placeholder", &target, error))?;

        fs::rename(&source, &target).map_err(|error| StoreError::io("relocate", &source, error))?;

        let target_rel = target
            .file_name()
            .map_or_else(|| target.clone(), PathBuf::from);
        table.staged.push(target_rel.clone());
        table.moved.insert(rel.to_path_buf(), target_rel);

        logging::trace_store!(
            info,
            from = %source.display(),
            to = %target.display(),
            "relocated path"
        );
        Ok(target)
    }

    /// Maps `rel` to the physical path under `base`, following the longest
    /// relocated ancestor of `rel` (the path itself included).
    #[must_use]
    pub fn resolve(&self, base: &Path, rel: &Path) -> PathBuf {
        let table = self.lock();
        for ancestor in rel.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            if let Some(target) = table.moved.get(ancestor) {
                let mut physical = base.join(target);
                if let Ok(rest) = rel.strip_prefix(ancestor) {
                    if !rest.as_os_str().is_empty() {
                        physical.push(rest);
                    }
                }
                return physical;
            }
        }
        base.join(rel)
    }

    /// Relocated paths and their targets, ordered by path.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(PathBuf, PathBuf)> {
        let mut entries: Vec<_> = self
            .lock()
            .moved
            .iter()
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect();
        entries.sort();
        entries
    }

    /// Number of paths currently relocated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().moved.len()
    }

    /// Returns `true` when nothing is relocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().moved.is_empty()
    }

    /// Forgets relocations whose original path exists again under `base`.
    ///
    /// Staged copies stay on disk until [`purge`](Self::purge). Returns the
    /// number of mappings dropped.
    pub fn forget_reoccupied(&self, base: &Path) -> usize {
        let mut table = self.lock();
        let before = table.moved.len();
        table
            .moved
            .retain(|rel, _| fs::symlink_metadata(base.join(rel)).is_err());
        let dropped = before - table.moved.len();

        if dropped > 0 {
            logging::trace_store!(
                debug,
                dropped,
                base = %base.display(),
                "dropped reoccupied relocations"
            );
        }
        dropped
    }

    /// Deletes every staged target under `base` and clears the table.
    ///
    /// Returns the number of targets removed. Targets that no longer exist are
    /// skipped. On failure the table keeps the entries not yet removed.
    pub fn purge(&self, base: &Path) -> StoreResult<usize> {
        let mut table = self.lock();
        let mut removed = 0;

        while let Some(target) = table.staged.pop() {
            let path = base.join(&target);
            match remove_path(&path) {
                Ok(()) => removed += 1,
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => {
                    table.staged.push(target);
                    return Err(StoreError::io("purge relocation", path, error));
                }
            }
            table.moved.retain(|_, staged| *staged != target);
        }

        logging::trace_store!(info, removed, base = %base.display(), "purged relocations");
        Ok(removed)
    }
}

fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::FixtureTree;

    #[test]
    fn relocate_moves_and_records() {
        let fixture = FixtureTree::new().expect("fixture");
        fixture.write("a.txt", b"old").expect("write");
        let relocations = Relocations::new();

        let target = relocations
            .relocate(fixture.root(), Path::new("a.txt"))
            .expect("relocate");

        assert!(!fixture.path("a.txt").exists());
        assert_eq!(fs::read(&target).expect("read"), b"old");
        assert_eq!(target.parent(), Some(fixture.root()));
        let name = target.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with(RELOC_PREFIX));
        assert_eq!(relocations.resolve(fixture.root(), Path::new("a.txt")), target);
    }

    #[test]
    fn unrelocated_paths_resolve_in_place() {
        let relocations = Relocations::new();
        let base = Path::new("/srv/data");
        assert_eq!(
            relocations.resolve(base, Path::new("x/y.txt")),
            PathBuf::from("/srv/data/x/y.txt")
        );
    }

    #[test]
    fn files_under_relocated_dir_follow_it() {
        let fixture = FixtureTree::new().expect("fixture");
        fixture.write("dir/inner.txt", b"inner").expect("write");
        let relocations = Relocations::new();

        let target = relocations
            .relocate(fixture.root(), Path::new("dir"))
            .expect("relocate");
        let resolved = relocations.resolve(fixture.root(), Path::new("dir/inner.txt"));
        assert_eq!(resolved, target.join("inner.txt"));
        assert_eq!(fs::read(resolved).expect("read"), b"inner");
    }

    #[test]
    fn missing_source_leaves_no_placeholder() {
        let fixture = FixtureTree::new().expect("fixture");
        let relocations = Relocations::new();

        let error = relocations
            .relocate(fixture.root(), Path::new("absent"))
            .unwrap_err();
        assert!(matches!(error, StoreError::Io { action: "relocate", .. }));
        assert!(relocations.is_empty());
        assert_eq!(fs::read_dir(fixture.root()).expect("list").count(), 0);
    }

    #[test]
    fn concurrent_relocations_get_distinct_targets() {
        let fixture = FixtureTree::new().expect("fixture");
        for index in 0..16 {
            fixture.write(format!("f{index}"), b"x").expect("write");
        }
        let relocations = Relocations::new();

        std::thread::scope(|scope| {
            for index in 0..16 {
                let relocations = &relocations;
                let base = fixture.root();
                scope.spawn(move || {
                    relocations
                        .relocate(base, Path::new(&format!("f{index}")))
                        .expect("relocate");
                });
            }
        });

        let snapshot = relocations.snapshot();
        assert_eq!(snapshot.len(), 16);
        let mut targets: Vec<_> = snapshot.iter().map(|(_, to)| to.clone()).collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), 16);
    }

    #[test]
    fn purge_removes_staged_copies() {
        let fixture = FixtureTree::new().expect("fixture");
        fixture.write("a.txt", b"1").expect("write");
        fixture.write("d/b.txt", b"2").expect("write");
        let relocations = Relocations::new();
        relocations.relocate(fixture.root(), Path::new("a.txt")).expect("a");
        relocations.relocate(fixture.root(), Path::new("d")).expect("d");

        fixture.write("a.txt", b"new").expect("rewrite");
        relocations.relocate(fixture.root(), Path::new("a.txt")).expect("a again");
        assert_eq!(relocations.len(), 2);

        assert_eq!(relocations.purge(fixture.root()).expect("purge"), 3);
        assert!(relocations.is_empty());
        assert_eq!(fs::read_dir(fixture.root()).expect("list").count(), 0);
    }

    #[test]
    fn reoccupied_paths_are_forgotten() {
        let fixture = FixtureTree::new().expect("fixture");
        fixture.write("a.txt", b"old").expect("write");
        fixture.write("d/b.txt", b"old").expect("write");
        fixture.write("gone.txt", b"old").expect("write");
        let relocations = Relocations::new();
        for rel in ["a.txt", "d", "gone.txt"] {
            relocations.relocate(fixture.root(), Path::new(rel)).expect("relocate");
        }

        fixture.write("a.txt", b"new").expect("rewrite");
        fixture.write("d/c.txt", b"new").expect("recreate dir");

        assert_eq!(relocations.forget_reoccupied(fixture.root()), 2);
        assert_eq!(
            relocations.resolve(fixture.root(), Path::new("a.txt")),
            fixture.path("a.txt")
        );
        assert_eq!(
            relocations.resolve(fixture.root(), Path::new("d/c.txt")),
            fixture.path("d/c.txt")
        );
        let remaining: Vec<_> = relocations.snapshot().into_iter().map(|(rel, _)| rel).collect();
        assert_eq!(remaining, vec![PathBuf::from("gone.txt")]);

        assert_eq!(relocations.purge(fixture.root()).expect("purge"), 3);
        assert_eq!(fs::read(fixture.path("a.txt")).expect("read"), b"new");
    }
}
