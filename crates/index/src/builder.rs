//! crates/index/src/builder.rs
//! Filesystem indexing into content-addressed trees.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use checksums::strong::Sha1;
use checksums::{RollingChecksum, StrongSum};

use crate::error::IndexError;
use crate::merkle::dir_strong;
use crate::node::{BLOCK_SIZE, Block, Dir, File, NodeId, NodeKind};
use crate::tree::{IndexTree, TreeBuilder};

/// Configures an index build rooted at a directory or a single regular file.
///
/// Directory roots produce a [`Dir`] root; file roots produce a lone [`File`]
/// root. Directory entries are visited in byte order of their names.
/// Symbolic links and special files carry no block content and are skipped.
///
/// The build aborts on the first entry that cannot be read; the error names
/// the offending path.
#[derive(Clone, Debug)]
pub struct IndexBuilder {
    root: PathBuf,
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    parallel: bool,
    skip_prefix: Option<String>,
}

impl IndexBuilder {
    /// Creates a builder for `root`.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            parallel: true,
            skip_prefix: None,
        }
    }

    /// Controls whether sibling files of a directory are hashed on the rayon
    /// pool. Has no effect without the `parallel` feature.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Excludes entries directly under a directory root whose name starts
    /// with `prefix`.
    #[must_use]
    pub fn skip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.skip_prefix = Some(prefix.into());
        self
    }

    /// Walks the root and returns the completed tree.
    pub fn build(self) -> Result<IndexTree, IndexError> {
        let metadata = fs::symlink_metadata(&self.root)
            .map_err(|error| IndexError::root_metadata(self.root.clone(), error))?;
        let file_type = metadata.file_type();

        logging::trace_index!(info, root = %self.root.display(), "index build started");

        let mut builder = TreeBuilder::new();
        let root = if file_type.is_dir() {
            let name = root_name(&self.root)?;
            let staged = self.scan_dir(&self.root, name, mode_of(&metadata), true)?;
            staged.push_into(&mut builder)
        } else if file_type.is_file() {
            let name = root_name(&self.root)?;
            let staged = PendingFile {
                path: self.root.clone(),
                name,
                mode: mode_of(&metadata),
            }
            .index()?;
            staged.push_into(&mut builder)
        } else {
            return Err(IndexError::UnsupportedRoot { path: self.root });
        };

        let tree = builder.finish(root);
        logging::trace_index!(
            info,
            root = %self.root.display(),
            strong = %tree.root().strong(),
            files = tree.file_count(),
            blocks = tree.block_count(),
            "index build finished"
        );
        Ok(tree)
    }

    fn scan_dir(
        &self,
        path: &Path,
        name: String,
        mode: u32,
        top_level: bool,
    ) -> Result<StagedDir, IndexError> {
        let mut names = fs::read_dir(path)
            .map_err(|error| IndexError::read_dir(path.to_path_buf(), error))?
            .map(|entry| {
                entry
                    .map(|entry| entry.file_name())
                    .map_err(|error| IndexError::read_dir_entry(path.to_path_buf(), error))
            })
            .collect::<Result<Vec<OsString>, _>>()?;
        names.sort();

        let mut dirs = Vec::new();
        let mut pending = Vec::new();

        for entry_name in names {
            if top_level && self.is_skipped(&entry_name) {
                logging::trace_index!(debug, name = ?entry_name, "skipping reserved entry");
                continue;
            }

            let entry_path = path.join(&entry_name);
            let entry_name = entry_name
                .into_string()
                .map_err(|_| IndexError::InvalidName {
                    path: entry_path.clone(),
                })?;
            let metadata = fs::symlink_metadata(&entry_path)
                .map_err(|error| IndexError::metadata(entry_path.clone(), error))?;
            let file_type = metadata.file_type();

            if file_type.is_dir() {
                dirs.push(self.scan_dir(&entry_path, entry_name, mode_of(&metadata), false)?);
            } else if file_type.is_file() {
                pending.push(PendingFile {
                    path: entry_path,
                    name: entry_name,
                    mode: mode_of(&metadata),
                });
            } else {
                logging::trace_index!(
                    debug,
                    path = %entry_path.display(),
                    "skipping entry without block content"
                );
            }
        }

        let files = self.index_files(pending)?;
        let strong = dir_strong(
            dirs.iter()
                .map(|staged| (staged.dir.name(), NodeKind::Dir, staged.dir.strong()))
                .chain(
                    files
                        .iter()
                        .map(|staged| (staged.file.name(), NodeKind::File, staged.file.strong())),
                ),
        );

        logging::trace_index!(
            debug,
            path = %path.display(),
            dirs = dirs.len(),
            files = files.len(),
            %strong,
            "indexed directory"
        );

        Ok(StagedDir {
            dir: Dir::new(name, mode, strong),
            dirs,
            files,
        })
    }

    fn index_files(&self, pending: Vec<PendingFile>) -> Result<Vec<StagedFile>, IndexError> {
        #[cfg(feature = "parallel")]
        if self.parallel && pending.len() > 1 {
            use rayon::prelude::*;
            return pending.into_par_iter().map(PendingFile::index).collect();
        }

        pending.into_iter().map(PendingFile::index).collect()
    }

    fn is_skipped(&self, name: &std::ffi::OsStr) -> bool {
        self.skip_prefix
            .as_deref()
            .is_some_and(|prefix| name.to_str().is_some_and(|name| name.starts_with(prefix)))
    }
}

struct PendingFile {
    path: PathBuf,
    name: String,
    mode: u32,
}

impl PendingFile {
    fn index(self) -> Result<StagedFile, IndexError> {
        let reader = fs::File::open(&self.path)
            .map_err(|error| IndexError::read_file(self.path.clone(), error))?;
        let chunks =
            chunk_reader(reader).map_err(|error| IndexError::read_file(self.path.clone(), error))?;

        logging::trace_index!(
            trace,
            path = %self.path.display(),
            size = chunks.size,
            blocks = chunks.blocks.len(),
            "indexed file"
        );

        Ok(StagedFile {
            file: File::new(self.name, self.mode, chunks.strong, chunks.size),
            blocks: chunks.blocks,
        })
    }
}

struct StagedFile {
    file: File,
    blocks: Vec<Block>,
}

impl StagedFile {
    fn push_into(self, builder: &mut TreeBuilder) -> NodeId {
        let blocks = self
            .blocks
            .into_iter()
            .map(|block| builder.push_block(block))
            .collect();
        builder.push_file(self.file, blocks)
    }
}

struct StagedDir {
    dir: Dir,
    dirs: Vec<StagedDir>,
    files: Vec<StagedFile>,
}

impl StagedDir {
    fn push_into(self, builder: &mut TreeBuilder) -> NodeId {
        let dirs = self
            .dirs
            .into_iter()
            .map(|staged| staged.push_into(builder))
            .collect();
        let files = self
            .files
            .into_iter()
            .map(|staged| staged.push_into(builder))
            .collect();
        builder.push_dir(self.dir, dirs, files)
    }
}

/// Blocks and whole-content checksum of one file.
pub(crate) struct Chunks {
    pub(crate) blocks: Vec<Block>,
    pub(crate) strong: StrongSum,
    pub(crate) size: u64,
}

/// Splits `reader` into [`BLOCK_SIZE`] blocks, hashing the whole stream as it goes.
pub(crate) fn chunk_reader<R: Read>(mut reader: R) -> io::Result<Chunks> {
    let mut buffer = vec![0u8; BLOCK_SIZE];
    let mut whole = Sha1::new();
    let mut blocks = Vec::new();
    let mut size = 0u64;

    loop {
        let filled = fill_block(&mut reader, &mut buffer)?;
        if filled == 0 {
            break;
        }

        let chunk = &buffer[..filled];
        whole.update(chunk);

        let mut weak = RollingChecksum::new();
        weak.update(chunk);
        blocks.push(Block::new(
            blocks.len() as u64,
            weak.value(),
            Sha1::digest(chunk),
        ));
        size += filled as u64;

        if filled < BLOCK_SIZE {
            break;
        }
    }

    Ok(Chunks {
        blocks,
        strong: whole.finalize(),
        size,
    })
}

fn fill_block<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
    Ok(filled)
}

fn root_name(path: &Path) -> Result<String, IndexError> {
    match path.file_name() {
        None => Ok(String::new()),
        Some(name) => name
            .to_str()
            .map(str::to_owned)
            .ok_or_else(|| IndexError::InvalidName {
                path: path.to_path_buf(),
            }),
    }
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    let base = if metadata.is_dir() { 0o755 } else { 0o644 };
    if metadata.permissions().readonly() {
        base & !0o222
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reader that returns at most `step` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = self.step.min(buf.len()).min(self.data.len());
            buf[..len].copy_from_slice(&self.data[..len]);
            self.data = &self.data[len..];
            Ok(len)
        }
    }

    #[test]
    fn empty_input_has_no_blocks() {
        let chunks = chunk_reader(io::empty()).expect("chunk");
        assert!(chunks.blocks.is_empty());
        assert_eq!(chunks.size, 0);
        assert_eq!(chunks.strong, Sha1::digest(b""));
    }

    #[test]
    fn short_reads_still_fill_blocks() {
        let data = test_support::patterned_bytes(BLOCK_SIZE + 17, 3);
        let chunks = chunk_reader(Trickle {
            data: &data,
            step: 1000,
        })
        .expect("chunk");
        assert_eq!(chunks.blocks.len(), 2);
        assert_eq!(chunks.blocks[0].strong(), Sha1::digest(&data[..BLOCK_SIZE]));
        assert_eq!(chunks.blocks[1].strong(), Sha1::digest(&data[BLOCK_SIZE..]));
    }

    #[test]
    fn weak_sums_match_rolling_update() {
        let data = test_support::patterned_bytes(BLOCK_SIZE * 2, 9);
        let chunks = chunk_reader(&data[..]).expect("chunk");
        let mut expected = RollingChecksum::new();
        expected.update(&data[BLOCK_SIZE..]);
        assert_eq!(chunks.blocks[1].weak(), expected.value());
        assert_eq!(chunks.blocks[1].position(), 1);
    }

    /// Reader that yields `good` bytes and then fails.
    struct Failing {
        good: usize,
        interrupted: bool,
    }

    impl Read for Failing {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::ErrorKind::Interrupted.into());
            }
            if self.good == 0 {
                return Err(io::Error::other("device gone"));
            }
            let len = self.good.min(buf.len());
            buf[..len].fill(7);
            self.good -= len;
            Ok(len)
        }
    }

    #[test]
    fn read_failure_mid_file_aborts_chunking() {
        let error = chunk_reader(Failing {
            good: BLOCK_SIZE + 5,
            interrupted: false,
        })
        .err()
        .expect("failing reader");
        assert_eq!(error.kind(), io::ErrorKind::Other);
        assert_eq!(error.to_string(), "device gone");
    }

    #[test]
    fn vanished_file_reports_read_file() {
        let fixture = test_support::FixtureTree::new().expect("fixture");
        let path = fixture.path("vanished.bin");
        let error = PendingFile {
            path: path.clone(),
            name: "vanished.bin".to_owned(),
            mode: 0o644,
        }
        .index()
        .err()
        .expect("missing file");

        assert!(matches!(error, IndexError::ReadFile { .. }));
        assert_eq!(error.path(), path);
        let source = error.io_error().expect("io source");
        assert_eq!(source.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn unreadable_file_content_reports_read_file() {
        let fixture = test_support::FixtureTree::new().expect("fixture");
        let error = PendingFile {
            path: fixture.root().to_path_buf(),
            name: "not-a-file".to_owned(),
            mode: 0o644,
        }
        .index()
        .err()
        .expect("directory is not readable as a file");

        assert!(matches!(error, IndexError::ReadFile { .. }));
        assert_eq!(error.path(), fixture.root());
        assert!(error.io_error().is_some());
    }

    #[test]
    fn unlistable_dir_reports_read_dir() {
        let fixture = test_support::FixtureTree::new().expect("fixture");
        let path = fixture.write("plain", b"x").expect("write");
        let error = IndexBuilder::new(fixture.root())
            .scan_dir(&path, "plain".to_owned(), 0o755, false)
            .err()
            .expect("file is not listable");

        assert!(matches!(error, IndexError::ReadDir { .. }));
        assert_eq!(error.path(), path);
        assert!(error.io_error().is_some());
        assert!(error.to_string().starts_with("failed to read directory"));
    }

    #[test]
    fn root_name_of_bare_root_is_empty() {
        assert_eq!(root_name(Path::new("/")).expect("name"), "");
        assert_eq!(root_name(Path::new("a/b.txt")).expect("name"), "b.txt");
    }

    proptest! {
        #[test]
        fn blocks_reassemble_input(len in 0usize..(3 * BLOCK_SIZE + 10), seed in any::<u64>()) {
            let data = test_support::patterned_bytes(len, seed);
            let chunks = chunk_reader(&data[..]).expect("chunk");

            prop_assert_eq!(chunks.size, len as u64);
            prop_assert_eq!(chunks.strong, Sha1::digest(&data));
            prop_assert_eq!(chunks.blocks.len() as u64, (len as u64).div_ceil(BLOCK_SIZE as u64));

            let mut rebuilt = Vec::with_capacity(len);
            for block in &chunks.blocks {
                let start = block.offset() as usize;
                let end = start + block.len_in(chunks.size) as usize;
                prop_assert_eq!(block.strong(), Sha1::digest(&data[start..end]));
                rebuilt.extend_from_slice(&data[start..end]);
            }
            prop_assert_eq!(rebuilt, data);
        }
    }
}
