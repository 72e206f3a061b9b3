//! crates/index/src/node.rs
//! Node payloads stored in an [`IndexTree`](crate::IndexTree).

use std::fmt;

use checksums::StrongSum;

/// Size in bytes of every block except possibly the last one of a file.
pub const BLOCK_SIZE: usize = 8192;

/// Largest block position whose byte offset fits in a `u64`.
pub const MAX_BLOCK_POSITION: u64 = u64::MAX / BLOCK_SIZE as u64;

/// Position of a node inside its [`IndexTree`](crate::IndexTree) arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the arena slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Discriminates the three node variants.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// A fixed-size chunk of a file.
    Block,
    /// A regular file.
    File,
    /// A directory.
    Dir,
}

impl NodeKind {
    /// Single-letter tag used in directory hash lines.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Block => 'b',
            Self::File => 'f',
            Self::Dir => 'd',
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Block => "block",
            Self::File => "file",
            Self::Dir => "dir",
        })
    }
}

/// A block of file content identified by its position within the owning file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Block {
    position: u64,
    weak: u32,
    strong: StrongSum,
}

impl Block {
    /// Creates a block descriptor.
    #[must_use]
    pub const fn new(position: u64, weak: u32, strong: StrongSum) -> Self {
        Self {
            position,
            weak,
            strong,
        }
    }

    /// Ordinal of the block within its file.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Byte offset of the block within its file.
    ///
    /// Saturates at `u64::MAX` for positions above [`MAX_BLOCK_POSITION`].
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.position.saturating_mul(BLOCK_SIZE as u64)
    }

    /// Weak rolling checksum of the block bytes.
    #[must_use]
    pub const fn weak(&self) -> u32 {
        self.weak
    }

    /// Strong checksum of the block bytes.
    #[must_use]
    pub const fn strong(&self) -> StrongSum {
        self.strong
    }

    /// Length of this block inside a file of `file_size` bytes.
    #[must_use]
    pub fn len_in(&self, file_size: u64) -> u64 {
        file_size
            .saturating_sub(self.offset())
            .min(BLOCK_SIZE as u64)
    }
}

/// A regular file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct File {
    name: String,
    mode: u32,
    strong: StrongSum,
    size: u64,
}

impl File {
    /// Creates a file descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, mode: u32, strong: StrongSum, size: u64) -> Self {
        Self {
            name: name.into(),
            mode,
            strong,
            size,
        }
    }

    /// Entry name (final path component).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permission bits.
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Strong checksum of the whole file content.
    #[must_use]
    pub const fn strong(&self) -> StrongSum {
        self.strong
    }

    /// Content length in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Number of blocks a file of this size is chunked into.
    #[must_use]
    pub const fn block_count(&self) -> u64 {
        self.size.div_ceil(BLOCK_SIZE as u64)
    }
}

/// A directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dir {
    name: String,
    mode: u32,
    strong: StrongSum,
}

impl Dir {
    /// Creates a directory descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, mode: u32, strong: StrongSum) -> Self {
        Self {
            name: name.into(),
            mode,
            strong,
        }
    }

    /// Entry name (final path component).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permission bits.
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Merkle hash over the sorted children.
    #[must_use]
    pub const fn strong(&self) -> StrongSum {
        self.strong
    }
}

/// Closed set of node variants.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    /// Block payload.
    Block(Block),
    /// File payload.
    File(File),
    /// Directory payload.
    Dir(Dir),
}

impl Node {
    /// Variant discriminant.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Block(_) => NodeKind::Block,
            Self::File(_) => NodeKind::File,
            Self::Dir(_) => NodeKind::Dir,
        }
    }

    /// Strong checksum regardless of variant.
    #[must_use]
    pub const fn strong(&self) -> StrongSum {
        match self {
            Self::Block(block) => block.strong(),
            Self::File(file) => file.strong(),
            Self::Dir(dir) => dir.strong(),
        }
    }

    /// Entry name for files and directories.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Block(_) => None,
            Self::File(file) => Some(file.name()),
            Self::Dir(dir) => Some(dir.name()),
        }
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Self::Block(block)
    }
}

impl From<File> for Node {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Dir> for Node {
    fn from(dir: Dir) -> Self {
        Self::Dir(dir)
    }
}
