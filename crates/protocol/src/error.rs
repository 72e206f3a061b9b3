//! crates/protocol/src/error.rs
//! Errors raised while encoding or decoding index nodes.

use std::io;

use index::NodeKind;
use thiserror::Error;

/// Error returned by the node codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The blob was written by a different format version.
    #[error("node format version {expected} cannot decode version {found}")]
    VersionMismatch {
        /// Version this decoder understands.
        expected: i32,
        /// Version tag read from the blob.
        found: i32,
    },
    /// Reading or writing failed; truncated input surfaces as
    /// [`io::ErrorKind::UnexpectedEof`].
    #[error("node codec I/O failed: {0}")]
    Io(#[from] io::Error),
    /// An entry name is not valid UTF-8.
    #[error("node name is not valid UTF-8")]
    InvalidName(#[source] std::str::Utf8Error),
    /// A strong checksum field has the wrong length.
    #[error("strong checksum must be {expected} bytes, found {len}")]
    InvalidStrongLength {
        /// Required length.
        expected: usize,
        /// Length read from the blob.
        len: usize,
    },
    /// A tree envelope starts with an unknown kind tag.
    #[error("unknown tree kind tag {tag:#04x}")]
    InvalidKind {
        /// Tag byte read from the envelope.
        tag: u8,
    },
    /// An encoder was handed a node of the wrong kind.
    #[error("expected a {expected} node, found a {found} node")]
    WrongNodeKind {
        /// Kind the encoder handles.
        expected: NodeKind,
        /// Kind it was given.
        found: NodeKind,
    },
    /// Bytes remain after a complete node was decoded.
    #[error("{count} trailing bytes after node")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        count: usize,
    },
    /// A length, count, size, or position is negative or exceeds the input.
    #[error("length {len} is out of range")]
    LengthOverflow {
        /// Offending value.
        len: i64,
    },
    /// A file's blocks are not numbered consecutively from zero.
    #[error("block at index {expected} carries position {found}")]
    BlockPosition {
        /// Position implied by the block's index.
        expected: u64,
        /// Position read from the blob.
        found: u64,
    },
    /// Directory blobs nest deeper than the decoder allows.
    #[error("directory nesting exceeds {limit} levels")]
    NestingTooDeep {
        /// Maximum supported depth.
        limit: usize,
    },
}

impl CodecError {
    /// Returns `true` for [`CodecError::VersionMismatch`].
    #[must_use]
    pub const fn is_version_mismatch(&self) -> bool {
        matches!(self, Self::VersionMismatch { .. })
    }
}
