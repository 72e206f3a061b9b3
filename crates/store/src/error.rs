//! crates/store/src/error.rs
//! Errors raised by local block stores.

use std::io;
use std::path::{Path, PathBuf};

use checksums::StrongSum;
use index::{IndexError, NodeKind};
use thiserror::Error;

/// Result alias used throughout the store.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by [`BlockStore`](crate::BlockStore) and
/// [`LocalStore`](crate::LocalStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No block in the index carries the checksum.
    #[error("block with strong checksum {0} not found")]
    BlockNotFound(StrongSum),
    /// No file in the index carries the checksum.
    #[error("file with strong checksum {0} not found")]
    FileNotFound(StrongSum),
    /// A filesystem operation failed.
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        /// Operation that failed.
        action: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// A read ended before the requested length was copied.
    #[error("short read from '{}': copied {copied} of {expected} bytes", path.display())]
    ShortRead {
        /// File being read.
        path: PathBuf,
        /// Requested length.
        expected: u64,
        /// Bytes actually copied to the destination.
        copied: u64,
    },
    /// A path does not lie under the store base directory.
    #[error("'{}' is outside the store root", path.display())]
    OutsideRoot {
        /// Offending path.
        path: PathBuf,
    },
    /// The store base directory itself cannot be relocated.
    #[error("cannot relocate the store root")]
    RelocateRoot,
    /// The root is not of the kind the store variant requires.
    #[error("store root '{}' is not a {expected}", path.display())]
    WrongRootKind {
        /// Root path.
        path: PathBuf,
        /// Kind the store variant indexes.
        expected: NodeKind,
    },
    /// Building the index failed.
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Returns `true` when a checksum lookup missed.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::BlockNotFound(_) | Self::FileNotFound(_))
    }

    /// Path associated with the failure, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. }
            | Self::ShortRead { path, .. }
            | Self::OutsideRoot { path }
            | Self::WrongRootKind { path, .. } => Some(path),
            Self::Index(error) => Some(error.path()),
            Self::BlockNotFound(_) | Self::FileNotFound(_) | Self::RelocateRoot => None,
        }
    }
}
