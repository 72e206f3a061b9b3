//! crates/index/src/error.rs
//! Errors raised while building an index tree.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error returned when an index build fails.
///
/// Every variant records the path that could not be processed.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The root could not be inspected.
    #[error("failed to inspect index root '{}': {source}", path.display())]
    RootMetadata {
        /// Root path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The root is neither a directory nor a regular file.
    #[error("index root '{}' is neither a directory nor a regular file", path.display())]
    UnsupportedRoot {
        /// Root path.
        path: PathBuf,
    },
    /// A directory could not be listed.
    #[error("failed to read directory '{}': {source}", path.display())]
    ReadDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// An entry of a directory listing could not be read.
    #[error("failed to read entry in '{}': {source}", path.display())]
    ReadDirEntry {
        /// Directory path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// Metadata for an entry could not be queried.
    #[error("failed to inspect metadata for '{}': {source}", path.display())]
    Metadata {
        /// Entry path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// File content could not be read.
    #[error("failed to read file '{}': {source}", path.display())]
    ReadFile {
        /// File path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// An entry name is not valid UTF-8.
    #[error("entry name is not valid UTF-8: '{}'", path.display())]
    InvalidName {
        /// Entry path.
        path: PathBuf,
    },
}

impl IndexError {
    pub(crate) fn root_metadata(path: PathBuf, source: io::Error) -> Self {
        Self::RootMetadata { path, source }
    }

    pub(crate) fn read_dir(path: PathBuf, source: io::Error) -> Self {
        Self::ReadDir { path, source }
    }

    pub(crate) fn read_dir_entry(path: PathBuf, source: io::Error) -> Self {
        Self::ReadDirEntry { path, source }
    }

    pub(crate) fn metadata(path: PathBuf, source: io::Error) -> Self {
        Self::Metadata { path, source }
    }

    pub(crate) fn read_file(path: PathBuf, source: io::Error) -> Self {
        Self::ReadFile { path, source }
    }

    /// Returns the filesystem path associated with the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use index::IndexBuilder;
    ///
    /// let error = IndexBuilder::new("./definitely_missing_root").build().unwrap_err();
    /// assert!(error.path().ends_with("definitely_missing_root"));
    /// ```
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::RootMetadata { path, .. }
            | Self::UnsupportedRoot { path }
            | Self::ReadDir { path, .. }
            | Self::ReadDirEntry { path, .. }
            | Self::Metadata { path, .. }
            | Self::ReadFile { path, .. }
            | Self::InvalidName { path } => path,
        }
    }

    /// Returns the underlying I/O error, if the failure came from the filesystem.
    #[must_use]
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::RootMetadata { source, .. }
            | Self::ReadDir { source, .. }
            | Self::ReadDirEntry { source, .. }
            | Self::Metadata { source, .. }
            | Self::ReadFile { source, .. } => Some(source),
            Self::UnsupportedRoot { .. } | Self::InvalidName { .. } => None,
        }
    }
}
