#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `blocksync` indexes a file or directory into fixed-size content-addressed
//! blocks so a synchronisation driver can tell which byte ranges of a
//! destination already match a source. This crate re-exports the workspace
//! members under one roof:
//!
//! | Module | Provides |
//! |---|---|
//! | [`checksums`] | rolling weak checksum and SHA-1 strong checksum |
//! | [`index`] | Block/File/Dir trees, [`IndexBuilder`], [`BlockIndex`] |
//! | [`store`] | [`DirStore`], [`FileStore`], relocation, block reads |
//! | [`protocol`] | versioned binary node codec |
//! | [`logging`] | tracing targets and subscriber setup |
//!
//! # Examples
//!
//! ```
//! use blocksync::{BlockStore, LocalStore, decode_tree, encode_tree};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! std::fs::write(temp.path().join("a.txt"), b"hello")?;
//!
//! let store = blocksync::open_store(temp.path())?;
//! let blob = encode_tree(store.tree())?;
//! let remote = decode_tree(&blob)?;
//! assert_eq!(&remote, store.tree());
//!
//! let file = remote.files().next().expect("indexed");
//! let mut bytes = Vec::new();
//! store.read_into(&file.strong(), 0, 5, &mut bytes)?;
//! assert_eq!(bytes, b"hello");
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

pub use checksums;
pub use index;
pub use logging;
pub use protocol;
pub use store;

pub use checksums::{RollingChecksum, StrongSum};
pub use index::{BLOCK_SIZE, BlockIndex, IndexBuilder, IndexError, IndexTree, NodeKind, NodeRef};
pub use logging::{VerbosityConfig, init_tracing};
pub use protocol::{
    CodecError, NODE_FORMAT_VERSION, decode_tree, encode_tree, read_tree, write_tree,
};
pub use store::{
    BlockStore, DirStore, FileStore, LocalStore, StoreBuilder, StoreError, open as open_store,
};
