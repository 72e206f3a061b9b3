#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `index` turns a directory or a single file into an immutable,
//! content-addressed tree of [`Dir`], [`File`], and [`Block`] nodes, and
//! derives a [`BlockIndex`] that maps strong checksums back to nodes.
//!
//! # Design
//!
//! - Nodes live in an arena ([`IndexTree`]) and are addressed by [`NodeId`].
//!   [`NodeRef`] pairs an id with its tree and exposes the shared node
//!   capability: strong checksum, children, and parent.
//! - [`TreeBuilder`] assembles trees bottom-up. Parent links are written when
//!   the owner is pushed, after its children exist.
//! - [`IndexBuilder`] walks the filesystem. Files are cut into
//!   [`BLOCK_SIZE`] blocks carrying a weak rolling checksum and a strong
//!   checksum; the file's own strong checksum covers the whole stream. A
//!   directory's checksum is computed by [`dir_strong`] after all of its
//!   children are indexed.
//!
//! # Invariants
//!
//! - Directory children are stored sub-directories first, then files, each
//!   ordered by name. Directory checksums do not depend on the order the
//!   filesystem lists entries.
//! - Every block covers `[position * BLOCK_SIZE, min(size, (position + 1) *
//!   BLOCK_SIZE))` of its file.
//!
//! # Examples
//!
//! ```
//! use index::{BlockIndex, IndexBuilder};
//! use std::sync::Arc;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! std::fs::write(temp.path().join("a.txt"), vec![7u8; 10_000])?;
//!
//! let tree = Arc::new(IndexBuilder::new(temp.path()).build()?);
//! let file = tree.find(std::path::Path::new("a.txt")).expect("indexed");
//! assert_eq!(file.blocks().count(), 2);
//!
//! let index = BlockIndex::new(Arc::clone(&tree));
//! assert!(index.strong_file(&file.strong()).is_some());
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod block_index;
mod builder;
mod error;
mod merkle;
mod node;
mod tree;

pub use block_index::BlockIndex;
pub use builder::IndexBuilder;
pub use error::IndexError;
pub use merkle::dir_strong;
pub use node::{BLOCK_SIZE, Block, Dir, File, MAX_BLOCK_POSITION, Node, NodeId, NodeKind};
pub use tree::{IndexTree, NodeRef, PreOrder, TreeBuilder};
