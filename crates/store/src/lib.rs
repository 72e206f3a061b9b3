#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `store` resolves strong checksums to bytes on disk. A store indexes a
//! local root once, exposes the resulting tree and [`index::BlockIndex`], and
//! serves block and file-range reads by opening the file that currently holds
//! the content.
//!
//! # Design
//!
//! - [`BlockStore`] is the read surface: `root`, `index`, `read_block`, and
//!   `read_into`. [`LocalStore`] adds path handling and relocation.
//! - [`DirStore`] is rooted at a directory and [`FileStore`] at a single
//!   file; [`open`] and [`StoreBuilder`] pick one by inspecting the root.
//! - [`Relocations`] maps relative paths to staged copies under the base
//!   directory. A driver moves an old version aside with
//!   [`LocalStore::relocate`], writes the new version in place, and keeps
//!   reading unchanged blocks from the old copy through the same store.
//!
//! # Invariants
//!
//! - Relocation never changes a node's checksum, only where its bytes live.
//! - Relocation targets are unique: names are claimed with an exclusive
//!   create under the relocation lock before the rename.
//! - Entries starting with [`RELOC_PREFIX`] directly under a directory root
//!   are never indexed.
//!
//! # Examples
//!
//! ```
//! use store::{BlockStore, LocalStore};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let path = temp.path().join("data.bin");
//! std::fs::write(&path, vec![3u8; 10_000])?;
//!
//! let store = store::open(temp.path())?;
//! let file = store.tree().files().next().expect("indexed");
//! let strong = file.strong();
//! let first = file.blocks().next().expect("block").strong();
//!
//! store.relocate(&path)?;
//! std::fs::write(&path, b"replacement")?;
//!
//! assert_eq!(store.read_block(&first)?.len(), 8192);
//! let mut tail = Vec::new();
//! store.read_into(&strong, 9_000, 1_000, &mut tail)?;
//! assert_eq!(tail, vec![3u8; 1_000]);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod builder;
mod error;
mod local;
mod relocation;
mod traits;

pub use builder::{StoreBuilder, open};
pub use error::{StoreError, StoreResult};
pub use local::{DirStore, FileStore};
pub use relocation::{RELOC_PREFIX, Relocations};
pub use traits::{BlockStore, LocalStore};
