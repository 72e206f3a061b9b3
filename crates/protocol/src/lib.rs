#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `protocol` is the versioned binary form of index nodes. Each node kind has
//! its own encoder and decoder; a blob always starts with
//! [`NODE_FORMAT_VERSION`] and decoders refuse any other version before
//! reading a single field.
//!
//! # Wire layout
//!
//! | Kind | Fields after the version tag |
//! |------|------------------------------|
//! | Block | position (varlong), weak (u32 LE), strong |
//! | File | name, mode (u32 LE), strong, size (varlong), block count, blocks |
//! | Dir | name, mode (u32 LE), strong, dir count, dirs, file count, files |
//!
//! Names and strong sums are varint-length-prefixed byte strings. Child nodes
//! are varint-length-prefixed blobs carrying their own version tag. Parent
//! links are never written; decoding rebuilds them as each owner is pushed
//! into the [`index::TreeBuilder`].
//!
//! # Examples
//!
//! ```
//! use protocol::{decode_tree, encode_tree};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! std::fs::write(temp.path().join("notes.txt"), b"hello")?;
//! let tree = index::IndexBuilder::new(temp.path()).build()?;
//!
//! let envelope = encode_tree(&tree)?;
//! let decoded = decode_tree(&envelope)?;
//! assert_eq!(decoded.root().strong(), tree.root().strong());
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod envelope;
mod error;
mod varint;
mod version;
mod wire;

pub use envelope::{DIR_TAG, FILE_TAG, decode_tree, encode_tree, read_tree, write_tree};
pub use error::CodecError;
pub use varint::{
    VARLONG_MIN_BYTES, decode_varint, decode_varlong, encode_varint_to_vec, encode_varlong_to_vec,
    read_varint, read_varlong, write_varint, write_varlong,
};
pub use version::NODE_FORMAT_VERSION;
pub use wire::{
    MAX_DIR_DEPTH, decode_block, decode_dir, decode_dir_into, decode_file, decode_file_into,
    encode_block, encode_dir, encode_file,
};
