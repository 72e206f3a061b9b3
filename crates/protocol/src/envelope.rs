//! crates/protocol/src/envelope.rs
//! Whole-tree envelopes for caching an index or sending it to a peer.
//!
//! An envelope is a one-byte kind tag (`D` or `F`) followed by the root blob.
//! Streams prefix the envelope with its length as a varlong.

use std::io::{self, Read, Write};

use index::{IndexTree, NodeKind};

use crate::error::CodecError;
use crate::varint::{VARLONG_MIN_BYTES, read_varlong, write_varlong};
use crate::wire::{decode_dir, decode_file, encode_dir, encode_file};

/// Envelope tag for a directory root.
pub const DIR_TAG: u8 = b'D';
/// Envelope tag for a single-file root.
pub const FILE_TAG: u8 = b'F';

/// Encodes `tree` as a tagged envelope.
pub fn encode_tree(tree: &IndexTree) -> Result<Vec<u8>, CodecError> {
    let root = tree.root();
    let (tag, blob) = match root.kind() {
        NodeKind::Dir => (DIR_TAG, encode_dir(root)?),
        NodeKind::File => (FILE_TAG, encode_file(root)?),
        NodeKind::Block => {
            return Err(CodecError::WrongNodeKind {
                expected: NodeKind::Dir,
                found: NodeKind::Block,
            });
        }
    };

    let mut out = Vec::with_capacity(blob.len() + 1);
    out.push(tag);
    out.extend_from_slice(&blob);
    logging::trace_codec!(debug, bytes = out.len(), kind = %root.kind(), "encoded tree");
    Ok(out)
}

/// Decodes an envelope produced by [`encode_tree`].
pub fn decode_tree(bytes: &[u8]) -> Result<IndexTree, CodecError> {
    let (&tag, blob) = bytes
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "empty tree envelope"))?;
    match tag {
        DIR_TAG => decode_dir(blob),
        FILE_TAG => decode_file(blob),
        tag => Err(CodecError::InvalidKind { tag }),
    }
}

/// Writes a length-prefixed envelope for `tree` to `writer`.
pub fn write_tree<W: Write + ?Sized>(writer: &mut W, tree: &IndexTree) -> Result<(), CodecError> {
    let envelope = encode_tree(tree)?;
    let len = i64::try_from(envelope.len())
        .map_err(|_| CodecError::LengthOverflow { len: i64::MAX })?;
    write_varlong(writer, len, VARLONG_MIN_BYTES)?;
    writer.write_all(&envelope)?;
    Ok(())
}

/// Reads one length-prefixed envelope from `reader`.
pub fn read_tree<R: Read + ?Sized>(reader: &mut R) -> Result<IndexTree, CodecError> {
    let len = read_varlong(reader, VARLONG_MIN_BYTES)?;
    let len = u64::try_from(len).map_err(|_| CodecError::LengthOverflow { len })?;

    let mut envelope = Vec::new();
    reader.take(len).read_to_end(&mut envelope)?;
    if (envelope.len() as u64) < len {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated tree envelope").into());
    }
    decode_tree(&envelope)
}
