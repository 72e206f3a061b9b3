//! File blobs: `version | name | mode | strong | size | n | n × block blob`.

use index::{File, IndexTree, NodeId, NodeKind, NodeRef, TreeBuilder};

use super::block::{decode_block, encode_block};
use super::{FieldReader, FieldWriter};
use crate::error::CodecError;

/// Encodes a file node together with its blocks.
pub fn encode_file(node: NodeRef<'_>) -> Result<Vec<u8>, CodecError> {
    let file = node.as_file().ok_or(CodecError::WrongNodeKind {
        expected: NodeKind::File,
        found: node.kind(),
    })?;

    let mut writer = FieldWriter::versioned();
    writer.name(file.name())?;
    writer.u32(file.mode());
    writer.strong(&file.strong())?;
    writer.u64(file.size())?;

    writer.count(node.blocks().count())?;
    for block in node.blocks() {
        if let Some(block) = block.as_block() {
            writer.bytes(&encode_block(block)?)?;
        }
    }
    Ok(writer.finish())
}

/// Decodes a file blob into `builder`, returning the new file's id.
///
/// Blocks are decoded first and linked to the file once it is pushed. On
/// error the builder is restored to its prior length, so nothing from a
/// rejected blob remains.
pub fn decode_file_into(builder: &mut TreeBuilder, bytes: &[u8]) -> Result<NodeId, CodecError> {
    let checkpoint = builder.len();
    decode_file_fields(builder, bytes).inspect_err(|_| builder.truncate(checkpoint))
}

/// Decodes a file blob into a standalone tree rooted at that file.
pub fn decode_file(bytes: &[u8]) -> Result<IndexTree, CodecError> {
    let mut builder = TreeBuilder::new();
    let root = decode_file_into(&mut builder, bytes)?;
    Ok(builder.finish(root))
}

fn decode_file_fields(builder: &mut TreeBuilder, bytes: &[u8]) -> Result<NodeId, CodecError> {
    let mut reader = FieldReader::versioned(bytes)?;
    let name = reader.name()?;
    let mode = reader.u32()?;
    let strong = reader.strong()?;
    let size = reader.u64()?;

    let count = reader.count()?;
    let mut blocks = Vec::new();
    for expected in 0..count as u64 {
        let block = decode_block(reader.bytes()?)?;
        if block.position() != expected {
            return Err(CodecError::BlockPosition {
                expected,
                found: block.position(),
            });
        }
        blocks.push(builder.push_block(block));
    }
    reader.finish()?;

    Ok(builder.push_file(File::new(name, mode, strong, size), blocks))
}
