//! Directory blobs: `version | name | mode | strong | n | n × dir blob | m | m × file blob`.

use index::{Dir, IndexTree, NodeId, NodeKind, NodeRef, TreeBuilder};

use super::file::{decode_file_into, encode_file};
use super::{FieldReader, FieldWriter};
use crate::error::CodecError;

/// Deepest directory nesting accepted by [`decode_dir_into`].
pub const MAX_DIR_DEPTH: usize = 1024;

/// Encodes a directory node and everything below it.
pub fn encode_dir(node: NodeRef<'_>) -> Result<Vec<u8>, CodecError> {
    let dir = node.as_dir().ok_or(CodecError::WrongNodeKind {
        expected: NodeKind::Dir,
        found: node.kind(),
    })?;

    let mut writer = FieldWriter::versioned();
    writer.name(dir.name())?;
    writer.u32(dir.mode());
    writer.strong(&dir.strong())?;

    writer.count(node.dirs().count())?;
    for sub in node.dirs() {
        writer.bytes(&encode_dir(sub)?)?;
    }
    writer.count(node.files().count())?;
    for file in node.files() {
        writer.bytes(&encode_file(file)?)?;
    }
    Ok(writer.finish())
}

/// Decodes a directory blob into `builder`, returning the new directory's id.
///
/// Sub-directories and files are decoded before the directory itself is
/// pushed, which links them to it. On error the builder is restored to its
/// prior length.
pub fn decode_dir_into(builder: &mut TreeBuilder, bytes: &[u8]) -> Result<NodeId, CodecError> {
    let checkpoint = builder.len();
    decode_dir_fields(builder, bytes, 0).inspect_err(|_| builder.truncate(checkpoint))
}

/// Decodes a directory blob into a standalone tree rooted at that directory.
pub fn decode_dir(bytes: &[u8]) -> Result<IndexTree, CodecError> {
    let mut builder = TreeBuilder::new();
    let root = decode_dir_into(&mut builder, bytes)?;
    Ok(builder.finish(root))
}

fn decode_dir_fields(
    builder: &mut TreeBuilder,
    bytes: &[u8],
    depth: usize,
) -> Result<NodeId, CodecError> {
    if depth >= MAX_DIR_DEPTH {
        return Err(CodecError::NestingTooDeep {
            limit: MAX_DIR_DEPTH,
        });
    }

    let mut reader = FieldReader::versioned(bytes)?;
    let name = reader.name()?;
    let mode = reader.u32()?;
    let strong = reader.strong()?;

    let dir_count = reader.count()?;
    let mut dirs = Vec::new();
    for _ in 0..dir_count {
        dirs.push(decode_dir_fields(builder, reader.bytes()?, depth + 1)?);
    }

    let file_count = reader.count()?;
    let mut files = Vec::new();
    for _ in 0..file_count {
        files.push(decode_file_into(builder, reader.bytes()?)?);
    }
    reader.finish()?;

    logging::trace_codec!(
        trace,
        name,
        dirs = dirs.len(),
        files = files.len(),
        "decoded directory"
    );
    Ok(builder.push_dir(Dir::new(name, mode, strong), dirs, files))
}
