//! Block blobs: `version | position | weak | strong`.

use index::{Block, MAX_BLOCK_POSITION};

use super::{FieldReader, FieldWriter};
use crate::error::CodecError;

/// Encodes a block.
///
/// ```
/// use checksums::strong::Sha1;
/// use index::Block;
/// use protocol::{decode_block, encode_block};
///
/// let block = Block::new(2, 0xdead_beef, Sha1::digest(b"payload"));
/// let blob = encode_block(&block).unwrap();
/// assert_eq!(decode_block(&blob).unwrap(), block);
/// ```
pub fn encode_block(block: &Block) -> Result<Vec<u8>, CodecError> {
    let mut writer = FieldWriter::versioned();
    writer.u64(block.position())?;
    writer.u32(block.weak());
    writer.strong(&block.strong())?;
    Ok(writer.finish())
}

/// Decodes a block blob.
///
/// Positions whose byte offset would not fit in a `u64` are rejected with
/// [`CodecError::LengthOverflow`].
pub fn decode_block(bytes: &[u8]) -> Result<Block, CodecError> {
    let mut reader = FieldReader::versioned(bytes)?;
    let position = reader.u64()?;
    if position > MAX_BLOCK_POSITION {
        return Err(CodecError::LengthOverflow {
            len: i64::try_from(position).unwrap_or(i64::MAX),
        });
    }
    let weak = reader.u32()?;
    let strong = reader.strong()?;
    reader.finish()?;
    Ok(Block::new(position, weak, strong))
}
