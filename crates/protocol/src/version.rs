//! crates/protocol/src/version.rs
//! Node format version guard.

use crate::error::CodecError;

/// Version tag leading every encoded node. Bumped whenever a field layout
/// changes; decoders accept this exact value only.
pub const NODE_FORMAT_VERSION: i32 = 1;

pub(crate) fn check_version(found: i32) -> Result<(), CodecError> {
    if found == NODE_FORMAT_VERSION {
        return Ok(());
    }
    logging::trace_codec!(
        debug,
        expected = NODE_FORMAT_VERSION,
        found,
        "rejecting node blob with foreign format version"
    );
    Err(CodecError::VersionMismatch {
        expected: NODE_FORMAT_VERSION,
        found,
    })
}
