//! crates/index/src/merkle.rs
//! Directory hashing over child checksums.

use std::io::Write;

use checksums::StrongSum;
use checksums::strong::Sha1;

use crate::node::NodeKind;

/// Computes a directory's strong checksum from its children.
///
/// Each child contributes the line `"{name}\t{tag}\t{strong}\n"` where `tag` is
/// `d` or `f` and `strong` is lower-case hex. Lines are hashed in byte order of
/// the names, so the result does not depend on discovery order.
#[must_use]
pub fn dir_strong<'a, I>(children: I) -> StrongSum
where
    I: IntoIterator<Item = (&'a str, NodeKind, StrongSum)>,
{
    let mut entries: Vec<_> = children.into_iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut hasher = Sha1::new();
    for (name, kind, strong) in entries {
        // Writing into a hasher cannot fail.
        let _ = writeln!(hasher, "{name}\t{}\t{strong}", kind.tag());
    }
    hasher.finalize()
}
