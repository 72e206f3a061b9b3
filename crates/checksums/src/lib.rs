#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the two checksum families used to index file content
//! into fixed-size blocks:
//!
//! - [`RollingChecksum`] is the cheap, collision-prone weak checksum. It can be
//!   slid across a buffer one byte at a time in O(1), which lets a matcher scan
//!   for candidate block alignments.
//! - [`strong::Sha1`] produces the cryptographic [`StrongSum`] used as the
//!   canonical content identifier. A weak match is never trusted until the
//!   strong sums agree.
//!
//! # Examples
//!
//! ```
//! use checksums::{RollingChecksum, StrongSum};
//! use checksums::strong::Sha1;
//!
//! let mut weak = RollingChecksum::new();
//! weak.update(b"block contents");
//!
//! let strong: StrongSum = Sha1::digest(b"block contents");
//! assert_eq!(strong.to_string().len(), 40);
//! assert_ne!(weak.value(), 0);
//! ```

mod rolling;
pub mod strong;

pub use rolling::{RollingChecksum, RollingDigest, RollingError};
pub use strong::{STRONG_LEN, StrongSum, StrongSumParseError};
