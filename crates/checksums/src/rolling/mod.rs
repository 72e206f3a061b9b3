//! Weak checksum for locating candidate block alignments.
//!
//! Two 16-bit accumulators describe a window: `a` is the byte sum and `b`
//! weights each byte by its distance from the end of the window. Sliding the
//! window by one byte needs only the byte leaving and the byte entering:
//!
//! ```text
//! a = a - outgoing + incoming
//! b = b - len * outgoing + a
//! value = (b << 16) | a
//! ```

mod checksum;
mod digest;
mod error;

pub use checksum::RollingChecksum;
pub use digest::RollingDigest;
pub use error::RollingError;
