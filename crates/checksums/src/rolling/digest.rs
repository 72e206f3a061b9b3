/// Frozen [`RollingChecksum`](super::RollingChecksum) state.
///
/// Resuming from a digest with `RollingChecksum::from` continues rolling
/// where the original left off.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct RollingDigest {
    a: u16,
    b: u16,
    len: usize,
}

impl RollingDigest {
    /// Assembles a digest from its accumulators and window length.
    #[must_use]
    pub const fn new(a: u16, b: u16, len: usize) -> Self {
        Self { a, b, len }
    }

    /// Byte sum of the window.
    #[must_use]
    pub const fn a(&self) -> u16 {
        self.a
    }

    /// Position-weighted sum of the window.
    #[must_use]
    pub const fn b(&self) -> u16 {
        self.b
    }

    /// Window length.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for an empty window.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed checksum `(b << 16) | a`.
    #[must_use]
    pub const fn value(&self) -> u32 {
        ((self.b as u32) << 16) | (self.a as u32)
    }
}
