use super::digest::RollingDigest;
use super::error::RollingError;

const MASK: u32 = 0xffff;

/// Weak checksum over a sliding window of bytes.
///
/// `a` is the byte sum of the window and `b` the sum of its prefix sums, both
/// kept to 16 bits. A block's weak checksum is [`value`](Self::value) after a
/// single [`update`](Self::update) over the block.
#[doc(alias = "rsum")]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RollingChecksum {
    a: u32,
    b: u32,
    window: usize,
}

impl RollingChecksum {
    /// Empty window.
    ///
    /// ```
    /// use checksums::RollingChecksum;
    ///
    /// let checksum = RollingChecksum::new();
    /// assert!(checksum.is_empty());
    /// assert_eq!(checksum.value(), 0);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            b: 0,
            window: 0,
        }
    }

    /// State of a `window`-byte window holding only zero bytes.
    ///
    /// Rolling `window` bytes into it with `roll(0, byte)` gives the same
    /// state as one [`update`](Self::update) over those bytes.
    ///
    /// ```
    /// use checksums::RollingChecksum;
    ///
    /// let data = b"abcd";
    /// let mut rolled = RollingChecksum::zeroed(data.len());
    /// for &byte in data {
    ///     rolled.roll(0, byte).unwrap();
    /// }
    ///
    /// let mut direct = RollingChecksum::new();
    /// direct.update(data);
    /// assert_eq!(rolled, direct);
    /// ```
    #[must_use]
    pub const fn zeroed(window: usize) -> Self {
        Self {
            a: 0,
            b: 0,
            window,
        }
    }

    /// Number of bytes in the window.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.window
    }

    /// Returns `true` before any byte has been added.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.window == 0
    }

    /// Extends the window with `bytes`.
    ///
    /// Splitting the input across calls does not change the result.
    ///
    /// ```
    /// use checksums::RollingChecksum;
    ///
    /// let mut split = RollingChecksum::new();
    /// split.update(b"Hello, ");
    /// split.update(b"blocks!");
    ///
    /// let mut full = RollingChecksum::new();
    /// full.update(b"Hello, blocks!");
    /// assert_eq!(split.value(), full.value());
    /// ```
    pub fn update(&mut self, bytes: &[u8]) {
        let (mut a, mut b) = (self.a, self.b);
        for &byte in bytes {
            a = a.wrapping_add(u32::from(byte));
            b = b.wrapping_add(a);
        }
        self.a = a & MASK;
        self.b = b & MASK;
        self.window = self.window.saturating_add(bytes.len());
    }

    /// Slides the window one byte: drops `outgoing` from the front and appends
    /// `incoming`. The window length is unchanged.
    ///
    /// ```
    /// use checksums::RollingChecksum;
    ///
    /// let data = b"ABCDE";
    /// let mut rolling = RollingChecksum::new();
    /// rolling.update(&data[0..3]);
    /// rolling.roll(data[0], data[3]).unwrap();
    ///
    /// let mut fresh = RollingChecksum::new();
    /// fresh.update(&data[1..4]);
    /// assert_eq!(rolling.value(), fresh.value());
    /// ```
    ///
    /// # Errors
    ///
    /// [`RollingError::EmptyWindow`] when there is nothing to slide, and
    /// [`RollingError::WindowTooLarge`] when the window length does not fit
    /// in 32 bits.
    #[inline]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) -> Result<(), RollingError> {
        if self.window == 0 {
            return Err(RollingError::EmptyWindow);
        }
        let window = u32::try_from(self.window)
            .map_err(|_| RollingError::WindowTooLarge { len: self.window })?;

        let outgoing = u32::from(outgoing);
        self.a = self.a.wrapping_sub(outgoing).wrapping_add(u32::from(incoming)) & MASK;
        self.b = self
            .b
            .wrapping_sub(window.wrapping_mul(outgoing))
            .wrapping_add(self.a)
            & MASK;
        Ok(())
    }

    /// Packed checksum `(b << 16) | a`.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Snapshot of the accumulators and window length.
    #[must_use]
    pub const fn digest(&self) -> RollingDigest {
        RollingDigest::new(self.a as u16, self.b as u16, self.window)
    }
}

impl From<RollingDigest> for RollingChecksum {
    fn from(digest: RollingDigest) -> Self {
        Self {
            a: u32::from(digest.a()),
            b: u32::from(digest.b()),
            window: digest.len(),
        }
    }
}
