use thiserror::Error;

/// Failure to slide a [`RollingChecksum`](super::RollingChecksum) window.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RollingError {
    /// Nothing has been added to the window yet.
    #[error("cannot roll an empty window")]
    EmptyWindow,
    /// The window is longer than the 32-bit weight used by `roll`.
    #[error("window of {len} bytes is too large to roll")]
    WindowTooLarge {
        /// Window length at the time of the roll.
        len: usize,
    },
}
