//! Error types specific to APDU commands

/// Error raised while building or parsing an APDU command
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Raw command shorter than its header or inconsistent with its length fields
    #[error("Invalid command length: {0}")]
    InvalidLength(usize),

    /// Extended Lc field announcing zero data bytes
    #[error("Extended Lc of zero is not allowed")]
    ZeroExtendedLc,

    /// Data longer than the maximum buffer length
    #[error("Data too long: {0} bytes (max {1})")]
    DataTooLong(usize, usize),
}

impl CommandError {
    /// Create a data too long error
    pub const fn data_too_long(actual: usize, max: usize) -> Self {
        Self::DataTooLong(actual, max)
    }
}
