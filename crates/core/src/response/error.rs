//! Error types specific to APDU responses

use super::status::StatusWord;

/// A response whose status word is not `90 00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Card returned {status}: {}", .status.description())]
pub struct StatusError {
    /// Status word returned by the card
    pub status: StatusWord,
}

impl StatusError {
    /// Create a new status error
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self {
            status: StatusWord::new(sw1, sw2),
        }
    }
}

/// Error raised while parsing an APDU response
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// Fewer than the two status bytes
    #[error("Incomplete response: {0} bytes")]
    Incomplete(usize),

    /// Response data longer than the maximum buffer length
    #[error("Response data too long: {0} bytes")]
    TooLong(usize),

    /// Card reported an error status
    #[error(transparent)]
    Status(#[from] StatusError),
}

impl ResponseError {
    /// Whether this error carries status word `sw`
    pub const fn has_status(&self, sw: u16) -> bool {
        match self {
            Self::Status(err) => err.status.to_u16() == sw,
            _ => false,
        }
    }
}
