//! Error types for card operations

use scard_apdu_core::{FrameError, ResponseError};

use crate::card::CardKind;

/// Result type for card operations
pub type Result<T, E = CardError> = core::result::Result<T, E>;

/// Error while decoding an answer-to-reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AtrError {
    /// No byte at all
    #[error("Empty ATR")]
    Empty,

    /// More bytes than an ATR can carry
    #[error("ATR too long: {0} bytes")]
    TooLong(usize),

    /// TS byte is neither `3B` nor `3F`
    #[error("Invalid TS byte {0:#04X}")]
    InvalidConvention(u8),

    /// Protocol number other than T=0 or T=1
    #[error("Unsupported protocol T={0}")]
    UnsupportedProtocol(u8),
}

/// Error reported by a contact transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Card did not answer in time
    #[error("Operation timed out")]
    Timeout,

    /// No card in the slot
    #[error("No card present")]
    NoCard,

    /// ATR, PTS or baud rate negotiation failed
    #[error("Negotiation failed: {0}")]
    Negotiation(&'static str),

    /// Card interface could not be mapped or unmapped
    #[error("Failed to map the card interface")]
    Mapping,

    /// Link layer failure while exchanging bytes
    #[error("Failed to transmit data")]
    Transmission,

    /// Answer-to-reset could not be decoded
    #[error(transparent)]
    Atr(#[from] AtrError),

    /// Command could not be framed for the link
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Card answer could not be parsed
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

/// Error returned by [`Card`](crate::Card) and [`Fsm`](crate::Fsm) operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    /// Operation requested on a card type without a transport
    #[error("Unsupported card type: {0}")]
    UnsupportedCardType(CardKind),

    /// Contact negotiation failed, the card was left untouched
    #[error("Contact negotiation failed: {0}")]
    Negotiation(#[source] TransportError),

    /// Transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Command rejected before reaching the transport
    #[error(transparent)]
    Apdu(#[from] scard_apdu_core::Error),
}

impl From<FrameError> for CardError {
    fn from(error: FrameError) -> Self {
        Self::Apdu(error.into())
    }
}

impl CardError {
    /// Whether the card type has no transport behind it
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedCardType(_))
    }
}
