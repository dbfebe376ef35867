//! Answer-to-reset and transmission protocol of a contact card

use core::fmt;

use bytes::Bytes;
use derive_more::{Deref, Display};

use crate::error::AtrError;

/// Longest answer-to-reset allowed by ISO/IEC 7816-3
pub const MAX_ATR_LEN: usize = 33;

/// Transmission protocol negotiated with a contact card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Protocol {
    /// Character oriented T=0
    #[display("T=0")]
    T0,
    /// Block oriented T=1
    #[display("T=1")]
    T1,
}

impl Protocol {
    /// Protocol number as found in the ATR interface bytes
    pub const fn number(&self) -> u8 {
        match self {
            Self::T0 => 0,
            Self::T1 => 1,
        }
    }
}

impl TryFrom<u8> for Protocol {
    type Error = AtrError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::T0),
            1 => Ok(Self::T1),
            other => Err(AtrError::UnsupportedProtocol(other)),
        }
    }
}

/// Bit convention announced by the TS byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Convention {
    /// TS = `3B`
    #[display("direct")]
    Direct,
    /// TS = `3F`
    #[display("inverse")]
    Inverse,
}

/// Answer-to-reset returned by a contact card
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct Atr(Bytes);

impl Atr {
    /// Decode an ATR, checking its length and TS byte
    pub fn new(raw: impl Into<Bytes>) -> Result<Self, AtrError> {
        let raw = raw.into();
        let Some(&ts) = raw.first() else {
            return Err(AtrError::Empty);
        };
        if raw.len() > MAX_ATR_LEN {
            return Err(AtrError::TooLong(raw.len()));
        }
        if !matches!(ts, 0x3B | 0x3F) {
            return Err(AtrError::InvalidConvention(ts));
        }
        Ok(Self(raw))
    }

    /// Bit convention of the card
    pub fn convention(&self) -> Convention {
        if self.0.first() == Some(&0x3F) {
            Convention::Inverse
        } else {
            Convention::Direct
        }
    }

    /// Number of historical bytes announced by T0
    pub fn historical_len(&self) -> usize {
        self.0.get(1).map_or(0, |t0| usize::from(t0 & 0x0F))
    }

    /// Raw ATR bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Atr {
    type Error = AtrError;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        Self::new(Bytes::copy_from_slice(raw))
    }
}

impl fmt::Display for Atr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(&self.0))
    }
}
