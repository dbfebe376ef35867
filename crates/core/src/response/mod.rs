//! APDU response definitions
//!
//! A response is the data returned by the card followed by the two status
//! bytes SW1 SW2, according to ISO/IEC 7816-4.

pub mod error;
pub mod status;

use core::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

pub use error::{ResponseError, StatusError};
use status::StatusWord;

use crate::constants::MAX_BUFFER_LEN;

/// Response returned by a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduResponse {
    status: StatusWord,
    data: Bytes,
}

impl ApduResponse {
    /// Create a new response with data and status
    ///
    /// Fails with [`ResponseError::TooLong`] when the data does not fit the
    /// response buffer.
    pub fn new(
        data: impl Into<Bytes>,
        status: impl Into<StatusWord>,
    ) -> Result<Self, ResponseError> {
        let data = data.into();
        if data.len() > MAX_BUFFER_LEN {
            return Err(ResponseError::TooLong(data.len()));
        }
        Ok(Self {
            status: status.into(),
            data,
        })
    }

    /// Create a `90 00` response
    pub fn success(data: impl Into<Bytes>) -> Result<Self, ResponseError> {
        Self::new(data, StatusWord::SUCCESS)
    }

    /// Create a response carrying only a status word
    pub fn error(status: impl Into<StatusWord>) -> Self {
        Self {
            status: status.into(),
            data: Bytes::new(),
        }
    }

    /// Parse a response from raw bytes ending with SW1 SW2
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ResponseError> {
        let Some((data, &[sw1, sw2])) = raw.split_last_chunk::<2>() else {
            return Err(ResponseError::Incomplete(raw.len()));
        };

        let response = Self::new(Bytes::copy_from_slice(data), (sw1, sw2))?;
        trace!(
            sw = %response.status,
            le = response.le(),
            "Parsed APDU response"
        );
        Ok(response)
    }

    /// Response data
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Length of the response data
    pub fn le(&self) -> usize {
        self.data.len()
    }

    /// Whether the status word is `90 00`
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The data on success, the status word as an error otherwise
    pub fn into_result(self) -> Result<Bytes, StatusError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(StatusError {
                status: self.status,
            })
        }
    }
}

impl From<ApduResponse> for Bytes {
    fn from(response: ApduResponse) -> Self {
        let mut buf = BytesMut::with_capacity(response.data.len() + 2);
        buf.put_slice(&response.data);
        buf.put_u8(response.status.sw1);
        buf.put_u8(response.status.sw2);
        buf.freeze()
    }
}

impl fmt::Display for ApduResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== APDU response ===")?;
        write!(
            f,
            "SW1 = {:02X}, SW2 = {:02X}, Le = {:#x}",
            self.status.sw1,
            self.status.sw2,
            self.le()
        )?;
        if !self.data.is_empty() {
            write!(f, "\n{}", hex::encode_upper(&self.data))?;
        }
        Ok(())
    }
}
