//! Length limits of the APDU framing layer
//!
//! These values must match the ones used by the card side; changing any of
//! them changes which encoding (short or extended) is emitted on the wire.

/// Length of the CLA, INS, P1, P2 header
pub const HEADER_LEN: usize = 4;

/// Largest Lc that still uses the one-byte (short) encoding
pub const SHORT_LC_MAX: usize = 255;

/// Largest Le that still uses the one-byte (short) encoding
///
/// A short Le of 256 is written as `0x00`.
pub const SHORT_LE_MAX: u32 = 256;

/// Maximum length of a command or response data buffer
pub const MAX_BUFFER_LEN: usize = 300;

/// Width of an extended length field carrying its `0x00` marker
pub const EXTENDED_FIELD_LEN: usize = 3;

/// Largest framed command: header, data and two extended length fields
pub const MAX_FRAMED_LEN: usize = HEADER_LEN + MAX_BUFFER_LEN + 2 * EXTENDED_FIELD_LEN;

/// Absolute upper bound for Le (an extended Le of `0x0000` means 65536)
pub const LE_ABSOLUTE_MAX: u32 = 1 << 16;
