//! APDU command definitions
//!
//! This module provides the logical APDU command according to ISO/IEC 7816-4.
//! Its serialized form is produced by the [`frame`](crate::frame) module.

pub mod error;

use core::fmt;

use bytes::Bytes;

pub use error::CommandError;

use crate::constants::{HEADER_LEN, LE_ABSOLUTE_MAX, MAX_BUFFER_LEN, SHORT_LC_MAX, SHORT_LE_MAX};
use crate::frame::{self, FrameError, FrameLayout, Fragments};

/// Encoding requested for the Le field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeEncoding {
    /// No Le field is sent
    #[default]
    Absent,
    /// One-byte Le, falling back to the extended form above [`SHORT_LE_MAX`]
    Short,
    /// Extended Le whatever its value
    Extended,
}

impl LeEncoding {
    /// Whether an Le field is sent at all
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Generic APDU command
///
/// Lc is not stored: it is always the length of `data`. Lengths are checked
/// when the command is framed, see [`ApduCommand::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduCommand {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data
    pub data: Bytes,
    /// How Le is encoded
    pub le_encoding: LeEncoding,
    /// Expected response length, meaningful unless `le_encoding` is [`LeEncoding::Absent`]
    pub le: u32,
}

impl ApduCommand {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Bytes::new(),
            le_encoding: LeEncoding::Absent,
            le: 0,
        }
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = data.into();
        self
    }

    /// Request `le` response bytes, encoded short when it fits
    pub const fn with_le(mut self, le: u32) -> Self {
        self.le_encoding = LeEncoding::Short;
        self.le = le;
        self
    }

    /// Request `le` response bytes with an extended Le field
    pub const fn with_extended_le(mut self, le: u32) -> Self {
        self.le_encoding = LeEncoding::Extended;
        self.le = le;
        self
    }

    /// Drop the Le field
    pub const fn without_le(mut self) -> Self {
        self.le_encoding = LeEncoding::Absent;
        self.le = 0;
        self
    }

    /// The CLA, INS, P1, P2 header
    pub const fn header(&self) -> [u8; HEADER_LEN] {
        [self.cla, self.ins, self.p1, self.p2]
    }

    /// Length of the command data (Lc)
    pub fn lc(&self) -> usize {
        self.data.len()
    }

    /// Layout of the framed command
    pub fn layout(&self) -> FrameLayout {
        FrameLayout::of(self)
    }

    /// Total length of the framed command
    pub fn encoded_len(&self) -> usize {
        self.layout().total_len()
    }

    /// Whether the framed command uses an extended length field
    pub fn is_extended(&self) -> bool {
        let layout = self.layout();
        layout.lc_width() > 1 || layout.le_width() > 1
    }

    /// Check Lc and Le against the framing limits
    pub fn validate(&self) -> Result<(), FrameError> {
        frame::check_lengths(self)
    }

    /// Serialize the whole command
    pub fn to_bytes(&self) -> Result<Bytes, FrameError> {
        frame::encode(self)
    }

    /// Iterate over the framed command in chunks of `block_size` bytes
    pub const fn fragments(&self, block_size: usize) -> Fragments<'_> {
        Fragments::new(self, block_size)
    }

    /// Parse a command from its framed bytes
    ///
    /// A short Le of `0x00` reads as 256 and an extended Le of `0x0000` as 65536.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, CommandError> {
        let invalid = || CommandError::InvalidLength(raw.len());

        let (header, body) = raw.split_first_chunk::<HEADER_LEN>().ok_or_else(invalid)?;
        let [cla, ins, p1, p2] = *header;
        let mut command = Self::new(cla, ins, p1, p2);

        let (data, le_field) = match body {
            [] => return Ok(command),
            [le] => {
                command = command.with_le(short_le(*le));
                return Ok(command);
            }
            [0x00, hi, lo, tail @ ..] => {
                let len = u16::from_be_bytes([*hi, *lo]);
                if tail.is_empty() {
                    command = command.with_extended_le(extended_le(len));
                    return Ok(command);
                }
                if len == 0 {
                    return Err(CommandError::ZeroExtendedLc);
                }
                split_data(tail, usize::from(len)).ok_or_else(invalid)?
            }
            [0x00, ..] => return Err(invalid()),
            [lc, tail @ ..] => split_data(tail, usize::from(*lc)).ok_or_else(invalid)?,
        };

        if data.len() > MAX_BUFFER_LEN {
            return Err(CommandError::data_too_long(data.len(), MAX_BUFFER_LEN));
        }
        command.data = Bytes::copy_from_slice(data);

        match le_field {
            [] => {}
            // a one-byte Le also follows an extended Lc for short requests
            [le] => command = command.with_le(short_le(*le)),
            [hi, lo] => command = command.with_extended_le(extended_le(u16::from_be_bytes([*hi, *lo]))),
            _ => return Err(invalid()),
        }

        Ok(command)
    }
}

fn split_data(tail: &[u8], len: usize) -> Option<(&[u8], &[u8])> {
    (tail.len() >= len).then(|| tail.split_at(len))
}

const fn short_le(byte: u8) -> u32 {
    if byte == 0 { SHORT_LE_MAX } else { byte as u32 }
}

const fn extended_le(value: u16) -> u32 {
    if value == 0 { LE_ABSOLUTE_MAX } else { value as u32 }
}

impl fmt::Display for ApduCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lc() > MAX_BUFFER_LEN {
            return write!(f, "APDU error: Lc {} overflows the data buffer", self.lc());
        }

        writeln!(f, "===== APDU ============")?;
        write!(
            f,
            "CLA = {:02X}, INS = {:02X}, P1 = {:02X}, P2 = {:02X}",
            self.cla, self.ins, self.p1, self.p2
        )?;

        match self.lc() {
            0 => write!(f, ", No Lc")?,
            lc => {
                write!(f, ", Lc = {lc:#x}")?;
                if lc > SHORT_LC_MAX {
                    write!(f, " (extended)")?;
                }
            }
        }

        match self.le_encoding {
            LeEncoding::Absent => write!(f, ", No Le")?,
            encoding => {
                write!(f, ", Le = {:#x}", self.le)?;
                if self.le > SHORT_LE_MAX || encoding == LeEncoding::Extended {
                    write!(f, " (extended)")?;
                }
            }
        }

        if !self.data.is_empty() {
            write!(f, "\n{}", hex::encode_upper(&self.data))?;
        }
        Ok(())
    }
}
