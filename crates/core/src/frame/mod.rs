//! Framing of APDU commands
//!
//! A framed command is the concatenation of named fields:
//!
//! ```text
//! | CLA INS P1 P2 | [00] Lc | data | [00] Le |
//! ```
//!
//! Lc takes 0, 1 or 3 bytes and Le 0, 1, 2 or 3 bytes. When Lc is extended
//! its `00` marker also announces an extended Le, which then drops its own
//! marker and takes 2 bytes.
//!
//! [`FrameLayout::locate`] maps any offset of the frame back to its field, so
//! [`fragment`] can emit an arbitrary window of the frame without walking the
//! fields that precede it.

mod error;
mod fragment;

pub use error::FrameError;
pub use fragment::{Fragments, encode, fragment};

use crate::command::{ApduCommand, LeEncoding};
use crate::constants::{
    EXTENDED_FIELD_LEN, HEADER_LEN, LE_ABSOLUTE_MAX, MAX_BUFFER_LEN, SHORT_LC_MAX, SHORT_LE_MAX,
};

/// A field of the framed command, with the byte index inside that field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// CLA, INS, P1, P2
    Header(usize),
    /// `00` opening an extended Lc
    LcMarker,
    /// Lc length bytes, most significant first
    Lc(usize),
    /// Command data
    Data(usize),
    /// `00` opening an extended Le that follows no Lc
    LeMarker,
    /// Le length bytes, most significant first
    Le(usize),
}

/// Sizes of the fields of a framed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    lc: usize,
    lc_width: usize,
    le_width: usize,
}

impl FrameLayout {
    /// Compute the layout of `command`
    ///
    /// This never fails; lengths are checked by [`check_lengths`].
    pub fn of(command: &ApduCommand) -> Self {
        let lc = command.lc();
        let lc_width = lc_width(lc);
        Self {
            lc,
            lc_width,
            le_width: le_width(command.le_encoding, command.le, lc_width),
        }
    }

    /// Width of the Lc field: 0, 1 or 3
    pub const fn lc_width(&self) -> usize {
        self.lc_width
    }

    /// Width of the Le field: 0, 1, 2 or 3
    pub const fn le_width(&self) -> usize {
        self.le_width
    }

    /// Length of the command data
    pub const fn data_len(&self) -> usize {
        self.lc
    }

    /// Total length of the framed command
    pub const fn total_len(&self) -> usize {
        HEADER_LEN + self.lc_width + self.lc + self.le_width
    }

    /// Offset at which the Le field starts (the frame length when absent)
    pub const fn le_start(&self) -> usize {
        self.total_len() - self.le_width
    }

    /// Field holding the byte at `offset`, `None` past the end of the frame
    pub const fn locate(&self, offset: usize) -> Option<Field> {
        if offset >= self.total_len() {
            return None;
        }
        if offset < HEADER_LEN {
            return Some(Field::Header(offset));
        }

        // data always ends where Le starts
        let le_start = self.le_start();
        if offset >= le_start {
            let index = offset - le_start;
            return Some(match (self.le_width, index) {
                (EXTENDED_FIELD_LEN, 0) => Field::LeMarker,
                (EXTENDED_FIELD_LEN, index) => Field::Le(index - 1),
                (_, index) => Field::Le(index),
            });
        }

        let index = offset - HEADER_LEN;
        match (self.lc_width, index) {
            (1, 0) => Some(Field::Lc(0)),
            (1, index) => Some(Field::Data(index - 1)),
            (EXTENDED_FIELD_LEN, 0) => Some(Field::LcMarker),
            (EXTENDED_FIELD_LEN, 1 | 2) => Some(Field::Lc(index - 1)),
            (EXTENDED_FIELD_LEN, index) => Some(Field::Data(index - EXTENDED_FIELD_LEN)),
            _ => None,
        }
    }

    /// Byte of the framed `command` at `offset`
    ///
    /// `command` must be the command this layout was computed from.
    pub fn byte_at(&self, command: &ApduCommand, offset: usize) -> Result<u8, FrameError> {
        let mismatch = FrameError::LayoutMismatch { offset };
        let byte = match self.locate(offset).ok_or(mismatch)? {
            Field::Header(index) => command.header().get(index).copied(),
            Field::LcMarker | Field::LeMarker => Some(0x00),
            Field::Lc(index) => Some(length_byte(self.lc as u32, self.lc_width, index)),
            Field::Data(index) => command.data.get(index).copied(),
            Field::Le(index) => Some(length_byte(command.le, self.le_width, index)),
        };
        byte.ok_or(mismatch)
    }
}

/// Width of the Lc field for `lc` data bytes
pub const fn lc_width(lc: usize) -> usize {
    match lc {
        0 => 0,
        1..=SHORT_LC_MAX => 1,
        _ => EXTENDED_FIELD_LEN,
    }
}

/// Width of the Le field
///
/// An extended Le after an Lc field omits its marker byte.
pub const fn le_width(encoding: LeEncoding, le: u32, lc_width: usize) -> usize {
    let extended = if lc_width != 0 {
        EXTENDED_FIELD_LEN - 1
    } else {
        EXTENDED_FIELD_LEN
    };

    match encoding {
        LeEncoding::Absent => 0,
        LeEncoding::Short if le <= SHORT_LE_MAX => 1,
        LeEncoding::Short | LeEncoding::Extended => extended,
    }
}

/// Check Lc and Le of `command` against the framing limits
///
/// Le is checked even when no Le field is sent.
pub fn check_lengths(command: &ApduCommand) -> Result<(), FrameError> {
    if command.le > LE_ABSOLUTE_MAX {
        return Err(FrameError::LeOutOfRange(command.le));
    }
    if command.lc() > MAX_BUFFER_LEN {
        return Err(FrameError::LcTooLong {
            lc: command.lc(),
            max: MAX_BUFFER_LEN,
        });
    }
    if command.le > MAX_BUFFER_LEN as u32 {
        return Err(FrameError::LeTooLong {
            le: command.le,
            max: MAX_BUFFER_LEN,
        });
    }
    Ok(())
}

// One-byte fields carry the low byte, two-byte values are big endian.
const fn length_byte(value: u32, width: usize, index: usize) -> u8 {
    if width == 1 || index == 1 {
        value as u8
    } else {
        (value >> 8) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(lc: usize, encoding: LeEncoding, le: u32) -> ApduCommand {
        let mut cmd = ApduCommand::new(0x00, 0xA4, 0x04, 0x00).with_data(vec![0xA5; lc]);
        cmd.le_encoding = encoding;
        cmd.le = le;
        cmd
    }

    #[test]
    fn test_header_only() {
        for le in [0, 1, 256, 65536] {
            let layout = FrameLayout::of(&command(0, LeEncoding::Absent, le));
            assert_eq!(layout.total_len(), 4);
            assert_eq!(layout.lc_width(), 0);
            assert_eq!(layout.le_width(), 0);
        }
    }

    #[test]
    fn test_lc_width() {
        for lc in 1..=SHORT_LC_MAX {
            assert_eq!(FrameLayout::of(&command(lc, LeEncoding::Absent, 0)).lc_width(), 1);
        }
        for lc in SHORT_LC_MAX + 1..=MAX_BUFFER_LEN {
            let layout = FrameLayout::of(&command(lc, LeEncoding::Absent, 0));
            assert_eq!(layout.lc_width(), 3);
            assert_eq!(layout.total_len(), 4 + 3 + lc);
        }
    }

    #[test]
    fn test_short_le_width() {
        for le in 0..=SHORT_LE_MAX {
            assert_eq!(FrameLayout::of(&command(0, LeEncoding::Short, le)).le_width(), 1);
            assert_eq!(FrameLayout::of(&command(3, LeEncoding::Short, le)).le_width(), 1);
            assert_eq!(FrameLayout::of(&command(300, LeEncoding::Short, le)).le_width(), 1);
        }
    }

    #[test]
    fn test_extended_le_fallback() {
        // no Lc: the Le field carries its own marker
        assert_eq!(FrameLayout::of(&command(0, LeEncoding::Short, 257)).le_width(), 3);
        assert_eq!(FrameLayout::of(&command(0, LeEncoding::Extended, 0)).le_width(), 3);
        // any Lc already switched the frame to extended mode
        assert_eq!(FrameLayout::of(&command(1, LeEncoding::Short, 257)).le_width(), 2);
        assert_eq!(FrameLayout::of(&command(1, LeEncoding::Extended, 1)).le_width(), 2);
        assert_eq!(FrameLayout::of(&command(256, LeEncoding::Extended, 1)).le_width(), 2);
    }

    #[test]
    fn test_locate_extended() {
        let layout = FrameLayout::of(&command(256, LeEncoding::Extended, 300));
        assert_eq!(layout.total_len(), 4 + 3 + 256 + 2);
        assert_eq!(layout.locate(3), Some(Field::Header(3)));
        assert_eq!(layout.locate(4), Some(Field::LcMarker));
        assert_eq!(layout.locate(5), Some(Field::Lc(0)));
        assert_eq!(layout.locate(6), Some(Field::Lc(1)));
        assert_eq!(layout.locate(7), Some(Field::Data(0)));
        assert_eq!(layout.locate(262), Some(Field::Data(255)));
        assert_eq!(layout.locate(263), Some(Field::Le(0)));
        assert_eq!(layout.locate(264), Some(Field::Le(1)));
        assert_eq!(layout.locate(265), None);

        let layout = FrameLayout::of(&command(0, LeEncoding::Extended, 300));
        assert_eq!(layout.locate(4), Some(Field::LeMarker));
        assert_eq!(layout.locate(5), Some(Field::Le(0)));
        assert_eq!(layout.locate(6), Some(Field::Le(1)));
    }

    #[test]
    fn test_byte_at_length_fields() {
        let cmd = command(0x012C, LeEncoding::Short, 0x0100);
        let layout = cmd.layout();
        assert_eq!(layout.byte_at(&cmd, 4), Ok(0x00));
        assert_eq!(layout.byte_at(&cmd, 5), Ok(0x01));
        assert_eq!(layout.byte_at(&cmd, 6), Ok(0x2C));
        // short Le of 256 is sent as 00
        assert_eq!(layout.byte_at(&cmd, layout.total_len() - 1), Ok(0x00));

        let cmd = command(0, LeEncoding::Extended, 0x0123);
        let layout = cmd.layout();
        assert_eq!(layout.byte_at(&cmd, 4), Ok(0x00));
        assert_eq!(layout.byte_at(&cmd, 5), Ok(0x01));
        assert_eq!(layout.byte_at(&cmd, 6), Ok(0x23));
        assert_eq!(
            layout.byte_at(&cmd, 7),
            Err(FrameError::LayoutMismatch { offset: 7 })
        );
    }

    #[test]
    fn test_byte_at_rejects_foreign_command() {
        let layout = command(10, LeEncoding::Absent, 0).layout();
        let shorter = command(2, LeEncoding::Absent, 0);
        assert_eq!(
            layout.byte_at(&shorter, 12),
            Err(FrameError::LayoutMismatch { offset: 12 })
        );
    }

    #[test]
    fn test_check_lengths() {
        assert_eq!(check_lengths(&command(MAX_BUFFER_LEN, LeEncoding::Short, 300)), Ok(()));
        assert_eq!(
            check_lengths(&command(MAX_BUFFER_LEN + 1, LeEncoding::Absent, 0)),
            Err(FrameError::LcTooLong { lc: 301, max: MAX_BUFFER_LEN })
        );
        assert_eq!(
            check_lengths(&command(0, LeEncoding::Short, 301)),
            Err(FrameError::LeTooLong { le: 301, max: MAX_BUFFER_LEN })
        );
        // 2^16 itself passes the absolute bound but not the buffer bound
        assert_eq!(
            check_lengths(&command(0, LeEncoding::Extended, 65536)),
            Err(FrameError::LeTooLong { le: 65536, max: MAX_BUFFER_LEN })
        );
        assert_eq!(
            check_lengths(&command(0, LeEncoding::Extended, 65537)),
            Err(FrameError::LeOutOfRange(65537))
        );
        // Le is checked even when it is not sent
        assert!(check_lengths(&command(0, LeEncoding::Absent, 70000)).is_err());
    }
}
