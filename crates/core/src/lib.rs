//! Core types for framing ISO/IEC 7816 APDU commands
//!
//! This crate turns a logical APDU command into the exact byte sequence a card
//! expects and slices that sequence into fixed-size transport units.
//!
//! ## Overview
//!
//! - [`ApduCommand`] and [`ApduResponse`] are the logical entities exchanged
//!   with a card.
//! - [`FrameLayout`] computes the framed size of a command and the widths of
//!   its Lc and Le fields (short or extended encoding).
//! - [`fragment`] writes the *i*-th `block_size` chunk of the framed command
//!   into a caller buffer. Every call is independent of the previous ones, so
//!   any chunk can be regenerated for a retransmission.
//!
//! The crate builds without `std` (with `alloc`) when the default `std`
//! feature is disabled.
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

extern crate alloc;

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod command;
pub mod constants;
pub mod frame;
pub mod response;

mod error;
pub use error::{Error, Result, ResultExt};

pub use command::{ApduCommand, CommandError, LeEncoding};
pub use frame::{Field, FrameError, FrameLayout, Fragments, encode, fragment};
pub use response::status::{StatusClass, StatusWord};
pub use response::{ApduResponse, ResponseError, StatusError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        ApduCommand, ApduResponse, Bytes, BytesMut, Error, FrameError, FrameLayout, LeEncoding,
        Result, ResultExt, StatusWord, constants::*, fragment,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let cmd = ApduCommand::new(0x00, 0xA4, 0x04, 0x00).with_data(vec![0x3F, 0x00]);
        assert_eq!(cmd.lc(), 2);
        assert_eq!(FrameLayout::of(&cmd).total_len(), 7);

        let resp = ApduResponse::success(Bytes::from_static(&[0x01, 0x02, 0x03])).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.data().as_ref(), &[0x01, 0x02, 0x03]);
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
    }
}
