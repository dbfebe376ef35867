//! Smartcard abstraction over an ISO7816 contact transport
//!
//! This crate sits between callers building APDU commands with
//! [`scard_apdu_core`] and the link layer that talks to the physical card.
//!
//! - [`Fsm`] owns a [`ContactTransport`], fixes the [`MapMode`] at early
//!   initialization and negotiates contact cards.
//! - [`Card`] dispatches every operation on its type. Contact cards go to the
//!   transport; NFC and unknown cards are rejected with
//!   [`CardError::UnsupportedCardType`].
//!
//! # Examples
//!
//! ```
//! use scard_apdu_core::ApduCommand;
//! use scard_card::mock::MockContactTransport;
//! use scard_card::{Atr, Card, Fsm, MapMode, NegotiationConfig, Protocol};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let atr = Atr::new(vec![0x3B, 0x00])?;
//! let transport = MockContactTransport::new()
//!     .with_card(atr, Protocol::T1)
//!     .with_response(vec![0x90, 0x00]);
//!
//! let mut fsm = Fsm::early_init(transport, MapMode::Voluntary)?;
//! let mut card = Card::new();
//! fsm.init(&mut card, &NegotiationConfig::default())?;
//!
//! let mut transport = fsm.mapped()?;
//! let select = ApduCommand::new(0x00, 0xA4, 0x04, 0x00).with_data(vec![0x3F, 0x00]);
//! let response = card.send_apdu(&mut *transport, &select)?;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod atr;
mod card;
mod config;
mod error;
pub mod event;
mod fsm;
pub mod mock;
mod transport;

pub use atr::{Atr, Convention, MAX_ATR_LEN, Protocol};
pub use card::{Card, CardKind, CardSession, ContactSession};
pub use config::{MapMode, NegotiationConfig};
pub use error::{AtrError, CardError, Result, TransportError};
pub use event::EventHandler;
pub use fsm::{Fsm, Mapped};
pub use transport::ContactTransport;

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Atr, Card, CardError, CardKind, ContactTransport, EventHandler, Fsm, MapMode,
        NegotiationConfig, Protocol, TransportError,
    };
}
