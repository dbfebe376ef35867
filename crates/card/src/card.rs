//! Card abstraction dispatching to the transport of its type
//!
//! Only contact cards have a transport. Every operation on an NFC or unknown
//! card is logged and fails with [`CardError::UnsupportedCardType`].

use derive_more::Display;
use scard_apdu_core::{ApduCommand, ApduResponse, ResultExt};
use tracing::{info, warn};

use crate::atr::{Atr, Protocol};
use crate::error::{CardError, Result};
use crate::event::EventHandler;
use crate::transport::ContactTransport;

/// Type of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CardKind {
    /// ISO7816 contact card
    #[display("contact")]
    Contact,
    /// ISO14443 contactless card
    #[display("NFC")]
    Nfc,
    /// Card not initialized yet
    #[display("unknown")]
    Unknown,
}

/// Link parameters of a negotiated contact card
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{protocol}, ATR {atr}")]
pub struct ContactSession {
    /// Transmission protocol
    pub protocol: Protocol,
    /// Answer-to-reset
    pub atr: Atr,
}

impl ContactSession {
    /// Create a new contact session
    pub const fn new(protocol: Protocol, atr: Atr) -> Self {
        Self { protocol, atr }
    }
}

/// Session data of a card, keyed by its type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CardSession {
    /// Negotiated contact card
    Contact(ContactSession),
    /// Contactless card
    Nfc,
    /// Nothing negotiated
    #[default]
    Unknown,
}

/// A smartcard as seen by the caller
///
/// A card starts [`CardKind::Unknown`] and becomes a contact card once
/// [`Fsm::init`](crate::Fsm::init) succeeds. When the card is pulled out the
/// caller signals it with [`Card::notify_lost`] and [`Card::reset`]s it.
///
/// A card is not synchronized: a multi-threaded caller serializes access to
/// each card itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Card {
    session: CardSession,
}

impl Card {
    /// Create an uninitialized card
    pub const fn new() -> Self {
        Self {
            session: CardSession::Unknown,
        }
    }

    /// Create a card from existing session data
    pub const fn with_session(session: CardSession) -> Self {
        Self { session }
    }

    /// Type of the card
    pub const fn kind(&self) -> CardKind {
        match self.session {
            CardSession::Contact(_) => CardKind::Contact,
            CardSession::Nfc => CardKind::Nfc,
            CardSession::Unknown => CardKind::Unknown,
        }
    }

    /// Session data
    pub const fn session(&self) -> &CardSession {
        &self.session
    }

    /// Contact session, if the card was negotiated
    pub const fn contact(&self) -> Option<&ContactSession> {
        match &self.session {
            CardSession::Contact(session) => Some(session),
            CardSession::Nfc | CardSession::Unknown => None,
        }
    }

    /// Negotiated protocol of a contact card
    pub fn protocol(&self) -> Option<Protocol> {
        self.contact().map(|session| session.protocol)
    }

    /// ATR of a contact card
    pub fn atr(&self) -> Option<&Atr> {
        self.contact().map(|session| &session.atr)
    }

    /// Forget the session, after the card was removed
    pub fn reset(&mut self) {
        self.session = CardSession::Unknown;
    }

    pub(crate) fn set_contact(&mut self, session: ContactSession) {
        self.session = CardSession::Contact(session);
    }

    /// Exchange a command with the card
    ///
    /// The command lengths are checked before it reaches the transport.
    pub fn send_apdu<T: ContactTransport>(
        &self,
        transport: &mut T,
        command: &ApduCommand,
    ) -> Result<ApduResponse> {
        let session = self.supported("send APDU")?;
        command.validate().context("Invalid APDU command")?;
        Ok(transport.send_apdu(command, &session.atr, session.protocol)?)
    }

    /// Log the protocol and ATR of the card
    pub fn print_diagnostics<T: ContactTransport>(&self, transport: &T) -> Result<()> {
        let session = self.supported("print card information")?;
        info!("===== Contact Card ============");
        info!(protocol = %session.protocol, "Protocol");
        transport.print_atr(&session.atr);
        Ok(())
    }

    /// Whether the card is still in its slot
    ///
    /// Transport errors and unsupported card types read as absent.
    pub fn is_inserted<T: ContactTransport>(&self, transport: &mut T) -> bool {
        if self.supported("check card presence").is_err() {
            return false;
        }
        transport.is_inserted().unwrap_or_else(|e| {
            warn!(error = %e, "Card presence check failed");
            false
        })
    }

    /// Block until the card is present or the transport timeout elapses
    pub fn wait_with_timeout<T: ContactTransport>(&self, transport: &mut T) -> Result<()> {
        let session = self.supported("wait for card")?;
        Ok(transport.wait_timeout(&session.atr, session.protocol)?)
    }

    /// Tell the transport the card was removed
    pub fn notify_lost<T: ContactTransport>(&self, transport: &mut T) -> Result<()> {
        self.supported("notify card loss")?;
        transport.card_lost();
        Ok(())
    }

    /// Install an action the transport runs on hardware events
    pub fn register_event_handler<T, H>(&self, transport: &mut T, handler: H) -> Result<()>
    where
        T: ContactTransport,
        H: EventHandler + 'static,
    {
        self.supported("register event handler")?;
        transport.register_handler(Box::new(handler));
        Ok(())
    }

    fn supported(&self, operation: &'static str) -> Result<&ContactSession> {
        self.contact().ok_or_else(|| {
            let kind = self.kind();
            warn!(%kind, operation, "Unsupported card type");
            CardError::UnsupportedCardType(kind)
        })
    }
}
