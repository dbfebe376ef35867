//! Contract of the ISO7816 contact link layer
//!
//! The link layer reads the ATR, negotiates PTS and baud rate, clocks T=0 or
//! T=1 frames to the card and polls card presence. This crate only drives it
//! through [`ContactTransport`].

use core::fmt;

use scard_apdu_core::{ApduCommand, ApduResponse};
use tracing::{debug, info, trace};

use crate::atr::{Atr, Protocol};
use crate::card::ContactSession;
use crate::config::{MapMode, NegotiationConfig};
use crate::error::TransportError;
use crate::event::EventHandler;

/// ISO7816 contact card transport
///
/// Every call blocks until the link layer completes or times out.
pub trait ContactTransport: Send + fmt::Debug {
    /// Prepare the link layer for the given map mode
    fn early_init(&mut self, mode: MapMode) -> Result<(), TransportError>;

    /// Map the card interface
    fn map(&mut self) -> Result<(), TransportError>;

    /// Unmap the card interface
    fn unmap(&mut self) -> Result<(), TransportError>;

    /// Power the card, read its ATR and negotiate the link
    fn negotiate(&mut self, config: &NegotiationConfig) -> Result<ContactSession, TransportError>;

    /// Exchange a command with the card
    ///
    /// The command is framed and split into link units by the transport.
    fn send_apdu(
        &mut self,
        command: &ApduCommand,
        atr: &Atr,
        protocol: Protocol,
    ) -> Result<ApduResponse, TransportError> {
        trace!(
            header = %hex::encode(command.header()),
            lc = command.lc(),
            le = command.le,
            %protocol,
            "Sending APDU"
        );
        let result = self.do_send_apdu(command, atr, protocol);
        match &result {
            Ok(response) => {
                trace!(
                    sw = %response.status(),
                    data = %hex::encode(response.data()),
                    "Received APDU response"
                );
            }
            Err(e) => {
                debug!(error = %e, "Transport error during APDU exchange");
            }
        }
        result
    }

    /// Internal implementation of send_apdu
    /// This is the method that concrete implementations should override
    fn do_send_apdu(
        &mut self,
        command: &ApduCommand,
        atr: &Atr,
        protocol: Protocol,
    ) -> Result<ApduResponse, TransportError>;

    /// Log the content of an ATR
    fn print_atr(&self, atr: &Atr) {
        info!(
            %atr,
            convention = %atr.convention(),
            historical_bytes = atr.historical_len(),
            "ATR"
        );
    }

    /// Tell the link layer the card was removed
    fn card_lost(&mut self);

    /// Whether a card sits in the slot
    fn is_inserted(&mut self) -> Result<bool, TransportError>;

    /// Block until a card is present or the timeout derived from the ATR and
    /// protocol elapses
    fn wait_timeout(&mut self, atr: &Atr, protocol: Protocol) -> Result<(), TransportError>;

    /// Install the action run on hardware events, replacing any previous one
    fn register_handler(&mut self, handler: Box<dyn EventHandler>);
}
