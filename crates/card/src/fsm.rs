//! Card lifecycle: early initialization, interface mapping and negotiation
//!
//! [`Fsm::early_init`] must run before any other card operation. The map
//! mode it receives is fixed for the lifetime of the returned context.

use core::ops::{Deref, DerefMut};

use tracing::{debug, instrument, warn};

use crate::card::Card;
use crate::config::{MapMode, NegotiationConfig};
use crate::error::{CardError, Result};
use crate::transport::ContactTransport;

/// Lifecycle context owning the contact transport
#[derive(Debug)]
pub struct Fsm<T: ContactTransport> {
    transport: T,
    mode: MapMode,
}

impl<T: ContactTransport> Fsm<T> {
    /// Initialize the transport for `mode`
    #[instrument(level = "debug", skip(transport))]
    pub fn early_init(mut transport: T, mode: MapMode) -> Result<Self> {
        transport.early_init(mode)?;
        debug!("Card lifecycle initialized");
        Ok(Self { transport, mode })
    }

    /// Map mode chosen at early initialization
    pub const fn mode(&self) -> MapMode {
        self.mode
    }

    /// Map the card interface, a no-op in [`MapMode::Auto`]
    pub fn map(&mut self) -> Result<()> {
        if self.mode.is_voluntary() {
            self.transport.map()?;
        }
        Ok(())
    }

    /// Unmap the card interface, a no-op in [`MapMode::Auto`]
    pub fn unmap(&mut self) -> Result<()> {
        if self.mode.is_voluntary() {
            self.transport.unmap()?;
        }
        Ok(())
    }

    /// Map the card interface until the returned guard is dropped
    pub fn mapped(&mut self) -> Result<Mapped<'_, T>> {
        self.map()?;
        Ok(Mapped { fsm: self })
    }

    /// Negotiate a contact card
    ///
    /// On success `card` becomes a contact card holding the negotiated
    /// protocol and ATR. On failure `card` is left as it was.
    #[instrument(level = "debug", skip(self, card))]
    pub fn init(&mut self, card: &mut Card, config: &NegotiationConfig) -> Result<()> {
        match self.transport.negotiate(config) {
            Ok(session) => {
                debug!(%session, "Contact card negotiated");
                card.set_contact(session);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Contact card negotiation failed");
                Err(CardError::Negotiation(e))
            }
        }
    }

    /// Shared access to the transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Exclusive access to the transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport back
    pub fn into_transport(self) -> T {
        self.transport
    }
}

/// Card interface mapped for the lifetime of the guard
///
/// Dereferences to the transport. Unmapping errors on drop are logged.
#[derive(Debug)]
pub struct Mapped<'a, T: ContactTransport> {
    fsm: &'a mut Fsm<T>,
}

impl<T: ContactTransport> Deref for Mapped<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.fsm.transport
    }
}

impl<T: ContactTransport> DerefMut for Mapped<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.fsm.transport
    }
}

impl<T: ContactTransport> Drop for Mapped<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.fsm.unmap() {
            warn!(error = %e, "Failed to unmap card interface");
        }
    }
}
