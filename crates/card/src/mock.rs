//! In-memory contact transport
//!
//! [`MockContactTransport`] frames every command in link blocks the way a T=1
//! reader would, records what was sent and answers from a queue of raw
//! responses. Card presence, negotiation outcome and mapping failures are
//! plain fields the test sets.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use scard_apdu_core::{ApduCommand, ApduResponse};
use tracing::debug;

use crate::atr::{Atr, Protocol};
use crate::card::ContactSession;
use crate::config::{MapMode, NegotiationConfig};
use crate::error::TransportError;
use crate::event::EventHandler;
use crate::transport::ContactTransport;

/// Default link block size, the T=1 default IFSC
pub const DEFAULT_BLOCK_SIZE: usize = 32;

/// Scriptable contact transport
#[derive(Debug)]
pub struct MockContactTransport {
    /// Mode received by `early_init`
    pub mode: Option<MapMode>,
    /// Whether the interface is currently mapped
    pub mapped: bool,
    /// Number of `map` calls
    pub map_calls: usize,
    /// Number of `unmap` calls
    pub unmap_calls: usize,
    /// Make map and unmap fail
    pub fail_mapping: bool,
    /// Session returned by negotiation, `None` when no card answers
    pub card: Option<ContactSession>,
    /// Configurations received by `negotiate`
    pub negotiations: Vec<NegotiationConfig>,
    /// Size of the link blocks commands are split into
    pub block_size: usize,
    /// Every block sent, in order
    pub blocks: Vec<Bytes>,
    /// Every framed command sent, reassembled from its blocks
    pub frames: Vec<Bytes>,
    /// Raw responses (data followed by SW1 SW2) returned in order
    pub responses: VecDeque<Bytes>,
    /// Outcome of presence checks
    pub presence: Result<bool, TransportError>,
    /// Number of card loss notifications
    pub lost: usize,
    handler: Option<Box<dyn EventHandler>>,
}

impl Default for MockContactTransport {
    fn default() -> Self {
        Self {
            mode: None,
            mapped: false,
            map_calls: 0,
            unmap_calls: 0,
            fail_mapping: false,
            card: None,
            negotiations: Vec::new(),
            block_size: DEFAULT_BLOCK_SIZE,
            blocks: Vec::new(),
            frames: Vec::new(),
            responses: VecDeque::new(),
            presence: Ok(true),
            lost: 0,
            handler: None,
        }
    }
}

impl MockContactTransport {
    /// Create a transport with a present card that does not answer negotiation
    pub fn new() -> Self {
        Self::default()
    }

    /// Negotiate `protocol` with a card answering `atr`
    pub fn with_card(mut self, atr: Atr, protocol: Protocol) -> Self {
        self.card = Some(ContactSession::new(protocol, atr));
        self
    }

    /// Set the link block size
    pub const fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Queue a raw response
    pub fn with_response(mut self, raw: impl Into<Bytes>) -> Self {
        self.responses.push_back(raw.into());
        self
    }

    /// Whether an event handler is installed
    pub const fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Simulate a hardware event, returns whether a handler ran
    pub fn fire_event(&mut self) -> bool {
        match self.handler.as_mut() {
            Some(handler) => {
                handler.on_event();
                true
            }
            None => false,
        }
    }
}

impl ContactTransport for MockContactTransport {
    fn early_init(&mut self, mode: MapMode) -> Result<(), TransportError> {
        self.mode = Some(mode);
        Ok(())
    }

    fn map(&mut self) -> Result<(), TransportError> {
        self.map_calls += 1;
        if self.fail_mapping {
            return Err(TransportError::Mapping);
        }
        self.mapped = true;
        Ok(())
    }

    fn unmap(&mut self) -> Result<(), TransportError> {
        self.unmap_calls += 1;
        if self.fail_mapping {
            return Err(TransportError::Mapping);
        }
        self.mapped = false;
        Ok(())
    }

    fn negotiate(&mut self, config: &NegotiationConfig) -> Result<ContactSession, TransportError> {
        self.negotiations.push(*config);
        let mut session = self
            .card
            .clone()
            .ok_or(TransportError::Negotiation("no answer to reset"))?;
        if let Some(protocol) = config.force_protocol {
            session.protocol = protocol;
        }
        Ok(session)
    }

    fn do_send_apdu(
        &mut self,
        command: &ApduCommand,
        _atr: &Atr,
        protocol: Protocol,
    ) -> Result<ApduResponse, TransportError> {
        if !matches!(self.presence, Ok(true)) {
            return Err(TransportError::NoCard);
        }

        let mut frame = BytesMut::with_capacity(command.encoded_len());
        for block in command.fragments(self.block_size) {
            let block = block?;
            debug!(%protocol, len = block.len(), "Sending block");
            frame.extend_from_slice(&block);
            self.blocks.push(block);
        }
        self.frames.push(frame.freeze());

        let raw = self
            .responses
            .pop_front()
            .ok_or(TransportError::Transmission)?;
        Ok(ApduResponse::from_bytes(&raw)?)
    }

    fn card_lost(&mut self) {
        self.lost += 1;
        self.presence = Ok(false);
    }

    fn is_inserted(&mut self) -> Result<bool, TransportError> {
        self.presence.clone()
    }

    fn wait_timeout(&mut self, _atr: &Atr, _protocol: Protocol) -> Result<(), TransportError> {
        match self.presence.clone()? {
            true => Ok(()),
            false => Err(TransportError::Timeout),
        }
    }

    fn register_handler(&mut self, handler: Box<dyn EventHandler>) {
        self.handler = Some(handler);
    }
}
