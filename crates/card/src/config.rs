//! Configuration of the card lifecycle

use crate::atr::Protocol;

/// How the card interface gets mapped into the caller's address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMode {
    /// The transport maps the interface by itself
    #[default]
    Auto,
    /// The caller brackets card operations with map and unmap
    Voluntary,
}

impl MapMode {
    /// Whether map and unmap requests reach the transport
    pub const fn is_voluntary(&self) -> bool {
        matches!(self, Self::Voluntary)
    }
}

/// Options of the contact card negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiationConfig {
    /// Run a protocol and parameters selection after the ATR
    pub negotiate_pts: bool,

    /// Switch to the baud rate agreed during PTS
    pub change_baud_rate: bool,

    /// Use this protocol whatever the ATR offers
    pub force_protocol: Option<Protocol>,

    /// Use this elementary time unit, in clock cycles
    pub force_etu: Option<u32>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            negotiate_pts: true,
            change_baud_rate: true,
            force_protocol: None,
            force_etu: None,
        }
    }
}

impl NegotiationConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to run PTS
    pub const fn with_pts(mut self, negotiate_pts: bool) -> Self {
        self.negotiate_pts = negotiate_pts;
        self
    }

    /// Set whether to change the baud rate
    pub const fn with_baud_rate_change(mut self, change_baud_rate: bool) -> Self {
        self.change_baud_rate = change_baud_rate;
        self
    }

    /// Force the transmission protocol
    pub const fn with_forced_protocol(mut self, protocol: Protocol) -> Self {
        self.force_protocol = Some(protocol);
        self
    }

    /// Force the elementary time unit
    pub const fn with_forced_etu(mut self, etu: u32) -> Self {
        self.force_etu = Some(etu);
        self
    }
}
