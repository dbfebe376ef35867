//! Callbacks fired by a transport on hardware events

use core::fmt;

/// Action run by the transport when a hardware event occurs, such as a card
/// removal interrupt
pub trait EventHandler: Send {
    /// Handle the event
    fn on_event(&mut self);
}

// Implementations for closures
impl<F> EventHandler for F
where
    F: FnMut() + Send,
{
    fn on_event(&mut self) {
        self()
    }
}

impl fmt::Debug for dyn EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler")
    }
}
