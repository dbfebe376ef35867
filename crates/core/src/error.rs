//! Core error type for APDU operations
//!
//! Each concern (command parsing, framing, response parsing) has its own error
//! enum; [`Error`] wraps them so higher layers can carry a single type.

use alloc::boxed::Box;
use alloc::string::String;

use crate::command::CommandError;
use crate::frame::FrameError;
use crate::response::ResponseError;

/// Result type using the core [`Error`]
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Framing or size calculation rejected the command
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Command could not be built or parsed
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Response could not be parsed
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// Context error with message and source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },

    /// Other error with static message
    #[error("{0}")]
    Other(&'static str),

    /// Generic dynamic error with string message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a new error with a static message
    pub const fn other(message: &'static str) -> Self {
        Self::Other(message)
    }

    /// Create a new error with a dynamic message
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self::Message(message.into())
    }

    /// The framing error at the root of this error, if any
    pub fn frame_error(&self) -> Option<&FrameError> {
        match self {
            Self::Frame(err) => Some(err),
            Self::Context { source, .. } => source.frame_error(),
            _ => None,
        }
    }
}

/// Extension trait adding context to results carrying a core error
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T, E> ResultExt<T> for core::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context<S: Into<String>>(self, context: S) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
