// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Error types for cdp-bridge

use thiserror::Error;

/// Result type alias for cdp-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message used whenever a node has no usable on-screen geometry.
pub(crate) const NOT_VISIBLE: &str = "Node is either not visible or not an HTMLElement";

/// Errors that can occur when driving remote objects
#[derive(Debug, Error)]
pub enum Error {
    /// Node is absent, zero-sized, or not an element
    ///
    /// Raised by geometry-dependent operations (click point, screenshots)
    /// when the browser reports no visible area for the node.
    #[error("{0}")]
    Visibility(String),

    /// The execution context is gone (navigation, frame detach, target close)
    ///
    /// The handle or context must be re-acquired from a live frame.
    #[error("Execution context was destroyed, most likely because of a navigation.")]
    ContextDestroyed,

    /// JavaScript threw while being evaluated in the page
    #[error("Evaluation failed: {message}")]
    Evaluation {
        message: String,
        stack: Option<String>,
    },

    /// Function source could not be rebuilt into a standalone expression
    #[error("Passed function is not well-serializable!")]
    UnserializableFunction,

    /// A handle was passed to an execution context it does not belong to
    #[error("JSHandles can be evaluated only in the context they were created!")]
    CrossContext,

    /// A handle was used after it was disposed
    #[error("JSHandle is disposed!")]
    DisposedHandle,

    /// A relative point stayed outside the viewport after one scroll attempt
    #[error("Failed to scroll relative point into viewport")]
    ScrollFailure,

    /// Argument of the wrong JavaScript type (select options)
    #[error("{0}")]
    TypeValidation(String),

    /// More than one file handed to a non-multiple file input
    #[error("Non-multiple file input can only accept single file!")]
    MultipleFileInput,

    /// In-page routine refused the element (detached, disabled, wrong tag...)
    #[error("{0}")]
    ElementState(String),

    /// Element not found by selector
    #[error("Element not found: selector '{0}'")]
    ElementNotFound(String),

    /// Failed to establish connection with the browser
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    /// Transport-level error (websocket communication)
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Protocol-level error reported by the browser
    ///
    /// Holds the remote message verbatim so callers can match on its text.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Timeout waiting for a protocol response
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Channel closed unexpectedly
    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    /// Invalid argument provided to method
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    pub(crate) fn not_visible() -> Self {
        Error::Visibility(NOT_VISIBLE.to_string())
    }
}
