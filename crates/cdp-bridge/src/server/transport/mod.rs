// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// DevTools transport layer
//
// Carries JSON frames between the connection and the browser's
// remote-debugging endpoint. Only the websocket flavour is provided;
// the connection talks to it through the sender/receiver traits so
// tests can substitute their own halves.

use crate::Result;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::pin::Pin;

pub mod websocket;

pub use websocket::{WebSocketTransport, WebSocketTransportReceiver, WebSocketTransportSender};

/// Trait for the sending half of a transport
pub trait TransportSender: Send + Unpin {
    fn send(&mut self, message: JsonValue)
    -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Trait for the receiving half of a transport
pub trait TransportReceiver: Send + Unpin {
    /// Run the receive loop until the remote side closes
    fn run(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
