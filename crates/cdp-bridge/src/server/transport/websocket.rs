// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0

use super::{TransportReceiver, TransportSender};
use crate::{Error, Result};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport for a browser's DevTools endpoint
/// (`ws://host:port/devtools/browser/<id>`).
pub struct WebSocketTransport {
    message_tx: mpsc::UnboundedSender<JsonValue>,
    sender: SplitSink<WsStream, WsMessage>,
    receiver: SplitStream<WsStream>,
}

pub struct WebSocketTransportReceiver {
    receiver: SplitStream<WsStream>,
    message_tx: mpsc::UnboundedSender<JsonValue>,
}

pub struct WebSocketTransportSender {
    sender: SplitSink<WsStream, WsMessage>,
}

impl WebSocketTransport {
    pub async fn connect(
        url: &str,
        headers: Option<HashMap<String, String>>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<JsonValue>)> {
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        let parsed = Url::parse(url).map_err(|e| Error::TransportError(format!("Invalid URL: {}", e)))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(Error::TransportError(format!(
                "Unsupported URL scheme '{}', expected ws or wss",
                parsed.scheme()
            )));
        }

        use tokio_tungstenite::tungstenite::client::IntoClientRequest;
        let mut request = url
            .into_client_request()
            .map_err(|e| Error::TransportError(format!("Failed to build request: {}", e)))?;

        if let Some(headers_map) = headers {
            use std::str::FromStr;
            use tokio_tungstenite::tungstenite::http::header::{HeaderName, HeaderValue};
            let headers = request.headers_mut();
            for (k, v) in headers_map {
                let name = HeaderName::from_str(&k)
                    .map_err(|e| Error::TransportError(format!("Invalid header name: {}", e)))?;
                let value = HeaderValue::from_str(&v)
                    .map_err(|e| Error::TransportError(format!("Invalid header value: {}", e)))?;
                headers.insert(name, value);
            }
        }

        let (ws_stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| Error::ConnectionFailed(format!("WebSocket connection failed: {}", e)))?;

        tracing::debug!("Connected to DevTools endpoint {}", url);

        let (sender, receiver) = ws_stream.split();

        Ok((
            Self {
                message_tx,
                sender,
                receiver,
            },
            message_rx,
        ))
    }

    pub fn into_parts(self) -> (WebSocketTransportSender, WebSocketTransportReceiver) {
        (
            WebSocketTransportSender {
                sender: self.sender,
            },
            WebSocketTransportReceiver {
                receiver: self.receiver,
                message_tx: self.message_tx,
            },
        )
    }
}

impl TransportSender for WebSocketTransportSender {
    fn send(
        &mut self,
        message: JsonValue,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let json_str = serde_json::to_string(&message)
                .map_err(|e| Error::TransportError(format!("Failed to serialize JSON: {}", e)))?;

            self.sender
                .send(WsMessage::Text(json_str.into()))
                .await
                .map_err(|e| {
                    Error::TransportError(format!("Failed to send WebSocket message: {}", e))
                })
        })
    }
}

impl TransportReceiver for WebSocketTransportReceiver {
    fn run(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            while let Some(msg_result) = self.receiver.next().await {
                let msg = msg_result.map_err(|e| {
                    Error::TransportError(format!("WebSocket read error: {}", e))
                })?;

                match msg {
                    WsMessage::Text(text) => {
                        let message: JsonValue = serde_json::from_str(&text).map_err(|e| {
                            Error::ProtocolError(format!("Failed to parse JSON: {}", e))
                        })?;

                        if self.message_tx.send(message).is_err() {
                            break;
                        }
                    }
                    // DevTools only speaks text frames
                    WsMessage::Binary(_) => {
                        tracing::warn!("Ignoring binary frame from DevTools endpoint");
                    }
                    WsMessage::Close(_) => break,
                    _ => {}
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_http_scheme() {
        let err = WebSocketTransport::connect("http://127.0.0.1:9222", None)
            .await
            .err()
            .expect("http scheme must be rejected");
        assert!(err.to_string().contains("Unsupported URL scheme"));
    }

    #[tokio::test]
    async fn test_connect_rejects_garbage_url() {
        let err = WebSocketTransport::connect("not a url", None)
            .await
            .err()
            .expect("garbage must be rejected");
        assert!(matches!(err, Error::TransportError(_)));
    }
}
