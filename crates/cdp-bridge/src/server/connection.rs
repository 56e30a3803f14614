//! JSON-RPC connection for the Chrome DevTools Protocol

use crate::api::ConnectOptions;
use crate::error::{Error, Result};
use crate::server::session::CdpSession;
use crate::server::transport::{TransportReceiver, TransportSender, WebSocketTransport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex as TokioMutex;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Capacity of the protocol event fan-out. Slow subscribers lag instead of
/// blocking the dispatch loop.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Protocol request message sent to the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Value::is_null", default)]
    pub params: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Protocol response message from the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Out-of-band notification (`Runtime.executionContextDestroyed`, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Response(Response),
    Event(Event),
}

type Callbacks = HashMap<u64, oneshot::Sender<Result<Value>>>;

/// JSON-RPC connection to a browser's DevTools endpoint
pub struct Connection {
    last_id: AtomicU64,
    callbacks: Arc<TokioMutex<Callbacks>>,
    sender: Arc<TokioMutex<Box<dyn TransportSender>>>,
    message_rx: Arc<TokioMutex<Option<mpsc::UnboundedReceiver<Value>>>>,
    transport_receiver: Arc<TokioMutex<Option<Box<dyn TransportReceiver>>>>,
    events: broadcast::Sender<Event>,
    timeout: Duration,
}

impl Connection {
    pub fn new(
        sender: impl TransportSender + 'static,
        receiver: impl TransportReceiver + 'static,
        message_rx: mpsc::UnboundedReceiver<Value>,
        timeout: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            last_id: AtomicU64::new(1),
            callbacks: Arc::new(TokioMutex::new(HashMap::new())),
            sender: Arc::new(TokioMutex::new(Box::new(sender))),
            message_rx: Arc::new(TokioMutex::new(Some(message_rx))),
            transport_receiver: Arc::new(TokioMutex::new(Some(Box::new(receiver)))),
            events,
            timeout,
        }
    }

    /// Connects to a DevTools websocket endpoint and spawns the message loop.
    pub async fn connect(url: &str, options: Option<ConnectOptions>) -> Result<Arc<Self>> {
        let options = options.unwrap_or_default();
        let (transport, message_rx) =
            WebSocketTransport::connect(url, options.headers.clone()).await?;
        let (sender, receiver) = transport.into_parts();

        let connection = Arc::new(Self::new(
            sender,
            receiver,
            message_rx,
            options.request_timeout(),
        ));

        let conn = Arc::clone(&connection);
        tokio::spawn(async move {
            conn.run().await;
        });

        Ok(connection)
    }

    /// Sends a request and awaits the matching response.
    ///
    /// `session_id` routes the request to an attached target; `None` talks to
    /// the browser endpoint itself.
    pub async fn send_message(
        &self,
        session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> Result<Value> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(
            "Sending message: id={}, session={:?}, method='{}'",
            id,
            session_id,
            method
        );

        let (tx, rx) = oneshot::channel();
        self.callbacks.lock().await.insert(id, tx);

        let request = Request {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };

        let request_value = serde_json::to_value(&request)?;

        if let Err(e) = self.sender.lock().await.send(request_value).await {
            tracing::error!("Failed to send message: {:?}", e);
            self.callbacks.lock().await.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(received) => received.map_err(|_| Error::ChannelClosed).and_then(|r| r),
            Err(_) => {
                self.callbacks.lock().await.remove(&id);
                Err(Error::Timeout(format!(
                    "{} exceeded {}ms",
                    method,
                    self.timeout.as_millis()
                )))
            }
        }
    }

    /// Subscribes to every protocol event arriving on this connection.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// A session that talks to the browser endpoint (no target).
    pub fn browser_session(self: &Arc<Self>) -> CdpSession {
        CdpSession::new(Arc::clone(self), None)
    }

    /// Attaches to a target in flat mode and returns its session.
    pub async fn attach_to_target(self: &Arc<Self>, target_id: &str) -> Result<CdpSession> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AttachResponse {
            session_id: String,
        }

        let response = self
            .send_message(
                None,
                "Target.attachToTarget",
                serde_json::json!({ "targetId": target_id, "flatten": true }),
            )
            .await?;
        let attached: AttachResponse = serde_json::from_value(response)?;

        tracing::debug!(
            "Attached to target {} with session {}",
            target_id,
            attached.session_id
        );

        Ok(CdpSession::new(
            Arc::clone(self),
            Some(Arc::from(attached.session_id.as_str())),
        ))
    }

    pub async fn run(self: &Arc<Self>) {
        let Some(mut transport_receiver) = self.transport_receiver.lock().await.take() else {
            tracing::error!("Connection message loop already started");
            return;
        };

        let transport_handle = tokio::spawn(async move {
            if let Err(e) = transport_receiver.run().await {
                tracing::error!("Transport error: {}", e);
            }
        });

        let Some(mut message_rx) = self.message_rx.lock().await.take() else {
            tracing::error!("Connection message receiver already taken");
            return;
        };

        while let Some(message_value) = message_rx.recv().await {
            match serde_json::from_value::<Message>(message_value) {
                Ok(message) => {
                    if let Err(e) = self.dispatch(message).await {
                        tracing::error!("Error dispatching message: {}", e);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to parse message: {}", e);
                }
            }
        }

        tracing::debug!("Message loop ended (transport closed)");
        // Dropping the pending senders wakes every waiter with ChannelClosed
        self.callbacks.lock().await.clear();
        let _ = transport_handle.await;
    }

    pub async fn dispatch(&self, message: Message) -> Result<()> {
        match message {
            Message::Response(response) => {
                tracing::debug!("Processing response for ID: {}", response.id);
                let callback = self
                    .callbacks
                    .lock()
                    .await
                    .remove(&response.id)
                    .ok_or_else(|| {
                        Error::ProtocolError(format!(
                            "Cannot find request to respond: id={}",
                            response.id
                        ))
                    })?;

                let result = match response.error {
                    Some(error) => Err(parse_protocol_error(error)),
                    None => Ok(response.result.unwrap_or(Value::Null)),
                };

                let _ = callback.send(result);
                Ok(())
            }
            Message::Event(event) => {
                tracing::debug!("Event: method={}, session={:?}", event.method, event.session_id);
                // No subscribers is not an error
                let _ = self.events.send(event);
                Ok(())
            }
        }
    }
}

fn parse_protocol_error(payload: ErrorPayload) -> Error {
    if let Some(data) = &payload.data {
        tracing::debug!("Protocol error {}: {} ({})", payload.code, payload.message, data);
    }
    // Keep the message verbatim: callers match on its suffix
    Error::ProtocolError(payload.message)
}
