// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Session - the request/response seam every remote object talks through
//
// Execution contexts, handles and the CDP page never see the transport.
// They hold an `Arc<dyn SessionLike>` and send method + params pairs
// through it. Tests plug in scripted sessions at this seam.

use crate::error::Result;
use crate::server::connection::{Connection, Event};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Interface that protocol objects need from a DevTools session
pub trait SessionLike: Send + Sync {
    /// Send a protocol request and await its structured result
    fn send_message(
        &self,
        method: &str,
        params: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>>;
}

/// A session bound to one attached target (or to the browser itself).
#[derive(Clone)]
pub struct CdpSession {
    connection: Arc<Connection>,
    session_id: Option<Arc<str>>,
}

impl CdpSession {
    pub(crate) fn new(connection: Arc<Connection>, session_id: Option<Arc<str>>) -> Self {
        Self {
            connection,
            session_id,
        }
    }

    /// Flat-mode session id, `None` for the browser session.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Subscribes to events. Events of every session share one channel;
    /// use [`CdpSession::owns_event`] to filter.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.connection.subscribe()
    }

    /// Whether `event` was emitted for this session.
    pub fn owns_event(&self, event: &Event) -> bool {
        event.session_id.as_deref() == self.session_id()
    }

    /// Detaches from the target. The browser session has nothing to detach.
    pub async fn detach(&self) -> Result<()> {
        let Some(session_id) = self.session_id() else {
            return Ok(());
        };
        self.connection
            .send_message(
                None,
                "Target.detachFromTarget",
                serde_json::json!({ "sessionId": session_id }),
            )
            .await?;
        Ok(())
    }
}

impl SessionLike for CdpSession {
    fn send_message(
        &self,
        method: &str,
        params: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
        let method = method.to_string();
        Box::pin(async move {
            self.connection
                .send_message(self.session_id(), &method, params)
                .await
        })
    }
}

impl std::fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpSession")
            .field("session_id", &self.session_id)
            .finish()
    }
}
