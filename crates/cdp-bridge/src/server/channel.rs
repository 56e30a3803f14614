// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Channel - typed request helper over a session
//
// Protocol objects describe their requests with serde types; the Channel
// serializes params, sends them through the session, and deserializes the
// result into the caller's response type.

use crate::error::Result;
use crate::server::session::SessionLike;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Channel provides typed RPC communication over a shared session.
#[derive(Clone)]
pub struct Channel {
    session: Arc<dyn SessionLike>,
}

impl Channel {
    pub fn new(session: Arc<dyn SessionLike>) -> Self {
        Self { session }
    }

    /// Sends a protocol method call and deserializes the result into `R`.
    pub async fn send<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R> {
        let params_value = serde_json::to_value(params)?;
        let response = self.session.send_message(method, params_value).await?;
        serde_json::from_value(response).map_err(Into::into)
    }

    /// Sends a method call with an empty parameter object.
    pub async fn send_no_params<R: DeserializeOwned>(&self, method: &str) -> Result<R> {
        self.send(method, serde_json::json!({})).await
    }

    /// Sends a method call whose result is ignored.
    pub async fn send_no_result<P: Serialize>(&self, method: &str, params: P) -> Result<()> {
        let _: Value = self.send(method, params).await?;
        Ok(())
    }

    /// The underlying session.
    pub fn session(&self) -> &Arc<dyn SessionLike> {
        &self.session
    }
}
