// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// ExecutionContext - a remote JavaScript evaluation scope
//
// Wraps one browser-assigned context id. Scripts are sent through the
// session with `Runtime.evaluate` (expressions) or `Runtime.callFunctionOn`
// (functions with arguments); results come back as plain values or as
// handles to live remote objects.
//
// A context is Active until the browser reports its destruction (navigation,
// frame detach). From then on every operation fails with
// `Error::ContextDestroyed` without a protocol round trip.

use crate::error::{Error, Result};
use crate::protocol::element_handle::ElementHandle;
use crate::protocol::evaluate_conversion::{
    EvaluateArg, JsValue, call_argument_from_value, value_from_remote_object,
};
use crate::protocol::function_source::{
    serialize_function, with_function_source_url, with_source_url,
};
use crate::protocol::js_handle::{Handle, JsHandle, create_handle};
use crate::protocol::page::Frame;
use crate::protocol::remote_object::{
    CallArgument, EvaluateResponse, ExecutionContextId, GetPropertiesResponse, RemoteObject,
    ResolveNodeResponse,
};
use crate::server::channel::Channel;
use crate::server::session::{CdpSession, SessionLike};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;

/// Remote messages that mean the value was too deep or too large to be
/// returned by value. The result is treated as `undefined`.
const UNRETURNABLE_VALUE_MESSAGES: [&str; 2] = [
    "Object reference chain is too long",
    "Object couldn't be returned by value",
];

/// Remote message suffixes that mean the context no longer exists.
const DESTROYED_CONTEXT_SUFFIXES: [&str; 2] = [
    "Cannot find context with specified id",
    "Inspected target navigated or closed",
];

/// Source to evaluate: a bare expression or a function taking arguments.
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::protocol::Script;
///
/// let title = Script::expression("document.title");
/// let sum = Script::function("(a, b) => a + b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    Expression(String),
    Function(String),
}

impl Script {
    pub fn expression(source: impl Into<String>) -> Self {
        Script::Expression(source.into())
    }

    pub fn function(source: impl Into<String>) -> Self {
        Script::Function(source.into())
    }
}

/// Result of an evaluation: by value or by handle.
#[derive(Debug, Clone)]
pub enum Evaluated {
    Value(JsValue),
    Handle(Handle),
}

pub(crate) struct ContextInner {
    channel: Channel,
    context_id: ExecutionContextId,
    frame: Option<Frame>,
    destroyed: AtomicBool,
}

/// A remote evaluation scope.
///
/// Clones share state; handles keep only a weak reference back to it.
#[derive(Clone)]
pub struct ExecutionContext {
    inner: Arc<ContextInner>,
}

impl ExecutionContext {
    pub fn new(
        session: Arc<dyn SessionLike>,
        context_id: ExecutionContextId,
        frame: Option<Frame>,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                channel: Channel::new(session),
                context_id,
                frame,
                destroyed: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ContextInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ContextInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn is_same(&self, other: &Weak<ContextInner>) -> bool {
        std::ptr::eq(Arc::as_ptr(&self.inner), other.as_ptr())
    }

    pub(crate) fn channel(&self) -> &Channel {
        &self.inner.channel
    }

    pub fn id(&self) -> ExecutionContextId {
        self.inner.context_id
    }

    /// Owning frame; `None` for worker and other frameless contexts.
    pub fn frame(&self) -> Option<&Frame> {
        self.inner.frame.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }

    /// Moves the context to the terminal destroyed state.
    pub fn mark_destroyed(&self) {
        if !self.inner.destroyed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Execution context {} destroyed", self.id());
        }
    }

    /// Feeds a protocol event to the context.
    ///
    /// `Runtime.executionContextDestroyed` for this id and
    /// `Runtime.executionContextsCleared` destroy it.
    pub fn on_event(&self, method: &str, params: &Value) {
        match method {
            "Runtime.executionContextDestroyed" => {
                if params["executionContextId"].as_i64() == Some(self.id()) {
                    self.mark_destroyed();
                }
            }
            "Runtime.executionContextsCleared" => self.mark_destroyed(),
            _ => {}
        }
    }

    /// Spawns a task that forwards `session`'s events to this context until
    /// it is destroyed or dropped.
    pub fn track_destruction(&self, session: &CdpSession) -> tokio::task::JoinHandle<()> {
        let mut events = session.subscribe();
        let session = session.clone();
        let context = self.downgrade();
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Context event listener lagged by {} events", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if !session.owns_event(&event) {
                    continue;
                }
                let Some(inner) = context.upgrade() else {
                    break;
                };
                let context = ExecutionContext::from_inner(inner);
                context.on_event(&event.method, &event.params);
                if context.is_destroyed() {
                    break;
                }
            }
        })
    }

    /// Evaluates `script` and returns the result by value.
    ///
    /// Arguments are only accepted for [`Script::Function`].
    pub async fn evaluate(&self, script: Script, args: &[EvaluateArg]) -> Result<JsValue> {
        match self.evaluate_internal(true, script, args).await? {
            Evaluated::Value(value) => Ok(value),
            Evaluated::Handle(handle) => handle.json_value().await,
        }
    }

    /// Evaluates `script` and returns a handle to the result.
    pub async fn evaluate_handle(&self, script: Script, args: &[EvaluateArg]) -> Result<Handle> {
        match self.evaluate_internal(false, script, args).await? {
            Evaluated::Handle(handle) => Ok(handle),
            Evaluated::Value(value) => Err(Error::ProtocolError(format!(
                "Expected a handle, received value {}",
                value
            ))),
        }
    }

    pub(crate) async fn evaluate_internal(
        &self,
        return_by_value: bool,
        script: Script,
        args: &[EvaluateArg],
    ) -> Result<Evaluated> {
        self.ensure_alive()?;

        let response = match script {
            Script::Expression(expression) => {
                if !args.is_empty() {
                    return Err(Error::InvalidArgument(
                        "Arguments can only be passed to functions".to_string(),
                    ));
                }
                let params = json!({
                    "expression": with_source_url(&expression),
                    "contextId": self.id(),
                    "returnByValue": return_by_value,
                    "awaitPromise": true,
                    "userGesture": true,
                });
                self.send_evaluate("Runtime.evaluate", params).await?
            }
            Script::Function(source) => {
                let function_text = serialize_function(&source)?;
                let arguments = args
                    .iter()
                    .map(|arg| self.convert_argument(arg))
                    .collect::<Result<Vec<_>>>()?;
                let params = json!({
                    "functionDeclaration": with_function_source_url(&function_text),
                    "executionContextId": self.id(),
                    "arguments": arguments,
                    "returnByValue": return_by_value,
                    "awaitPromise": true,
                    "userGesture": true,
                });
                self.send_evaluate("Runtime.callFunctionOn", params).await?
            }
        };

        if let Some(details) = response.exception_details {
            return Err(Error::Evaluation {
                message: details.message(),
                stack: details.stack(),
            });
        }

        if return_by_value {
            value_from_remote_object(&response.result).map(Evaluated::Value)
        } else {
            Ok(Evaluated::Handle(create_handle(self, response.result)))
        }
    }

    /// Converts an argument for `Runtime.callFunctionOn`.
    ///
    /// Handles must come from this context and still be live.
    pub(crate) fn convert_argument(&self, arg: &EvaluateArg) -> Result<CallArgument> {
        let handle = match arg {
            EvaluateArg::Value(value) => return Ok(call_argument_from_value(value)),
            EvaluateArg::Handle(handle) => handle.as_js_handle(),
        };

        if !handle.belongs_to(self) {
            return Err(Error::CrossContext);
        }
        if handle.is_disposed() {
            return Err(Error::DisposedHandle);
        }

        let remote = handle.remote_object();
        if let Some(tag) = &remote.unserializable_value {
            return Ok(CallArgument {
                unserializable_value: Some(tag.clone()),
                ..Default::default()
            });
        }
        match &remote.object_id {
            Some(object_id) => Ok(CallArgument {
                object_id: Some(object_id.clone()),
                ..Default::default()
            }),
            None => Ok(CallArgument {
                value: remote.value.clone(),
                ..Default::default()
            }),
        }
    }

    async fn send_evaluate(&self, method: &str, params: Value) -> Result<EvaluateResponse> {
        match self.channel().send(method, params).await {
            Ok(response) => Ok(response),
            Err(Error::ProtocolError(message))
                if UNRETURNABLE_VALUE_MESSAGES
                    .iter()
                    .any(|m| message.contains(m)) =>
            {
                tracing::debug!("{} result not returnable by value: {}", method, message);
                Ok(EvaluateResponse::undefined())
            }
            Err(error) => Err(self.map_context_error(error)),
        }
    }

    /// Remaps the browser's "context is gone" errors to
    /// [`Error::ContextDestroyed`] and marks the context destroyed.
    pub(crate) fn map_context_error(&self, error: Error) -> Error {
        match &error {
            Error::ProtocolError(message)
                if DESTROYED_CONTEXT_SUFFIXES
                    .iter()
                    .any(|suffix| message.ends_with(suffix)) =>
            {
                self.mark_destroyed();
                Error::ContextDestroyed
            }
            _ => error,
        }
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_destroyed() {
            Err(Error::ContextDestroyed)
        } else {
            Ok(())
        }
    }

    /// Resolves a backend node id (from DOM or layout queries) into an
    /// element handle bound to this context.
    pub async fn adopt_backend_node(&self, backend_node_id: i64) -> Result<ElementHandle> {
        self.ensure_alive()?;
        let response: ResolveNodeResponse = self
            .channel()
            .send(
                "DOM.resolveNode",
                json!({
                    "backendNodeId": backend_node_id,
                    "executionContextId": self.id(),
                }),
            )
            .await
            .map_err(|e| self.map_context_error(e))?;

        match create_handle(self, response.object) {
            Handle::Element(element) => Ok(element),
            Handle::Value(handle) => {
                let description = handle.to_string();
                self.release_handle(&handle).await;
                Err(Error::InvalidArgument(format!(
                    "Backend node {} resolved to {} outside a frame",
                    backend_node_id, description
                )))
            }
        }
    }

    /// Enumerable own properties of `handle`, in protocol order.
    ///
    /// Every returned handle is owned by the caller.
    pub async fn get_properties(&self, handle: &JsHandle) -> Result<Vec<(String, Handle)>> {
        self.ensure_alive()?;
        if handle.is_disposed() {
            return Err(Error::DisposedHandle);
        }
        let Some(object_id) = &handle.remote_object().object_id else {
            return Ok(Vec::new());
        };

        let response: GetPropertiesResponse = self
            .channel()
            .send(
                "Runtime.getProperties",
                json!({ "objectId": object_id, "ownProperties": true }),
            )
            .await
            .map_err(|e| self.map_context_error(e))?;

        Ok(response
            .result
            .into_iter()
            .filter(|property| property.enumerable)
            .filter_map(|property| {
                let value = property.value?;
                Some((property.name, create_handle(self, value)))
            })
            .collect())
    }

    /// Current value of the object `handle` points at.
    ///
    /// Object references are materialized with an identity call returning
    /// by value; inline values are returned directly.
    pub async fn handle_json_value(&self, handle: &JsHandle) -> Result<JsValue> {
        if handle.is_disposed() {
            return Err(Error::DisposedHandle);
        }
        let remote = handle.remote_object();
        let Some(object_id) = &remote.object_id else {
            return value_from_remote_object(remote);
        };
        self.ensure_alive()?;

        let response = self
            .send_evaluate(
                "Runtime.callFunctionOn",
                json!({
                    "functionDeclaration": "function() { return this; }",
                    "objectId": object_id,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        if let Some(details) = response.exception_details {
            return Err(Error::Evaluation {
                message: details.message(),
                stack: details.stack(),
            });
        }
        value_from_remote_object(&response.result)
    }

    /// Disposes `handle`, releasing its remote object at most once.
    ///
    /// The handle is unusable afterwards even if the release request fails.
    pub async fn release_handle(&self, handle: &JsHandle) {
        if !handle.mark_disposed() {
            return;
        }
        let Some(object_id) = &handle.remote_object().object_id else {
            return;
        };
        if self.is_destroyed() {
            return;
        }
        if let Err(e) = self
            .channel()
            .send_no_result("Runtime.releaseObject", json!({ "objectId": object_id }))
            .await
        {
            tracing::warn!("Failed to release remote object {}: {}", object_id, e);
        }
    }

    /// Debug label: `JSHandle@<subtype or type>` or `JSHandle:<value>`.
    pub fn describe(&self, handle: &JsHandle) -> String {
        describe_remote_object(handle.remote_object())
    }
}

pub(crate) fn describe_remote_object(remote: &RemoteObject) -> String {
    if remote.object_id.is_some() {
        return format!("JSHandle@{}", remote.subtype_or_type());
    }
    match value_from_remote_object(remote) {
        Ok(value) => format!("JSHandle:{}", value),
        Err(_) => format!("JSHandle:{}", remote.object_type),
    }
}

impl PartialEq for ExecutionContext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("id", &self.id())
            .field("frame", &self.frame().map(Frame::id))
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
