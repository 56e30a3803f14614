// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// JSHandle - reference to a value living in an execution context
//
// A handle owns one remote object descriptor. Clones share the descriptor
// and its disposed flag, so disposing through any clone disposes them all
// and the remote object is released once. Handles hold only a weak
// reference to their context: navigation can destroy a context while
// handles are still around.

use crate::error::{Error, Result};
use crate::protocol::element_handle::ElementHandle;
use crate::protocol::evaluate_conversion::{EvaluateArg, JsValue};
use crate::protocol::execution_context::{
    ContextInner, ExecutionContext, Script, describe_remote_object,
};
use crate::protocol::remote_object::RemoteObject;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

struct HandleInner {
    context: Weak<ContextInner>,
    remote_object: RemoteObject,
    disposed: AtomicBool,
}

/// Handle to a JavaScript value or object in the page.
#[derive(Clone)]
pub struct JsHandle {
    inner: Arc<HandleInner>,
}

impl JsHandle {
    pub(crate) fn new(context: &ExecutionContext, remote_object: RemoteObject) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                context: context.downgrade(),
                remote_object,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn remote_object(&self) -> &RemoteObject {
        &self.inner.remote_object
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Marks the handle disposed. Returns `false` if it already was.
    pub(crate) fn mark_disposed(&self) -> bool {
        !self.inner.disposed.swap(true, Ordering::SeqCst)
    }

    /// The owning context, or `ContextDestroyed` once it has been dropped.
    pub fn execution_context(&self) -> Result<ExecutionContext> {
        self.inner
            .context
            .upgrade()
            .map(ExecutionContext::from_inner)
            .ok_or(Error::ContextDestroyed)
    }

    pub(crate) fn belongs_to(&self, context: &ExecutionContext) -> bool {
        context.is_same(&self.inner.context)
    }

    /// The owning context, failing for disposed handles.
    pub(crate) fn live_context(&self) -> Result<ExecutionContext> {
        if self.is_disposed() {
            return Err(Error::DisposedHandle);
        }
        self.execution_context()
    }

    fn with_self_arg(&self, args: &[EvaluateArg]) -> Vec<EvaluateArg> {
        std::iter::once(EvaluateArg::from(self))
            .chain(args.iter().cloned())
            .collect()
    }

    /// Calls `function` with this handle as its first argument and returns
    /// the result by value.
    ///
    /// ```ignore
    /// let text = handle.evaluate("el => el.textContent", &[]).await?;
    /// ```
    pub async fn evaluate(&self, function: &str, args: &[EvaluateArg]) -> Result<JsValue> {
        let context = self.live_context()?;
        context
            .evaluate(Script::function(function), &self.with_self_arg(args))
            .await
    }

    /// Like [`JsHandle::evaluate`], returning a handle to the result.
    pub async fn evaluate_handle(&self, function: &str, args: &[EvaluateArg]) -> Result<Handle> {
        let context = self.live_context()?;
        context
            .evaluate_handle(Script::function(function), &self.with_self_arg(args))
            .await
    }

    /// Handle to `this[name]`.
    pub async fn get_property(&self, name: &str) -> Result<Handle> {
        let context = self.live_context()?;
        let holder = self
            .evaluate_handle(
                "(object, propertyName) => { const result = { __proto__: null }; result[propertyName] = object[propertyName]; return result; }",
                &[EvaluateArg::from(name)],
            )
            .await?;

        let properties = context.get_properties(holder.as_js_handle()).await;
        context.release_handle(holder.as_js_handle()).await;

        let mut found = None;
        for (property_name, handle) in properties? {
            if found.is_none() && property_name == name {
                found = Some(handle);
            } else {
                handle.dispose().await;
            }
        }
        found.ok_or_else(|| Error::ProtocolError(format!("Property '{}' was not returned", name)))
    }

    /// Enumerable own properties. Every returned handle is owned by the caller.
    pub async fn get_properties(&self) -> Result<Vec<(String, Handle)>> {
        let context = self.live_context()?;
        context.get_properties(self).await
    }

    /// The referenced value, materialized by value.
    pub async fn json_value(&self) -> Result<JsValue> {
        let context = self.live_context()?;
        context.handle_json_value(self).await
    }

    /// Releases the remote object. Repeated calls do nothing.
    pub async fn dispose(&self) {
        match self.execution_context() {
            Ok(context) => context.release_handle(self).await,
            Err(_) => {
                self.mark_disposed();
            }
        }
    }
}

impl fmt::Display for JsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_remote_object(self.remote_object()))
    }
}

impl PartialEq for JsHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for JsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsHandle")
            .field("remote_object", self.remote_object())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// A handle as produced by evaluation: a generic value handle or, for DOM
/// nodes in a frame's context, an element handle.
#[derive(Debug, Clone)]
pub enum Handle {
    Value(JsHandle),
    Element(ElementHandle),
}

impl Handle {
    pub fn as_js_handle(&self) -> &JsHandle {
        match self {
            Handle::Value(handle) => handle,
            Handle::Element(element) => element.as_js_handle(),
        }
    }

    pub fn as_element(&self) -> Option<&ElementHandle> {
        match self {
            Handle::Element(element) => Some(element),
            Handle::Value(_) => None,
        }
    }

    pub fn into_element(self) -> Option<ElementHandle> {
        match self {
            Handle::Element(element) => Some(element),
            Handle::Value(_) => None,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.as_js_handle().is_disposed()
    }

    pub async fn json_value(&self) -> Result<JsValue> {
        self.as_js_handle().json_value().await
    }

    pub async fn dispose(&self) {
        self.as_js_handle().dispose().await
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_js_handle(), f)
    }
}

/// Wraps a descriptor returned in `context`.
///
/// DOM nodes become element handles bound to the frame's page; everything
/// else, including nodes in frameless contexts, becomes a value handle.
pub fn create_handle(context: &ExecutionContext, remote_object: RemoteObject) -> Handle {
    match context.frame() {
        Some(frame) if remote_object.is_node() => {
            let page = frame.weak_page().clone();
            Handle::Element(ElementHandle::new(JsHandle::new(context, remote_object), page))
        }
        _ => Handle::Value(JsHandle::new(context, remote_object)),
    }
}
