// Shared test fixtures
//
// MockSession answers protocol requests from a closure and records every
// request it sees. MockPage stands in for a real page and records input
// and viewport calls.

#![allow(dead_code)]

use async_trait::async_trait;
use cdp_bridge::protocol::{
    ExecutionContext, Frame, KeyboardModifier, MouseClickOptions, Page, PageDelegate,
    ScreenshotClip, ScreenshotOptions, Viewport,
};
use cdp_bridge::server::session::SessionLike;
use cdp_bridge::{Error, Result};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Initialize tracing subscriber for tests
///
/// Respects RUST_LOG; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// A canned reply: `Err` carries a protocol error message.
pub type Reply = std::result::Result<Value, String>;

type Handler = Box<dyn Fn(&str, &Value) -> Reply + Send + Sync>;

pub struct MockSession {
    handler: Handler,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockSession {
    pub fn new(handler: impl Fn(&str, &Value) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
    }

    /// Params of every request to `method`, in order.
    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl SessionLike for MockSession {
    fn send_message(
        &self,
        method: &str,
        params: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
        let reply = (self.handler)(method, &params);
        self.calls.lock().push((method.to_string(), params));
        Box::pin(async move { reply.map_err(Error::ProtocolError) })
    }
}

/// Function source of a `Runtime.callFunctionOn` request.
pub fn declaration(params: &Value) -> &str {
    params["functionDeclaration"].as_str().unwrap_or_default()
}

/// Remote descriptor of a DOM node.
pub fn node(object_id: &str) -> Value {
    json!({
        "type": "object",
        "subtype": "node",
        "className": "HTMLElement",
        "objectId": object_id,
    })
}

/// Remote descriptor of a plain object.
pub fn object(object_id: &str) -> Value {
    json!({ "type": "object", "objectId": object_id })
}

/// An evaluation reply wrapping `remote`.
pub fn result(remote: Value) -> Reply {
    Ok(json!({ "result": remote }))
}

/// An evaluation reply carrying a JSON value inline.
pub fn by_value(value: Value) -> Reply {
    let js_type = match &value {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        _ => "object",
    };
    result(json!({ "type": js_type, "value": value }))
}

/// `false` is what in-page routines return on success.
pub fn ok_routine() -> Reply {
    by_value(json!(false))
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageCall {
    SetViewport(Viewport),
    Screenshot(ScreenshotClip),
    MouseMove(f64, f64),
    MouseClick(f64, f64, MouseClickOptions),
    EnsureModifiers(Vec<KeyboardModifier>),
    Type(String),
    Press(String),
    InsertText(String),
}

#[derive(Default)]
pub struct MockPage {
    pub viewport: Mutex<Option<Viewport>>,
    pub modifiers: Mutex<Vec<KeyboardModifier>>,
    pub fail_screenshot: AtomicBool,
    pub fail_click: AtomicBool,
    pub javascript_disabled: AtomicBool,
    calls: Mutex<Vec<PageCall>>,
}

impl MockPage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_viewport(width: u32, height: u32) -> Arc<Self> {
        let page = Self::default();
        *page.viewport.lock() = Some(Viewport { width, height });
        Arc::new(page)
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: PageCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl PageDelegate for MockPage {
    fn viewport_size(&self) -> Option<Viewport> {
        *self.viewport.lock()
    }

    async fn set_viewport_size(&self, viewport: Viewport) -> Result<()> {
        self.record(PageCall::SetViewport(viewport));
        *self.viewport.lock() = Some(viewport);
        Ok(())
    }

    async fn screenshot(
        &self,
        clip: ScreenshotClip,
        _options: &ScreenshotOptions,
    ) -> Result<Vec<u8>> {
        self.record(PageCall::Screenshot(clip));
        if self.fail_screenshot.load(Ordering::SeqCst) {
            return Err(Error::ProtocolError("Unable to capture screenshot".into()));
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn mouse_move(&self, x: f64, y: f64, _steps: u32) -> Result<()> {
        self.record(PageCall::MouseMove(x, y));
        Ok(())
    }

    async fn mouse_click(&self, x: f64, y: f64, options: MouseClickOptions) -> Result<()> {
        self.record(PageCall::MouseClick(x, y, options));
        if self.fail_click.load(Ordering::SeqCst) {
            return Err(Error::ProtocolError("Target closed".into()));
        }
        Ok(())
    }

    async fn ensure_modifiers(
        &self,
        modifiers: &[KeyboardModifier],
    ) -> Result<Vec<KeyboardModifier>> {
        self.record(PageCall::EnsureModifiers(modifiers.to_vec()));
        let mut held = self.modifiers.lock();
        let previous = held.clone();
        *held = modifiers.to_vec();
        Ok(previous)
    }

    async fn keyboard_type(&self, text: &str, _delay: Option<f64>) -> Result<()> {
        self.record(PageCall::Type(text.to_string()));
        Ok(())
    }

    async fn keyboard_press(&self, key: &str, _delay: Option<f64>) -> Result<()> {
        self.record(PageCall::Press(key.to_string()));
        Ok(())
    }

    async fn insert_text(&self, text: &str) -> Result<()> {
        self.record(PageCall::InsertText(text.to_string()));
        Ok(())
    }

    fn javascript_enabled(&self) -> bool {
        !self.javascript_disabled.load(Ordering::SeqCst)
    }
}

/// Context id used by every fixture context.
pub const CONTEXT_ID: i64 = 7;

/// A frameless context (worker-like) over `session`.
pub fn context(session: &Arc<MockSession>) -> ExecutionContext {
    ExecutionContext::new(session.clone(), CONTEXT_ID, None)
}

/// A frame context over `session` whose page is `page`.
pub fn frame_context(session: &Arc<MockSession>, page: &Arc<MockPage>) -> ExecutionContext {
    let page = Page::new(page.clone());
    ExecutionContext::new(session.clone(), CONTEXT_ID, Some(Frame::new("main", &page)))
}
