// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// CdpPage - PageDelegate over a DevTools session
//
// Input goes out as `Input.dispatchMouseEvent` / `Input.dispatchKeyEvent`.
// The page tracks which modifiers are held, where the mouse is and the
// emulated viewport, because every input event has to carry that state.

use crate::error::{Error, Result};
use crate::protocol::click::{KeyboardModifier, MouseButton, MouseClickOptions};
use crate::protocol::geometry::Point;
use crate::protocol::key_definitions::{KeyDescription, describe_key};
use crate::protocol::page::{PageDelegate, Viewport};
use crate::protocol::screenshot::{ScreenshotClip, ScreenshotOptions};
use crate::server::channel::Channel;
use crate::server::session::SessionLike;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct InputState {
    viewport: Option<Viewport>,
    modifiers: Vec<KeyboardModifier>,
    mouse: Point,
    pressed_button: Option<MouseButton>,
}

impl InputState {
    fn modifier_mask(&self) -> i64 {
        self.modifiers.iter().fold(0, |mask, m| mask | m.mask())
    }
}

/// A page driven directly over the DevTools protocol.
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::protocol::{CdpPage, Frame, Page};
/// use std::sync::Arc;
///
/// let session = Arc::new(connection.attach_to_target(&target_id).await?);
/// let page = Page::new(Arc::new(CdpPage::new(session)));
/// let frame = Frame::new(&target_id, &page);
/// ```
pub struct CdpPage {
    channel: Channel,
    state: Mutex<InputState>,
    javascript_enabled: AtomicBool,
}

impl CdpPage {
    pub fn new(session: Arc<dyn SessionLike>) -> Self {
        Self {
            channel: Channel::new(session),
            state: Mutex::new(InputState::default()),
            javascript_enabled: AtomicBool::new(true),
        }
    }

    /// Enables or disables script execution in the page.
    pub async fn set_javascript_enabled(&self, enabled: bool) -> Result<()> {
        self.channel
            .send_no_result(
                "Emulation.setScriptExecutionDisabled",
                json!({ "value": !enabled }),
            )
            .await?;
        self.javascript_enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    /// Modifiers currently held.
    pub fn modifiers(&self) -> Vec<KeyboardModifier> {
        self.state.lock().modifiers.clone()
    }

    fn describe(key: &str) -> Result<KeyDescription> {
        describe_key(key).ok_or_else(|| Error::InvalidArgument(format!("Unknown key: \"{}\"", key)))
    }

    async fn key_down(&self, key: &str) -> Result<()> {
        let description = Self::describe(key)?;
        let modifiers = {
            let mut state = self.state.lock();
            if let Some(modifier) = KeyboardModifier::from_key(&description.key) {
                if !state.modifiers.contains(&modifier) {
                    state.modifiers.push(modifier);
                }
            }
            state.modifier_mask()
        };

        let event_type = if description.text.is_some() {
            "keyDown"
        } else {
            "rawKeyDown"
        };
        self.channel
            .send_no_result(
                "Input.dispatchKeyEvent",
                json!({
                    "type": event_type,
                    "modifiers": modifiers,
                    "windowsVirtualKeyCode": description.key_code,
                    "code": description.code,
                    "key": description.key,
                    "text": description.text,
                    "unmodifiedText": description.text,
                    "autoRepeat": false,
                    "location": description.location,
                    "isKeypad": description.location == 3,
                }),
            )
            .await
    }

    async fn key_up(&self, key: &str) -> Result<()> {
        let description = Self::describe(key)?;
        let modifiers = {
            let mut state = self.state.lock();
            if let Some(modifier) = KeyboardModifier::from_key(&description.key) {
                state.modifiers.retain(|m| *m != modifier);
            }
            state.modifier_mask()
        };

        self.channel
            .send_no_result(
                "Input.dispatchKeyEvent",
                json!({
                    "type": "keyUp",
                    "modifiers": modifiers,
                    "key": description.key,
                    "windowsVirtualKeyCode": description.key_code,
                    "code": description.code,
                    "location": description.location,
                }),
            )
            .await
    }

    async fn dispatch_mouse(
        &self,
        event_type: &str,
        point: Point,
        button: Option<MouseButton>,
        click_count: u32,
    ) -> Result<()> {
        let modifiers = self.state.lock().modifier_mask();
        let button_name = match button {
            Some(MouseButton::Left) => "left",
            Some(MouseButton::Right) => "right",
            Some(MouseButton::Middle) => "middle",
            None => "none",
        };
        let buttons = button.map(MouseButton::buttons_mask).unwrap_or(0);
        self.channel
            .send_no_result(
                "Input.dispatchMouseEvent",
                json!({
                    "type": event_type,
                    "x": point.x,
                    "y": point.y,
                    "button": button_name,
                    "buttons": buttons,
                    "clickCount": click_count,
                    "modifiers": modifiers,
                }),
            )
            .await
    }
}

async fn pause(delay: Option<f64>) {
    if let Some(ms) = delay.filter(|ms| *ms > 0.0) {
        tokio::time::sleep(Duration::from_secs_f64(ms / 1000.0)).await;
    }
}

#[async_trait]
impl PageDelegate for CdpPage {
    fn viewport_size(&self) -> Option<Viewport> {
        self.state.lock().viewport
    }

    async fn set_viewport_size(&self, viewport: Viewport) -> Result<()> {
        self.channel
            .send_no_result(
                "Emulation.setDeviceMetricsOverride",
                json!({
                    "width": viewport.width,
                    "height": viewport.height,
                    "deviceScaleFactor": 1,
                    "mobile": false,
                }),
            )
            .await?;
        self.state.lock().viewport = Some(viewport);
        Ok(())
    }

    async fn screenshot(
        &self,
        clip: ScreenshotClip,
        options: &ScreenshotOptions,
    ) -> Result<Vec<u8>> {
        #[derive(Deserialize)]
        struct CaptureResponse {
            data: String,
        }

        let transparent = options.omits_background();
        if transparent {
            self.channel
                .send_no_result(
                    "Emulation.setDefaultBackgroundColorOverride",
                    json!({ "color": { "r": 0, "g": 0, "b": 0, "a": 0 } }),
                )
                .await?;
        }

        let response = self
            .channel
            .send::<_, CaptureResponse>("Page.captureScreenshot", options.capture_params(clip))
            .await;

        if transparent {
            if let Err(e) = self
                .channel
                .send_no_result("Emulation.setDefaultBackgroundColorOverride", json!({}))
                .await
            {
                tracing::warn!("Failed to reset background override: {}", e);
            }
        }

        BASE64.decode(response?.data).map_err(|e| {
            Error::ProtocolError(format!("Failed to decode screenshot: {}", e))
        })
    }

    async fn mouse_move(&self, x: f64, y: f64, steps: u32) -> Result<()> {
        let (from, button) = {
            let state = self.state.lock();
            (state.mouse, state.pressed_button)
        };
        let steps = steps.max(1);
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            let point = Point::new(from.x + (x - from.x) * t, from.y + (y - from.y) * t);
            self.dispatch_mouse("mouseMoved", point, button, 0).await?;
        }
        self.state.lock().mouse = Point::new(x, y);
        Ok(())
    }

    async fn mouse_click(&self, x: f64, y: f64, options: MouseClickOptions) -> Result<()> {
        self.mouse_move(x, y, 1).await?;
        let point = Point::new(x, y);
        for click_count in 1..=options.click_count.max(1) {
            self.state.lock().pressed_button = Some(options.button);
            self.dispatch_mouse("mousePressed", point, Some(options.button), click_count)
                .await?;
            pause(options.delay).await;
            self.state.lock().pressed_button = None;
            self.dispatch_mouse("mouseReleased", point, Some(options.button), click_count)
                .await?;
        }
        Ok(())
    }

    async fn ensure_modifiers(
        &self,
        modifiers: &[KeyboardModifier],
    ) -> Result<Vec<KeyboardModifier>> {
        let previous = self.modifiers();
        for modifier in KeyboardModifier::ALL {
            let held = previous.contains(&modifier);
            let wanted = modifiers.contains(&modifier);
            if wanted && !held {
                self.key_down(modifier.key()).await?;
            } else if held && !wanted {
                self.key_up(modifier.key()).await?;
            }
        }
        Ok(previous)
    }

    async fn keyboard_type(&self, text: &str, delay: Option<f64>) -> Result<()> {
        let mut buffer = [0u8; 4];
        for ch in text.chars() {
            let key = ch.encode_utf8(&mut buffer);
            if describe_key(key).is_some() {
                self.keyboard_press(key, delay).await?;
            } else {
                pause(delay).await;
                self.insert_text(key).await?;
            }
        }
        Ok(())
    }

    async fn keyboard_press(&self, key: &str, delay: Option<f64>) -> Result<()> {
        self.key_down(key).await?;
        pause(delay).await;
        self.key_up(key).await
    }

    async fn insert_text(&self, text: &str) -> Result<()> {
        self.channel
            .send_no_result("Input.insertText", json!({ "text": text }))
            .await
    }

    fn javascript_enabled(&self) -> bool {
        self.javascript_enabled.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for CdpPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpPage")
            .field("state", &*self.state.lock())
            .field("javascript_enabled", &self.javascript_enabled())
            .finish()
    }
}
