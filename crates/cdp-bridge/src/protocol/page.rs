// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Page and Frame - the collaborators element handles act through
//
// Element handles never dispatch input or resize the viewport themselves.
// They reach the owning page through the `PageDelegate` trait, which the
// CDP page implements over a session and tests implement with scripts.
// Frames and element handles hold a `WeakPage`: whoever created the page
// owns it, and a closed page fails later actions with `ContextDestroyed`.

use crate::error::{Error, Result};
use crate::protocol::click::{KeyboardModifier, MouseClickOptions};
use crate::protocol::keyboard::Keyboard;
use crate::protocol::mouse::Mouse;
use crate::protocol::screenshot::{ScreenshotClip, ScreenshotOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Page-level operations an element handle depends on.
///
/// Coordinates are viewport-relative CSS pixels.
#[async_trait]
pub trait PageDelegate: Send + Sync {
    /// Emulated viewport, `None` when the page uses the window size.
    fn viewport_size(&self) -> Option<Viewport>;

    async fn set_viewport_size(&self, viewport: Viewport) -> Result<()>;

    /// Captures `clip` (page coordinates) and returns the encoded image.
    async fn screenshot(&self, clip: ScreenshotClip, options: &ScreenshotOptions)
    -> Result<Vec<u8>>;

    async fn mouse_move(&self, x: f64, y: f64, steps: u32) -> Result<()>;

    /// Move, then `click_count` press/release pairs.
    async fn mouse_click(&self, x: f64, y: f64, options: MouseClickOptions) -> Result<()>;

    /// Presses and releases modifier keys until exactly `modifiers` are held.
    /// Returns the modifiers that were held before.
    async fn ensure_modifiers(
        &self,
        modifiers: &[KeyboardModifier],
    ) -> Result<Vec<KeyboardModifier>>;

    async fn keyboard_type(&self, text: &str, delay: Option<f64>) -> Result<()>;

    async fn keyboard_press(&self, key: &str, delay: Option<f64>) -> Result<()>;

    /// Inserts text with a single `input` event, no key events.
    async fn insert_text(&self, text: &str) -> Result<()>;

    fn javascript_enabled(&self) -> bool {
        true
    }
}

/// A browser page as seen by element handles.
///
/// Cheap to clone; all clones drive the same delegate.
#[derive(Clone)]
pub struct Page {
    delegate: Arc<dyn PageDelegate>,
}

impl Page {
    pub fn new(delegate: Arc<dyn PageDelegate>) -> Self {
        Self { delegate }
    }

    /// Low-level mouse control.
    pub fn mouse(&self) -> Mouse {
        Mouse::new(self.clone())
    }

    /// Low-level keyboard control.
    pub fn keyboard(&self) -> Keyboard {
        Keyboard::new(self.clone())
    }

    pub fn viewport_size(&self) -> Option<Viewport> {
        self.delegate.viewport_size()
    }

    pub async fn set_viewport_size(&self, viewport: Viewport) -> Result<()> {
        self.delegate.set_viewport_size(viewport).await
    }

    pub async fn screenshot_clip(
        &self,
        clip: ScreenshotClip,
        options: &ScreenshotOptions,
    ) -> Result<Vec<u8>> {
        self.delegate.screenshot(clip, options).await
    }

    pub fn javascript_enabled(&self) -> bool {
        self.delegate.javascript_enabled()
    }

    pub(crate) fn delegate(&self) -> &dyn PageDelegate {
        self.delegate.as_ref()
    }

    /// A non-owning reference to this page.
    pub fn downgrade(&self) -> WeakPage {
        WeakPage {
            delegate: Arc::downgrade(&self.delegate),
        }
    }
}

/// Non-owning reference to a [`Page`].
#[derive(Clone)]
pub struct WeakPage {
    delegate: Weak<dyn PageDelegate>,
}

impl WeakPage {
    /// The page, or `ContextDestroyed` once its owner has dropped it.
    pub fn upgrade(&self) -> Result<Page> {
        self.delegate
            .upgrade()
            .map(|delegate| Page { delegate })
            .ok_or(Error::ContextDestroyed)
    }
}

impl std::fmt::Debug for WeakPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakPage")
            .field("alive", &(self.delegate.strong_count() > 0))
            .finish()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("viewport", &self.viewport_size())
            .finish()
    }
}

/// A frame of a page. Execution contexts created for a frame hand out
/// element handles bound to the frame's page.
///
/// The frame does not keep the page alive.
#[derive(Clone, Debug)]
pub struct Frame {
    id: Arc<str>,
    page: WeakPage,
}

impl Frame {
    pub fn new(id: impl AsRef<str>, page: &Page) -> Self {
        Self {
            id: Arc::from(id.as_ref()),
            page: page.downgrade(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The owning page, `ContextDestroyed` once it is gone.
    pub fn page(&self) -> Result<Page> {
        self.page.upgrade()
    }

    pub(crate) fn weak_page(&self) -> &WeakPage {
        &self.page
    }
}
