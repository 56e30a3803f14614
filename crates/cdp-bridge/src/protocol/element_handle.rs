// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// ElementHandle - a handle to a DOM node
//
// Adds geometry and input on top of JsHandle. Pointer actions run in a
// fixed order: scroll into view, measure, apply modifiers, act. Each step
// can observe page state changed by the previous one, so nothing here is
// reordered or batched. The content quads and layout metrics queries are
// the only requests issued concurrently.

use crate::error::{Error, Result};
use crate::protocol::action_options::{PressOptions, TypeOptions};
use crate::protocol::click::{ClickOptions, HoverOptions, KeyboardModifier, MouseClickOptions};
use crate::protocol::evaluate_conversion::{EvaluateArg, JsValue};
use crate::protocol::execution_context::ExecutionContext;
use crate::protocol::file_payload::InputFile;
use crate::protocol::geometry::{self, BoundingBox, Point, ResolvedPoint};
use crate::protocol::injected;
use crate::protocol::js_handle::{Handle, JsHandle};
use crate::protocol::page::{Page, Viewport, WeakPage};
use crate::protocol::remote_object::{
    BoxModel, BoxModelResponse, ContentQuadsResponse, DescribeNodeResponse, LayoutMetrics,
};
use crate::protocol::screenshot::{ScreenshotClip, ScreenshotOptions};
use crate::protocol::select_option::SelectOption;
use serde_json::{Value, json};
use std::ops::Deref;

/// The low-level gesture a pointer action ends with.
#[derive(Debug, Clone, Copy)]
enum PointerAction {
    Hover,
    Click(MouseClickOptions),
    DoubleClick(MouseClickOptions),
    TripleClick(MouseClickOptions),
}

/// ElementHandle represents a DOM element in the page.
///
/// Element handles are produced by evaluation in a frame's execution
/// context whenever the result is a DOM node, and by the query methods.
/// All [`JsHandle`] methods are available through `Deref`.
#[derive(Clone)]
pub struct ElementHandle {
    handle: JsHandle,
    page: WeakPage,
}

impl ElementHandle {
    pub(crate) fn new(handle: JsHandle, page: WeakPage) -> Self {
        Self { handle, page }
    }

    pub fn as_js_handle(&self) -> &JsHandle {
        &self.handle
    }

    /// The page this element belongs to, `ContextDestroyed` once it is
    /// closed.
    pub fn page(&self) -> Result<Page> {
        self.page.upgrade()
    }

    fn context(&self) -> Result<ExecutionContext> {
        self.handle.live_context()
    }

    fn object_id(&self) -> Result<&str> {
        self.handle
            .remote_object()
            .object_id
            .as_deref()
            .ok_or_else(|| Error::ProtocolError("Element handle without an object id".into()))
    }

    /// Runs a routine that returns a message string on refusal.
    async fn call_checked(&self, function: &str, args: &[EvaluateArg]) -> Result<JsValue> {
        match self.handle.evaluate(function, args).await? {
            JsValue::String(message) => Err(Error::ElementState(message)),
            value => Ok(value),
        }
    }

    /// Frame id of an `<iframe>` element's content, `None` for other nodes.
    pub async fn content_frame_id(&self) -> Result<Option<String>> {
        let context = self.context()?;
        let response: DescribeNodeResponse = context
            .channel()
            .send("DOM.describeNode", json!({ "objectId": self.object_id()? }))
            .await
            .map_err(|e| context.map_context_error(e))?;
        Ok(response.node.frame_id)
    }

    /// Scrolls the element to the viewport center unless it is fully visible.
    pub async fn scroll_into_view_if_needed(&self) -> Result<()> {
        self.visibility(true).await?;
        Ok(())
    }

    /// Whether any part of the element intersects the viewport.
    pub async fn is_intersecting_viewport(&self) -> Result<bool> {
        let ratio = self.visibility(false).await?;
        Ok(ratio.as_f64().is_some_and(|ratio| ratio > 0.0))
    }

    async fn visibility(&self, scroll: bool) -> Result<JsValue> {
        let javascript_enabled = self.page()?.javascript_enabled();
        self.call_checked(
            injected::SCROLL_INTO_VIEW_IF_NEEDED,
            &[EvaluateArg::from(javascript_enabled), EvaluateArg::from(scroll)],
        )
        .await
    }

    /// Center of the first content quad that is visible in the viewport.
    pub async fn clickable_point(&self) -> Result<Point> {
        let context = self.context()?;
        let channel = context.channel();
        let object_id = self.object_id()?;

        let (quads, metrics) = tokio::join!(
            channel.send::<_, ContentQuadsResponse>(
                "DOM.getContentQuads",
                json!({ "objectId": object_id }),
            ),
            channel.send_no_params::<LayoutMetrics>("Page.getLayoutMetrics"),
        );

        let quads = match quads {
            Ok(response) if !response.quads.is_empty() => response.quads,
            Ok(_) => return Err(Error::not_visible()),
            Err(e) => {
                tracing::debug!("DOM.getContentQuads failed: {}", e);
                return Err(Error::not_visible());
            }
        };
        let viewport = metrics.map_err(|e| context.map_context_error(e))?.viewport();

        geometry::clickable_point(&quads, viewport.client_width, viewport.client_height)
            .ok_or_else(Error::not_visible)
    }

    /// Box model of the node, `None` when the browser cannot provide one.
    async fn box_model(&self) -> Result<Option<BoxModel>> {
        let context = self.context()?;
        let result = context
            .channel()
            .send::<_, BoxModelResponse>("DOM.getBoxModel", json!({ "objectId": self.object_id()? }))
            .await;
        match result {
            Ok(response) => Ok(Some(response.model)),
            Err(e) => {
                tracing::debug!("DOM.getBoxModel failed: {}", e);
                Ok(None)
            }
        }
    }

    /// Translates an offset from the padding box corner into the viewport.
    pub async fn resolve_relative_point(&self, relative: Point) -> Result<ResolvedPoint> {
        let model = self.box_model().await?;
        let context = self.context()?;
        let viewport = context
            .channel()
            .send_no_params::<LayoutMetrics>("Page.getLayoutMetrics")
            .await
            .map_err(|e| context.map_context_error(e))?
            .viewport();
        Ok(geometry::resolve_relative_point(
            model.as_ref().map(|m| m.padding.as_slice()),
            relative,
            viewport.client_width,
            viewport.client_height,
        ))
    }

    async fn action_point(&self, position: Option<Point>) -> Result<Point> {
        let Some(relative) = position else {
            return self.clickable_point().await;
        };

        let resolved = self.resolve_relative_point(relative).await?;
        if !resolved.needs_scroll() {
            return Ok(resolved.point);
        }

        tracing::debug!(
            "Scrolling by ({}, {}) to reach relative point",
            resolved.scroll_x,
            resolved.scroll_y
        );
        self.handle
            .evaluate(
                injected::SCROLL_BY,
                &[
                    EvaluateArg::from(resolved.scroll_x),
                    EvaluateArg::from(resolved.scroll_y),
                ],
            )
            .await?;

        let retried = self.resolve_relative_point(relative).await?;
        if retried.needs_scroll() {
            return Err(Error::ScrollFailure);
        }
        Ok(retried.point)
    }

    async fn perform_pointer_action(
        &self,
        action: PointerAction,
        position: Option<Point>,
        modifiers: Option<&[KeyboardModifier]>,
    ) -> Result<()> {
        self.scroll_into_view_if_needed().await?;
        let point = self.action_point(position).await?;

        let keyboard = self.page()?.keyboard();
        let restore = match modifiers {
            Some(modifiers) => Some(keyboard.ensure_modifiers(modifiers).await?),
            None => None,
        };

        let mouse = self.page()?.mouse();
        match action {
            PointerAction::Hover => mouse.move_to(point.x, point.y, None).await?,
            PointerAction::Click(options) => mouse.click(point.x, point.y, Some(options)).await?,
            PointerAction::DoubleClick(options) => {
                mouse.dblclick(point.x, point.y, Some(options)).await?
            }
            PointerAction::TripleClick(options) => {
                mouse.tripleclick(point.x, point.y, Some(options)).await?
            }
        }

        // Only reached when the action succeeded
        if let Some(previous) = restore {
            keyboard.ensure_modifiers(&previous).await?;
        }
        Ok(())
    }

    /// Moves the mouse over the element.
    pub async fn hover(&self, options: Option<HoverOptions>) -> Result<()> {
        let options = options.unwrap_or_default();
        self.perform_pointer_action(
            PointerAction::Hover,
            options.position,
            options.modifiers.as_deref(),
        )
        .await
    }

    /// Clicks the element.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use cdp_bridge::protocol::{ClickOptions, MouseButton};
    ///
    /// element.click(None).await?;
    /// element
    ///     .click(Some(ClickOptions::builder().button(MouseButton::Right).build()))
    ///     .await?;
    /// ```
    pub async fn click(&self, options: Option<ClickOptions>) -> Result<()> {
        let options = options.unwrap_or_default();
        self.perform_pointer_action(
            PointerAction::Click(options.mouse_options()),
            options.position,
            options.modifiers.as_deref(),
        )
        .await
    }

    /// Double-clicks the element.
    pub async fn dblclick(&self, options: Option<ClickOptions>) -> Result<()> {
        let options = options.unwrap_or_default();
        self.perform_pointer_action(
            PointerAction::DoubleClick(options.mouse_options()),
            options.position,
            options.modifiers.as_deref(),
        )
        .await
    }

    /// Triple-clicks the element (selects a paragraph of text).
    pub async fn tripleclick(&self, options: Option<ClickOptions>) -> Result<()> {
        let options = options.unwrap_or_default();
        self.perform_pointer_action(
            PointerAction::TripleClick(options.mouse_options()),
            options.position,
            options.modifiers.as_deref(),
        )
        .await
    }

    /// Selects options of a `<select>` element and returns the values that
    /// ended up selected.
    ///
    /// ```ignore
    /// use cdp_bridge::protocol::SelectOption;
    ///
    /// let selected = element
    ///     .select_option(vec!["blue".into(), SelectOption::index(2)])
    ///     .await?;
    /// ```
    pub async fn select_option(
        &self,
        options: impl IntoIterator<Item = SelectOption>,
    ) -> Result<Vec<String>> {
        let mut descriptors = Vec::new();
        let mut elements = Vec::new();
        for option in options {
            match option {
                SelectOption::Element(element) => elements.push(EvaluateArg::from(&element)),
                other => descriptors.extend(other.to_json()),
            }
        }

        let mut args = vec![EvaluateArg::from(Value::Array(descriptors))];
        args.extend(elements);

        self.call_checked(injected::SELECT_OPTIONS, &args)
            .await?
            .deserialize_into()
    }

    /// Clears the element and inserts `value` through the keyboard.
    pub async fn fill(&self, value: &str) -> Result<()> {
        self.call_checked(injected::FILL_PRECONDITION, &[EvaluateArg::from(value)])
            .await?;

        let keyboard = self.page()?.keyboard();
        if value.is_empty() {
            keyboard.press("Delete", None).await
        } else {
            keyboard.insert_text(value).await
        }
    }

    /// Replaces the files of an `<input type=file>` element.
    pub async fn set_input_files(&self, files: Vec<InputFile>) -> Result<()> {
        let multiple = self
            .call_checked(injected::FILE_INPUT_MULTIPLE, &[])
            .await?
            .as_bool()
            .unwrap_or(false);
        if !multiple && files.len() > 1 {
            return Err(Error::MultipleFileInput);
        }

        let payloads =
            futures_util::future::try_join_all(files.iter().map(InputFile::load)).await?;
        let payloads = payloads.iter().map(|p| p.to_json()).collect::<Vec<_>>();

        self.call_checked(
            injected::SET_INPUT_FILES,
            &[EvaluateArg::from(Value::Array(payloads))],
        )
        .await?;
        Ok(())
    }

    /// Focuses the element.
    pub async fn focus(&self) -> Result<()> {
        self.call_checked(injected::FOCUS, &[]).await?;
        Ok(())
    }

    /// Focuses the element, then types `text` key by key.
    pub async fn type_text(&self, text: &str, options: Option<TypeOptions>) -> Result<()> {
        self.focus().await?;
        self.page()?.keyboard().type_text(text, options).await
    }

    /// Focuses the element, then presses `key` (`"Enter"`, `"a"`, ...).
    pub async fn press(&self, key: &str, options: Option<PressOptions>) -> Result<()> {
        self.focus().await?;
        self.page()?.keyboard().press(key, options).await
    }

    /// Border box in viewport coordinates, `None` without a box model.
    pub async fn bounding_box(&self) -> Result<Option<BoundingBox>> {
        Ok(self
            .box_model()
            .await?
            .and_then(|model| geometry::bounding_box(&model.border)))
    }

    async fn visible_bounding_box(&self) -> Result<BoundingBox> {
        let bbox = self.bounding_box().await?.ok_or_else(Error::not_visible)?;
        if bbox.width == 0.0 {
            return Err(Error::Visibility("Node has 0 width.".into()));
        }
        if bbox.height == 0.0 {
            return Err(Error::Visibility("Node has 0 height.".into()));
        }
        Ok(bbox)
    }

    /// Captures the element's area of the page.
    ///
    /// A viewport smaller than the element is enlarged for the capture and
    /// restored afterwards, whether or not the capture succeeded.
    pub async fn screenshot(&self, options: Option<ScreenshotOptions>) -> Result<Vec<u8>> {
        let options = options.unwrap_or_default();
        let bbox = self.visible_bounding_box().await?;
        let page = self.page()?;

        let mut original_viewport = None;
        if let Some(viewport) = page.viewport_size() {
            if bbox.width > viewport.width as f64 || bbox.height > viewport.height as f64 {
                let enlarged = Viewport {
                    width: viewport.width.max(bbox.width.ceil() as u32),
                    height: viewport.height.max(bbox.height.ceil() as u32),
                };
                page.set_viewport_size(enlarged).await?;
                original_viewport = Some(viewport);
            }
        }

        let result = self.capture(&page, &options).await;

        if let Some(viewport) = original_viewport {
            if let Err(e) = page.set_viewport_size(viewport).await {
                tracing::warn!("Failed to restore viewport after screenshot: {}", e);
                if result.is_ok() {
                    return Err(e);
                }
            }
        }

        let bytes = result?;
        if let Some(path) = &options.path {
            tokio::fs::write(path, &bytes).await?;
        }
        Ok(bytes)
    }

    async fn capture(&self, page: &Page, options: &ScreenshotOptions) -> Result<Vec<u8>> {
        self.scroll_into_view_if_needed().await?;
        let bbox = self.visible_bounding_box().await?;

        let context = self.context()?;
        let metrics: LayoutMetrics = context
            .channel()
            .send_no_params("Page.getLayoutMetrics")
            .await?;
        let viewport = metrics.viewport();

        let clip = ScreenshotClip {
            x: bbox.x + viewport.page_x,
            y: bbox.y + viewport.page_y,
            width: bbox.width,
            height: bbox.height,
        };
        page.screenshot_clip(clip, options).await
    }

    /// First element under this one matching a CSS selector (`$`).
    pub async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>> {
        let handle = self
            .handle
            .evaluate_handle(injected::QUERY_SELECTOR, &[EvaluateArg::from(selector)])
            .await?;
        match handle {
            Handle::Element(element) => Ok(Some(element)),
            other => {
                other.dispose().await;
                Ok(None)
            }
        }
    }

    /// Every element under this one matching a CSS selector (`$$`).
    pub async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        self.query_elements(injected::QUERY_SELECTOR_ALL, selector)
            .await
    }

    /// Every node under this one matching an XPath expression (`$x`).
    pub async fn query_xpath(&self, expression: &str) -> Result<Vec<ElementHandle>> {
        self.query_elements(injected::QUERY_XPATH, expression).await
    }

    async fn query_elements(&self, function: &str, query: &str) -> Result<Vec<ElementHandle>> {
        let array = self
            .handle
            .evaluate_handle(function, &[EvaluateArg::from(query)])
            .await?;
        let properties = array.as_js_handle().get_properties().await;
        array.dispose().await;

        let mut elements = Vec::new();
        for (_, property) in properties? {
            match property {
                Handle::Element(element) => elements.push(element),
                other => other.dispose().await,
            }
        }
        Ok(elements)
    }

    /// Runs `function` with the first match of `selector` (`$eval`).
    ///
    /// ```ignore
    /// let href = element.eval_on_selector("a", "a => a.href", &[]).await?;
    /// ```
    pub async fn eval_on_selector(
        &self,
        selector: &str,
        function: &str,
        args: &[EvaluateArg],
    ) -> Result<JsValue> {
        let element = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))?;
        let result = element.evaluate(function, args).await;
        element.dispose().await;
        result
    }

    /// Runs `function` with an array of all matches of `selector` (`$$eval`).
    pub async fn eval_on_selector_all(
        &self,
        selector: &str,
        function: &str,
        args: &[EvaluateArg],
    ) -> Result<JsValue> {
        let array = self
            .handle
            .evaluate_handle(injected::QUERY_SELECTOR_ALL, &[EvaluateArg::from(selector)])
            .await?;
        let result = array.as_js_handle().evaluate(function, args).await;
        array.dispose().await;
        result
    }
}

impl Deref for ElementHandle {
    type Target = JsHandle;

    fn deref(&self) -> &JsHandle {
        &self.handle
    }
}

impl PartialEq for ElementHandle {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.handle, f)
    }
}

impl std::fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementHandle")
            .field("object_id", &self.handle.remote_object().object_id)
            .field("disposed", &self.handle.is_disposed())
            .finish()
    }
}
