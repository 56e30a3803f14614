// Screenshot types and options
//
// Configuration for element screenshots and the clipped page capture they
// are built on.

use crate::protocol::geometry::BoundingBox;
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;

/// Screenshot image format
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::protocol::ScreenshotType;
///
/// let screenshot_type = ScreenshotType::Jpeg;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotType {
    /// PNG format (lossless, supports transparency)
    #[default]
    Png,
    /// JPEG format (lossy compression, smaller file size)
    Jpeg,
}

/// Clip region for a page capture, in page (document) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenshotClip {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<BoundingBox> for ScreenshotClip {
    fn from(bbox: BoundingBox) -> Self {
        Self {
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
        }
    }
}

/// Screenshot options
///
/// Passed through unchanged to the page capture.
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::protocol::{ScreenshotOptions, ScreenshotType};
///
/// let options = ScreenshotOptions::builder()
///     .screenshot_type(ScreenshotType::Jpeg)
///     .quality(80)
///     .path("element.jpg")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScreenshotOptions {
    /// Image format (png or jpeg)
    pub screenshot_type: Option<ScreenshotType>,
    /// JPEG quality (0-100), only applies to jpeg format
    pub quality: Option<u8>,
    /// Hide default white background (PNG only)
    pub omit_background: Option<bool>,
    /// Also write the image to this file
    pub path: Option<PathBuf>,
}

impl ScreenshotOptions {
    /// Create a new builder for ScreenshotOptions
    pub fn builder() -> ScreenshotOptionsBuilder {
        ScreenshotOptionsBuilder::default()
    }

    /// Parameters of `Page.captureScreenshot` for `clip`.
    pub(crate) fn capture_params(&self, clip: ScreenshotClip) -> Value {
        let format = self.screenshot_type.unwrap_or_default();
        let mut params = json!({
            "format": format,
            "clip": {
                "x": clip.x,
                "y": clip.y,
                "width": clip.width,
                "height": clip.height,
                "scale": 1,
            },
        });

        if format == ScreenshotType::Jpeg {
            if let Some(quality) = self.quality {
                params["quality"] = json!(quality);
            }
        }

        params
    }

    pub(crate) fn omits_background(&self) -> bool {
        self.omit_background.unwrap_or(false)
            && self.screenshot_type.unwrap_or_default() == ScreenshotType::Png
    }
}

/// Builder for ScreenshotOptions
#[derive(Debug, Clone, Default)]
pub struct ScreenshotOptionsBuilder {
    screenshot_type: Option<ScreenshotType>,
    quality: Option<u8>,
    omit_background: Option<bool>,
    path: Option<PathBuf>,
}

impl ScreenshotOptionsBuilder {
    /// Set the screenshot format (png or jpeg)
    pub fn screenshot_type(mut self, screenshot_type: ScreenshotType) -> Self {
        self.screenshot_type = Some(screenshot_type);
        self
    }

    /// Set JPEG quality (0-100)
    ///
    /// Only applies when screenshot_type is Jpeg.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Hide default white background (creates transparent PNG)
    pub fn omit_background(mut self, omit_background: bool) -> Self {
        self.omit_background = Some(omit_background);
        self
    }

    /// Save the image to a file as well as returning it
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Build the ScreenshotOptions
    pub fn build(self) -> ScreenshotOptions {
        ScreenshotOptions {
            screenshot_type: self.screenshot_type,
            quality: self.quality,
            omit_background: self.omit_background,
            path: self.path,
        }
    }
}
