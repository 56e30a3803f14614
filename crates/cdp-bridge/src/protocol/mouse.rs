// Mouse - Low-level mouse control

use crate::error::Result;
use crate::protocol::action_options::MouseMoveOptions;
use crate::protocol::click::MouseClickOptions;
use crate::protocol::page::Page;

/// Mouse provides low-level mouse control.
///
/// Coordinates are in CSS pixels relative to the viewport's top-left corner.
#[derive(Clone)]
pub struct Mouse {
    page: Page,
}

impl Mouse {
    /// Creates a new Mouse instance for the given page
    pub(crate) fn new(page: Page) -> Self {
        Self { page }
    }

    /// Dispatches `mousemove` events ending at `(x, y)`.
    pub async fn move_to(&self, x: f64, y: f64, options: Option<MouseMoveOptions>) -> Result<()> {
        let steps = options.unwrap_or_default().steps();
        self.page.delegate().mouse_move(x, y, steps).await
    }

    /// Moves to `(x, y)` and clicks `click_count` times.
    pub async fn click(&self, x: f64, y: f64, options: Option<MouseClickOptions>) -> Result<()> {
        self.page
            .delegate()
            .mouse_click(x, y, options.unwrap_or_default())
            .await
    }

    /// Click with a click count of 2.
    pub async fn dblclick(&self, x: f64, y: f64, options: Option<MouseClickOptions>) -> Result<()> {
        self.click_times(x, y, options, 2).await
    }

    /// Click with a click count of 3.
    pub async fn tripleclick(
        &self,
        x: f64,
        y: f64,
        options: Option<MouseClickOptions>,
    ) -> Result<()> {
        self.click_times(x, y, options, 3).await
    }

    async fn click_times(
        &self,
        x: f64,
        y: f64,
        options: Option<MouseClickOptions>,
        click_count: u32,
    ) -> Result<()> {
        let options = MouseClickOptions {
            click_count,
            ..options.unwrap_or_default()
        };
        self.page.delegate().mouse_click(x, y, options).await
    }
}
