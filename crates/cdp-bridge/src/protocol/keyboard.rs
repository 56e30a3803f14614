// Keyboard - Low-level keyboard control

use crate::error::Result;
use crate::protocol::action_options::{PressOptions, TypeOptions};
use crate::protocol::click::KeyboardModifier;
use crate::protocol::page::Page;

/// Keyboard provides low-level keyboard control.
#[derive(Clone)]
pub struct Keyboard {
    page: Page,
}

impl Keyboard {
    /// Creates a new Keyboard instance for the given page
    pub(crate) fn new(page: Page) -> Self {
        Self { page }
    }

    /// Executes a complete key press (down + up sequence).
    pub async fn press(&self, key: &str, options: Option<PressOptions>) -> Result<()> {
        let delay = options.and_then(|o| o.delay);
        self.page.delegate().keyboard_press(key, delay).await
    }

    /// Sends a `keydown`, `keypress`/`input`, and `keyup` event for each character.
    pub async fn type_text(&self, text: &str, options: Option<TypeOptions>) -> Result<()> {
        let delay = options.and_then(|o| o.delay);
        self.page.delegate().keyboard_type(text, delay).await
    }

    /// Dispatches only an `input` event, no `keydown`, `keyup` or `keypress`.
    pub async fn insert_text(&self, text: &str) -> Result<()> {
        self.page.delegate().insert_text(text).await
    }

    /// Holds exactly `modifiers`; returns what was held before so the caller
    /// can restore it.
    pub async fn ensure_modifiers(
        &self,
        modifiers: &[KeyboardModifier],
    ) -> Result<Vec<KeyboardModifier>> {
        self.page.delegate().ensure_modifiers(modifiers).await
    }
}
