// Click and hover options and related types
//
// Configuration for pointer actions performed on element handles.

use crate::protocol::geometry::Point;
use serde::Serialize;

/// Mouse button for click actions
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::protocol::click::MouseButton;
///
/// let button = MouseButton::Right;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Left mouse button (default)
    #[default]
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

impl MouseButton {
    /// Bit of the button in the DOM `buttons` mask.
    pub(crate) fn buttons_mask(self) -> i64 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 4,
        }
    }
}

/// Keyboard modifier keys
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::protocol::click::KeyboardModifier;
///
/// let modifiers = vec![KeyboardModifier::Shift, KeyboardModifier::Control];
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyboardModifier {
    /// Alt key
    Alt,
    /// Control key
    Control,
    /// Meta key (Command on macOS, Windows key on Windows)
    Meta,
    /// Shift key
    Shift,
}

impl KeyboardModifier {
    pub const ALL: [KeyboardModifier; 4] = [
        KeyboardModifier::Alt,
        KeyboardModifier::Control,
        KeyboardModifier::Meta,
        KeyboardModifier::Shift,
    ];

    /// Key name dispatched when the modifier is pressed or released.
    pub fn key(self) -> &'static str {
        match self {
            KeyboardModifier::Alt => "Alt",
            KeyboardModifier::Control => "Control",
            KeyboardModifier::Meta => "Meta",
            KeyboardModifier::Shift => "Shift",
        }
    }

    /// Bit of the modifier in the `Input.dispatch*Event` mask.
    pub(crate) fn mask(self) -> i64 {
        match self {
            KeyboardModifier::Alt => 1,
            KeyboardModifier::Control => 2,
            KeyboardModifier::Meta => 4,
            KeyboardModifier::Shift => 8,
        }
    }

    pub(crate) fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }
}

/// Options handed to the mouse for a single click gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseClickOptions {
    pub button: MouseButton,
    pub click_count: u32,
    /// Milliseconds between mousedown and mouseup
    pub delay: Option<f64>,
}

impl Default for MouseClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            click_count: 1,
            delay: None,
        }
    }
}

/// Click options
///
/// Configuration options for click, dblclick and tripleclick.
///
/// # Example
///
/// ```ignore
/// use cdp_bridge::protocol::click::{ClickOptions, MouseButton, KeyboardModifier};
/// use cdp_bridge::protocol::geometry::Point;
///
/// // Right-click with modifiers
/// let options = ClickOptions::builder()
///     .button(MouseButton::Right)
///     .modifiers(vec![KeyboardModifier::Shift])
///     .build();
///
/// // Click at an offset from the padding box corner
/// let options = ClickOptions::builder()
///     .position(Point::new(10.0, 20.0))
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClickOptions {
    /// Mouse button to click (left, right, middle)
    pub button: Option<MouseButton>,
    /// Number of clicks (for multi-click)
    pub click_count: Option<u32>,
    /// Time to wait between mousedown and mouseup in milliseconds
    pub delay: Option<f64>,
    /// Modifier keys to hold during the click
    pub modifiers: Option<Vec<KeyboardModifier>>,
    /// Position relative to the element's padding box top-left corner
    pub position: Option<Point>,
}

impl ClickOptions {
    /// Create a new builder for ClickOptions
    pub fn builder() -> ClickOptionsBuilder {
        ClickOptionsBuilder::default()
    }

    pub(crate) fn mouse_options(&self) -> MouseClickOptions {
        MouseClickOptions {
            button: self.button.unwrap_or_default(),
            click_count: self.click_count.unwrap_or(1),
            delay: self.delay,
        }
    }
}

/// Builder for ClickOptions
#[derive(Debug, Clone, Default)]
pub struct ClickOptionsBuilder {
    button: Option<MouseButton>,
    click_count: Option<u32>,
    delay: Option<f64>,
    modifiers: Option<Vec<KeyboardModifier>>,
    position: Option<Point>,
}

impl ClickOptionsBuilder {
    /// Set the mouse button to click
    pub fn button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    /// Set the number of clicks
    pub fn click_count(mut self, click_count: u32) -> Self {
        self.click_count = Some(click_count);
        self
    }

    /// Set delay between mousedown and mouseup in milliseconds
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set modifier keys to hold during the click
    pub fn modifiers(mut self, modifiers: Vec<KeyboardModifier>) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    /// Set position relative to the element's padding box
    pub fn position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Build the ClickOptions
    pub fn build(self) -> ClickOptions {
        ClickOptions {
            button: self.button,
            click_count: self.click_count,
            delay: self.delay,
            modifiers: self.modifiers,
            position: self.position,
        }
    }
}

/// Hover options
///
/// ```ignore
/// use cdp_bridge::protocol::click::{HoverOptions, KeyboardModifier};
///
/// let options = HoverOptions::builder()
///     .modifiers(vec![KeyboardModifier::Alt])
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct HoverOptions {
    /// Modifier keys to hold while hovering
    pub modifiers: Option<Vec<KeyboardModifier>>,
    /// Position relative to the element's padding box top-left corner
    pub position: Option<Point>,
}

impl HoverOptions {
    pub fn builder() -> HoverOptionsBuilder {
        HoverOptionsBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HoverOptionsBuilder {
    modifiers: Option<Vec<KeyboardModifier>>,
    position: Option<Point>,
}

impl HoverOptionsBuilder {
    pub fn modifiers(mut self, modifiers: Vec<KeyboardModifier>) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    pub fn position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn build(self) -> HoverOptions {
        HoverOptions {
            modifiers: self.modifiers,
            position: self.position,
        }
    }
}
