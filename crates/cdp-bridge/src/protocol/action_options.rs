// Action options for keyboard and mouse-move actions
//
// Provides configuration for type(), press() and low-level mouse moves.

/// Type options
///
/// Configuration options for type() on an element or the keyboard.
#[derive(Debug, Clone, Default)]
pub struct TypeOptions {
    /// Time to wait between key presses in milliseconds
    pub delay: Option<f64>,
}

impl TypeOptions {
    /// Create a new builder for TypeOptions
    pub fn builder() -> TypeOptionsBuilder {
        TypeOptionsBuilder::default()
    }
}

/// Builder for TypeOptions
#[derive(Debug, Clone, Default)]
pub struct TypeOptionsBuilder {
    delay: Option<f64>,
}

impl TypeOptionsBuilder {
    /// Set delay between key presses in milliseconds
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build the TypeOptions
    pub fn build(self) -> TypeOptions {
        TypeOptions { delay: self.delay }
    }
}

/// Press options
///
/// Configuration options for press() on an element or the keyboard.
#[derive(Debug, Clone, Default)]
pub struct PressOptions {
    /// Time to wait between keydown and keyup in milliseconds
    pub delay: Option<f64>,
}

impl PressOptions {
    /// Create a new builder for PressOptions
    pub fn builder() -> PressOptionsBuilder {
        PressOptionsBuilder::default()
    }
}

/// Builder for PressOptions
#[derive(Debug, Clone, Default)]
pub struct PressOptionsBuilder {
    delay: Option<f64>,
}

impl PressOptionsBuilder {
    /// Set delay between keydown and keyup in milliseconds
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build the PressOptions
    pub fn build(self) -> PressOptions {
        PressOptions { delay: self.delay }
    }
}

/// Mouse move options
#[derive(Debug, Clone, Default)]
pub struct MouseMoveOptions {
    /// Number of intermediate mousemove events (defaults to 1)
    pub steps: Option<u32>,
}

impl MouseMoveOptions {
    pub fn builder() -> MouseMoveOptionsBuilder {
        MouseMoveOptionsBuilder::default()
    }

    pub(crate) fn steps(&self) -> u32 {
        self.steps.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MouseMoveOptionsBuilder {
    steps: Option<u32>,
}

impl MouseMoveOptionsBuilder {
    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn build(self) -> MouseMoveOptions {
        MouseMoveOptions { steps: self.steps }
    }
}
