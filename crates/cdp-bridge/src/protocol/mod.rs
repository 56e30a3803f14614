// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Protocol Objects - remote values, handles and the pages they act on
//
// Architecture:
// - ExecutionContext evaluates scripts through a SessionLike
// - Results become JsValues or Handles (create_handle is the only dispatch
//   point between value handles and element handles)
// - ElementHandles measure themselves with DOM queries and act through the
//   owning Page's PageDelegate

pub mod action_options;
pub mod cdp_page;
pub mod click;
pub mod element_handle;
pub mod evaluate_conversion;
pub mod execution_context;
pub mod file_payload;
pub mod function_source;
pub mod geometry;
mod injected;
mod key_definitions;
pub mod keyboard;
pub mod js_handle;
pub mod mouse;
pub mod page;
pub mod remote_object;
pub mod screenshot;
pub mod select_option;

pub use action_options::{MouseMoveOptions, PressOptions, TypeOptions};
pub use cdp_page::CdpPage;
pub use click::{ClickOptions, HoverOptions, KeyboardModifier, MouseButton, MouseClickOptions};
pub use element_handle::ElementHandle;
pub use evaluate_conversion::{
    EvaluateArg, JsValue, call_argument_from_value, value_from_remote_object,
};
pub use execution_context::{Evaluated, ExecutionContext, Script};
pub use file_payload::{FilePayload, FilePayloadBuilder, InputFile};
pub use geometry::{BoundingBox, Point, Quad, ResolvedPoint};
pub use js_handle::{Handle, JsHandle, create_handle};
pub use keyboard::Keyboard;
pub use mouse::Mouse;
pub use page::{Frame, Page, PageDelegate, Viewport, WeakPage};
pub use remote_object::{CallArgument, ExecutionContextId, RemoteObject};
pub use screenshot::{ScreenshotClip, ScreenshotOptions, ScreenshotType};
pub use select_option::{OptionDescriptor, SelectOption};
