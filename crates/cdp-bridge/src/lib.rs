//! cdp-bridge: remote object handles and element interactions over the
//! Chrome DevTools Protocol
//!
//! This crate evaluates JavaScript in a live page, hands back typed handles
//! to the resulting remote values (including DOM elements), and performs
//! geometry-aware interactions (click, hover, type, screenshot) on them.
//!
//! # Examples
//!
//! ## Evaluate and interact
//!
//! ```ignore
//! use cdp_bridge::server::connection::Connection;
//! use cdp_bridge::{CdpPage, ExecutionContext, Frame, Page, Script};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = Connection::connect("ws://127.0.0.1:9222/devtools/browser/<id>", None).await?;
//!     let session = Arc::new(connection.attach_to_target("<target-id>").await?);
//!
//!     let page = Page::new(Arc::new(CdpPage::new(session.clone())));
//!     let frame = Frame::new("<frame-id>", &page);
//!     let context = ExecutionContext::new(session.clone(), 1, Some(frame));
//!     context.track_destruction(&session);
//!
//!     let title = context.evaluate(Script::expression("document.title"), &[]).await?;
//!     println!("title: {}", title);
//!
//!     let button = context
//!         .evaluate_handle(Script::expression("document.querySelector('button')"), &[])
//!         .await?
//!         .into_element()
//!         .expect("button");
//!     button.click(None).await?;
//!     button.dispose().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Forms
//!
//! ```ignore
//! let input = form.query_selector("input[name=q]").await?.expect("input");
//! input.fill("rust").await?;
//! input.press("Enter", None).await?;
//!
//! let select = form.query_selector("select").await?.expect("select");
//! let selected = select.select_option(vec!["uk".into()]).await?;
//! assert_eq!(selected, vec!["uk"]);
//! ```

// Internal modules (exposed for integration tests)
#[doc(hidden)]
pub mod server;

pub mod api;
mod error;
pub mod protocol;

/// Default timeout in milliseconds for protocol requests.
pub const DEFAULT_TIMEOUT_MS: f64 = 30000.0;

// Re-export error types
pub use error::{Error, Result};

// Re-export connection options
pub use api::ConnectOptions;

// Re-export evaluation and handle APIs
pub use protocol::{
    EvaluateArg, Evaluated, ExecutionContext, Handle, JsHandle, JsValue, RemoteObject, Script,
};

// Re-export element APIs
pub use protocol::{BoundingBox, ElementHandle, Point};

// Re-export page collaborators
pub use protocol::{CdpPage, Frame, Keyboard, Mouse, Page, PageDelegate, Viewport, WeakPage};

// Re-export action options
pub use protocol::{
    ClickOptions, HoverOptions, KeyboardModifier, MouseButton, MouseClickOptions, PressOptions,
    TypeOptions,
};

// Re-export form and input types
pub use protocol::{FilePayload, InputFile, OptionDescriptor, SelectOption};

// Re-export screenshot types
pub use protocol::{ScreenshotClip, ScreenshotOptions, ScreenshotType};
