//! Protocol plumbing (internal)
//!
//! This module handles the DevTools transport, JSON-RPC correlation and the
//! session seam that protocol objects send requests through.
//!
//! **Note**: This module is exposed publicly only for integration testing purposes.
//! The types and APIs in this module are considered internal implementation details
//! and may change without notice. User code should not depend on these types directly.

#[doc(hidden)]
pub mod channel;
#[doc(hidden)]
pub mod connection;
#[doc(hidden)]
pub mod session;
#[doc(hidden)]
pub mod transport;
