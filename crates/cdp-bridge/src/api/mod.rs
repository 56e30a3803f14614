// Public API types module
//
// High-level configuration types used when opening a DevTools connection.

pub mod connect_options;

pub use connect_options::ConnectOptions;
