use std::collections::HashMap;
use std::time::Duration;

/// Options for [`Connection::connect`](crate::server::connection::Connection::connect).
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Additional HTTP headers to send with the WebSocket handshake.
    pub headers: Option<HashMap<String, String>>,
    /// Maximum time in milliseconds to wait for any protocol response.
    /// Defaults to 30000 (30 seconds). Pass 0 to disable timeout.
    pub timeout: Option<f64>,
}

impl ConnectOptions {
    /// Creates a new `ConnectOptions` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set additional HTTP headers to send with the WebSocket handshake.
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set the per-request timeout in milliseconds.
    pub fn timeout(mut self, timeout: f64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Effective per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        match self.timeout.unwrap_or(crate::DEFAULT_TIMEOUT_MS) {
            ms if ms <= 0.0 => Duration::MAX,
            ms => Duration::from_secs_f64(ms / 1000.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        assert_eq!(
            ConnectOptions::new().request_timeout(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_zero_disables_timeout() {
        assert_eq!(
            ConnectOptions::new().timeout(0.0).request_timeout(),
            Duration::MAX
        );
    }

    #[test]
    fn test_headers_builder() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer token".to_string());
        let options = ConnectOptions::new().headers(headers).timeout(1500.0);
        assert_eq!(options.request_timeout(), Duration::from_millis(1500));
        assert_eq!(
            options.headers.unwrap().get("Authorization").map(String::as_str),
            Some("Bearer token")
        );
    }
}
