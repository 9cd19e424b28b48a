//! # Relay Configuration

use std::time::Duration;

/// Configuration for the replication relay.
///
/// ## Example
/// ```rust,ignore
/// let config = RelayConfig::default()
///     .queue_capacity(512)
///     .max_attempts(3);
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Bounded queue capacity between checkouts and the relay worker.
    ///
    /// When full, new items are dropped (with a warning) rather than
    /// blocking a checkout. Default: 256.
    pub queue_capacity: usize,

    /// Attempts per item before giving up on it. Default: 3.
    pub max_attempts: u32,

    /// Delay between retry attempts for the same item. Default: 2s.
    pub retry_delay: Duration,

    /// Request timeout for document store calls. Default: 10s.
    pub request_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            queue_capacity: 256,
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl RelayConfig {
    /// Sets the queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the per-item attempt limit.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the delay between retry attempts.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the document store request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_builder() {
        let config = RelayConfig::default()
            .queue_capacity(512)
            .max_attempts(5)
            .retry_delay(Duration::from_millis(100));

        assert_eq!(config.queue_capacity, 512);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(100));
    }
}
