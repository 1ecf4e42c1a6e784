//! Centralized HTTP client factory for adboard services.
//!
//! `create_client_builder(duration)` returns a preconfigured builder with the
//! User-Agent, tcp_nodelay and a bounded idle pool. The timeout covers the
//! whole request/response cycle; a timed out request surfaces as a transport
//! error, never as an HTTP status.

use reqwest::Client;
use std::time::Duration;

/// User-Agent string for all HTTP requests
pub const USER_AGENT: &str = concat!("adboard/", env!("CARGO_PKG_VERSION"));

/// Default timeout for API requests (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection pool idle timeout so DNS is re-resolved periodically.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates an HTTP client builder with standard configuration.
///
/// Use this when the client needs more setup before building, such as a
/// cookie provider.
///
/// # Example
/// ```ignore
/// let client = create_client_builder(DEFAULT_TIMEOUT)
///     .cookie_provider(jar)
///     .build()?;
/// ```
pub fn create_client_builder(timeout: Duration) -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_builder_returns_builder() {
        let result = create_client_builder(DEFAULT_TIMEOUT).build();
        assert!(
            result.is_ok(),
            "create_client_builder should return valid builder"
        );
    }

    #[test]
    fn test_user_agent_constant_is_set() {
        assert!(USER_AGENT.starts_with("adboard/"));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(5));
    }
}
