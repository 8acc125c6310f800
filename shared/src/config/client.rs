//! API client configuration

/// Default base URL used when nothing is configured (local development).
const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Configuration for the HTTP client talking to the MaidMatch API
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the MaidMatch API, e.g. `https://api.maidmatch.example/api`
    pub base_url: String,
    /// Timeout for a complete request/response cycle in seconds
    pub request_timeout_secs: u64,
    /// Timeout for establishing a TCP connection in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl ApiClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads:
    /// - `MM_API_BASE_URL` - base URL of the API (defaults to local dev)
    /// - `MM_REQUEST_TIMEOUT_SECS` - full request timeout (default 30)
    /// - `MM_CONNECT_TIMEOUT_SECS` - connection timeout (default 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("MM_API_BASE_URL")
                .unwrap_or(defaults.base_url),
            request_timeout_secs: std::env::var("MM_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            connect_timeout_secs: std::env::var("MM_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_timeout_secs),
        }
    }

    /// Base URL with any trailing slash removed, so endpoint paths can be
    /// appended uniformly.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_dev() {
        let config = ApiClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn test_base_url_trimmed() {
        let config = ApiClientConfig {
            base_url: "https://api.maidmatch.example/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url_trimmed(), "https://api.maidmatch.example/api");
    }
}
