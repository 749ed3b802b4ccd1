//! JSON:API client configuration.
//!
//! Every [`Client`](crate::Client) owns one `ApiConfig`. There is no
//! process-wide configuration: build a config explicitly, load it from the
//! environment, or point it at a local mock server for testing.

use url::Url;
use zeroize::Zeroizing;

/// Default base URL of the Vilocify API v2.
pub const DEFAULT_BASE_URL: &str = "https://portal.vilocify.com/api/v2";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Configuration for connecting to a JSON:API service.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL that resource collections are appended to,
    /// e.g. <https://portal.vilocify.com/api/v2>.
    pub base_url: Url,
    /// Scheme and authority of `base_url` with the path dropped. Pagination
    /// links returned by the server are resolved against this.
    pub api_host: Url,
    /// Bearer token for API authentication. May be empty.
    pub api_token: Zeroizing<String>,
    /// Connect + read timeout for every request, in seconds.
    pub timeout_secs: u64,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_host", &self.api_host)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ApiConfig {
    /// Build a configuration for `base_url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base_url` does not parse or is
    /// not an `http`/`https` URL.
    pub fn new(base_url: &str, api_token: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base_url("base_url", base_url)?;
        Ok(Self {
            api_host: drop_path(&base_url),
            base_url,
            api_token: Zeroizing::new(api_token.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VILOCIFY_API_BASE_URL` (default: `https://portal.vilocify.com/api/v2`)
    /// - `VILOCIFY_API_TOKEN` (default: empty)
    /// - `VILOCIFY_TIMEOUT_SECS` (default: 20)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("VILOCIFY_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url("VILOCIFY_API_BASE_URL", &raw)?;
        let api_token = std::env::var("VILOCIFY_API_TOKEN").unwrap_or_default();

        Ok(Self {
            api_host: drop_path(&base_url),
            base_url,
            api_token: Zeroizing::new(api_token),
            timeout_secs: std::env::var("VILOCIFY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// The base URL is `{server_uri}/api/v2`, mirroring the production layout
    /// so that pagination links carrying the full path resolve correctly.
    pub fn local_mock(server_uri: &str, token: &str) -> Result<Self, ConfigError> {
        let mut config = Self::new(&format!("{}/api/v2", server_uri.trim_end_matches('/')), token)?;
        config.timeout_secs = 5;
        Ok(config)
    }

    /// Replace the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

fn default_user_agent() -> String {
    format!("vilocify-sdk-rust/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_base_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("unsupported scheme `{other}`"),
        )),
    }
}

fn drop_path(url: &Url) -> Url {
    let mut host = url.clone();
    host.set_path("");
    host.set_query(None);
    host.set_fragment(None);
    host
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
