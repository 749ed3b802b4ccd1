//! # JSON:API Transport
//!
//! Issues blocking HTTP requests and classifies every response into one of
//! three outcomes:
//!
//! | Response | Outcome |
//! |----------|---------|
//! | non-empty body, `Content-Type` not `application/vnd.api+json` | [`JsonApiError::Transport`] (checked before the status) |
//! | non-2xx status | [`JsonApiError::Api`] with the parsed `errors` array |
//! | 2xx | parsed body, or `None` for empty / non-JSON bodies |
//!
//! Retries are NOT built into the transport. Timeouts come from
//! [`ApiConfig::timeout_secs`] and apply to every request.

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{JsonApiError, UNSUPPORTED_CONTENT_TYPE_MESSAGE};

/// Media type of JSON:API documents.
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Query parameters as ordered key/value pairs.
pub type Params = Vec<(String, String)>;

/// Blocking HTTP transport bound to one [`ApiConfig`].
#[derive(Debug)]
pub struct HttpTransport {
    http: HttpClient,
    config: ApiConfig,
}

impl HttpTransport {
    /// Create a transport with JSON:API and bearer-token default headers.
    pub fn new(config: ApiConfig) -> Result<Self, JsonApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSONAPI_MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSONAPI_MEDIA_TYPE));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token.as_str()))
            .map_err(|_| JsonApiError::Validation("API token contains invalid header characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| JsonApiError::Http {
                url: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// The configuration this transport was built from.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send a request and classify the response.
    pub fn request(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
        params: &[(String, String)],
    ) -> Result<Option<Value>, JsonApiError> {
        tracing::debug!(%method, %url, ?params, ?body, "sending JSON:API request");

        let mut request = self.http.request(method, url.clone());
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            // `.json()` would overwrite the JSON:API content type.
            let bytes = serde_json::to_vec(body)
                .map_err(|e| JsonApiError::Deserialization(format!("cannot encode request body: {e}")))?;
            request = request.body(bytes);
        }

        let response = request.send().map_err(|e| JsonApiError::Http {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let server_timing = response
            .headers()
            .get("Server-Timing")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("n/a")
            .to_string();
        let text = response.text().map_err(|e| JsonApiError::Http {
            url: url.to_string(),
            source: e,
        })?;

        tracing::debug!(status = status.as_u16(), %server_timing, body = %text, "received JSON:API response");

        if !text.is_empty() && !content_type.starts_with(JSONAPI_MEDIA_TYPE) {
            return Err(JsonApiError::Transport {
                status: status.as_u16(),
                message: UNSUPPORTED_CONTENT_TYPE_MESSAGE.to_string(),
            });
        }

        let document = parse_body(&text);

        if !status.is_success() {
            return Err(JsonApiError::from_response(status.as_u16(), document.as_ref()));
        }

        Ok(document)
    }

    pub fn get(&self, url: &Url, params: &[(String, String)]) -> Result<Option<Value>, JsonApiError> {
        self.request(Method::GET, url, None, params)
    }

    pub fn post(&self, url: &Url, body: &Value) -> Result<Option<Value>, JsonApiError> {
        self.request(Method::POST, url, Some(body), &[])
    }

    pub fn patch(&self, url: &Url, body: &Value) -> Result<Option<Value>, JsonApiError> {
        self.request(Method::PATCH, url, Some(body), &[])
    }

    pub fn delete(&self, url: &Url, body: &Value) -> Result<Option<Value>, JsonApiError> {
        self.request(Method::DELETE, url, Some(body), &[])
    }
}

/// Empty, malformed, and `null` bodies all map to `None`.
fn parse_body(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("discarding undecodable response body: {e}");
            None
        }
    }
}
