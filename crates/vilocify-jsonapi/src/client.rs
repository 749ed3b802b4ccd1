//! The shared client handle.
//!
//! A [`Client`] bundles the HTTP transport (and with it the [`ApiConfig`])
//! with the model [`Registry`]. It is a cheap `Arc` clone; every model
//! instance carries one so lazy reads can reach the server.
//!
//! The token is fixed when the client is built. To use a different token,
//! build a new client.

use std::fmt;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::JsonApiError;
use crate::http::HttpTransport;
use crate::model::Model;
use crate::registry::Registry;
use crate::request::Query;

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    transport: HttpTransport,
    registry: Registry,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", self.config())
            .field("models", &self.inner.registry.len())
            .finish()
    }
}

impl Client {
    pub fn new(config: ApiConfig, registry: Registry) -> Result<Self, JsonApiError> {
        tracing::debug!(base_url = %config.base_url, models = registry.len(), "building JSON:API client");
        Ok(Self {
            inner: Arc::new(ClientInner {
                transport: HttpTransport::new(config)?,
                registry,
            }),
        })
    }

    /// Build a client from `VILOCIFY_*` environment variables.
    pub fn from_env(registry: Registry) -> Result<Self, JsonApiError> {
        Self::new(ApiConfig::from_env()?, registry)
    }

    pub fn config(&self) -> &ApiConfig {
        self.inner.transport.config()
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.inner.transport
    }

    pub fn query<M: Model>(&self) -> Query<M> {
        Query::new(self)
    }

    pub fn get<M: Model>(&self, id: &str) -> Result<M, JsonApiError> {
        Query::new(self).get(id)
    }

    /// A fresh, unmapped instance of `M` bound to this client.
    pub fn build<M: Model>(&self) -> M {
        M::new(self)
    }
}
