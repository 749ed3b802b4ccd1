//! # vilocify-models -- Vilocify API v2 schemas
//!
//! Typed models for the resources of the Vilocify API, declared with the
//! bindings of [`vilocify_jsonapi`].
//!
//! | Model | Resource type | Module |
//! |-------|---------------|--------|
//! | [`Component`] | `components` | [`inventory`] |
//! | [`ComponentRequest`] | `componentRequests` | [`inventory`] |
//! | [`Membership`] | `memberships` | [`membership`] |
//! | [`Subscription`] | `subscriptions` | [`membership`] |
//! | [`MonitoringList`] | `monitoringLists` | [`monitoring`] |
//! | [`Notification`] | `notifications` | [`advisory`] |
//! | [`Vulnerability`] | `vulnerabilities` | [`advisory`] |
//!
//! Use [`registry`] to build the registry a [`Client`] needs to resolve
//! relationships between these models.
//!
//! ```no_run
//! use vilocify_jsonapi::{Client, Model};
//! use vilocify_models::{registry, MonitoringList};
//!
//! # fn demo() -> Result<(), vilocify_jsonapi::JsonApiError> {
//! let client = Client::from_env(registry()?)?;
//! for list in MonitoringList::filter(&client, "active", "eq", "true").iter() {
//!     let mut list = list?;
//!     println!("{}", list.read(&MonitoringList::NAME)?);
//! }
//! # Ok(())
//! # }
//! ```

use vilocify_jsonapi::{JsonApiError, Registry};

/// Declare a model struct wrapping a [`vilocify_jsonapi::Resource`] and
/// implement [`vilocify_jsonapi::Model`] for it against a static schema.
macro_rules! jsonapi_model {
    ($(#[$attr:meta])* $model:ident => $schema:ident) => {
        $(#[$attr])*
        pub struct $model {
            resource: vilocify_jsonapi::Resource,
        }

        impl vilocify_jsonapi::Model for $model {
            const MODEL_NAME: &'static str = stringify!($model);

            fn model_type() -> &'static vilocify_jsonapi::ModelType {
                &$schema
            }

            fn from_resource(resource: vilocify_jsonapi::Resource) -> Self {
                Self { resource }
            }

            fn resource(&self) -> &vilocify_jsonapi::Resource {
                &self.resource
            }

            fn resource_mut(&mut self) -> &mut vilocify_jsonapi::Resource {
                &mut self.resource
            }
        }

        impl PartialEq for $model {
            fn eq(&self, other: &Self) -> bool {
                self.resource == other.resource
            }
        }

        impl std::fmt::Debug for $model {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.resource, f)
            }
        }
    };
}

pub mod advisory;
pub mod inventory;
pub mod membership;
pub mod monitoring;

pub use advisory::{Notification, Vulnerability};
pub use inventory::{Component, ComponentRequest};
pub use membership::{Membership, Subscription};
pub use monitoring::MonitoringList;

#[doc(no_inline)]
pub use vilocify_jsonapi::Client;

/// Registry of every Vilocify model.
pub fn registry() -> Result<Registry, JsonApiError> {
    Registry::builder()
        .register::<Component>()
        .register::<ComponentRequest>()
        .register::<Membership>()
        .register::<Subscription>()
        .register::<MonitoringList>()
        .register::<Notification>()
        .register::<Vulnerability>()
        .build()
}

#[cfg(test)]
pub(crate) fn test_client() -> Client {
    Client::new(
        vilocify_jsonapi::ApiConfig::new("http://127.0.0.1:1/api/v2", "test-token").unwrap(),
        registry().unwrap(),
    )
    .unwrap()
}
