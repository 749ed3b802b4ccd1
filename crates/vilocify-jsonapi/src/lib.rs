//! # vilocify-jsonapi -- Lazy JSON:API object mapper
//!
//! Binds typed model instances to the resources of a JSON:API service:
//!
//! - **Transport** ([`http`]) sends blocking requests and classifies every
//!   response into success, JSON:API protocol error, or transport error.
//! - **Field bindings** ([`binding`]) declare attributes and relationships
//!   with an explicit read-only / write-once / writable policy.
//! - **Serializer** ([`serializer`]) converts between resource documents and
//!   instances, folding `included` companions.
//! - **Query builder** ([`request`]) builds filter/sort/sparse-fieldset
//!   parameters and follows cursor pagination links lazily.
//! - **Model base** ([`model`], [`registry`]) provides identity, equality,
//!   and name-based resolution of relationship targets.
//!
//! ## Declaring a model
//!
//! ```no_run
//! use vilocify_jsonapi::{Attribute, Client, Model, ModelType, Resource, ToMany};
//!
//! pub struct Tag {
//!     resource: Resource,
//! }
//!
//! impl Tag {
//!     pub const LABEL: Attribute<String> = Attribute::writable("label");
//!     pub const CREATED_AT: Attribute<String> = Attribute::read_only("createdAt");
//!     pub const ALIASES: ToMany<Tag> = ToMany::named("aliases", "aliases");
//! }
//!
//! static TAG: ModelType = ModelType {
//!     name: "Tag",
//!     type_name: None,
//!     attributes: &[Tag::LABEL.spec(), Tag::CREATED_AT.spec()],
//!     relationships: &[Tag::ALIASES.spec()],
//! };
//!
//! impl Model for Tag {
//!     const MODEL_NAME: &'static str = "Tag";
//!     fn model_type() -> &'static ModelType { &TAG }
//!     fn from_resource(resource: Resource) -> Self { Self { resource } }
//!     fn resource(&self) -> &Resource { &self.resource }
//!     fn resource_mut(&mut self) -> &mut Resource { &mut self.resource }
//! }
//!
//! # fn demo(client: &Client) -> Result<(), vilocify_jsonapi::JsonApiError> {
//! for tag in Tag::filter(client, "label", "eq", "urgent").iter() {
//!     let mut tag = tag?;
//!     println!("{}", tag.read(&Tag::LABEL)?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Every call blocks until its round trip completes. A [`Client`] is
//! `Send + Sync` and cheap to clone; model instances are plain values.

pub mod binding;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod registry;
pub mod request;
pub mod serializer;

#[cfg(test)]
pub(crate) mod testing;

pub use binding::{Attribute, Many, ToMany, ToOne};
pub use client::Client;
pub use config::{ApiConfig, ConfigError};
pub use error::{ErrorObject, JsonApiError};
pub use model::{Action, AttributeSpec, Model, ModelType, Policy, RelationshipKind, RelationshipSpec, Resource};
pub use registry::{Registry, RegistryBuilder};
pub use request::{Filter, Pages, Query};
pub use serializer::Meta;
