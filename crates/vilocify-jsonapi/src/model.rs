//! # Model Base
//!
//! A model type is described by a static [`ModelType`]: its declared name,
//! the wire attributes it binds, and the relationships it declares. An
//! instance of any model is a [`Resource`] — identity, a sparse ordered
//! attribute bag keyed by wire name, queued relationship linkage, and the
//! [`Client`] used for lazy fetches. Typed models wrap a `Resource` and
//! implement [`Model`].
//!
//! ## Lifecycle
//!
//! An instance without an id is *unmapped*: it has never been persisted.
//! The id is only ever replaced by a refresh, create, or update response.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::binding::Attribute;
use crate::client::Client;
use crate::error::JsonApiError;
use crate::request::{self, Pages, Query};
use crate::serializer::Meta;

/// Write action an attribute may be serialized on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Update,
}

/// Write policy of an attribute binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Server-assigned, never sent (e.g. timestamps).
    ReadOnly,
    /// Settable until the instance holds a value for it; sent on create only.
    WriteOnce,
    /// Sent on create and update.
    Writable,
}

impl Policy {
    /// Whether an attribute with this policy is part of an `action` body.
    pub fn serializes_on(self, action: Action) -> bool {
        match self {
            Self::ReadOnly => false,
            Self::WriteOnce => action == Action::Create,
            Self::Writable => true,
        }
    }
}

/// Untyped declaration of one attribute binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub wire_name: &'static str,
    pub policy: Policy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    ToOne,
    ToMany,
}

/// Untyped declaration of one relationship binding.
///
/// `target` names the target model by its declared [`Model::MODEL_NAME`]; the
/// [`Registry`](crate::Registry) resolves it when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipSpec {
    /// Rust-side field the relationship is looked up by.
    pub field: &'static str,
    pub kind: RelationshipKind,
    pub target: &'static str,
    /// Wire relationship name; defaults to the target's type name.
    pub name: Option<&'static str>,
}

/// Static description of a model type.
#[derive(Debug)]
pub struct ModelType {
    /// Declared type name, e.g. `ComponentRequest`.
    pub name: &'static str,
    /// Explicit JSON:API type name, for irregular plurals.
    pub type_name: Option<&'static str>,
    pub attributes: &'static [AttributeSpec],
    pub relationships: &'static [RelationshipSpec],
}

impl ModelType {
    /// JSON:API resource type: the override, or the declared name with a
    /// lower-cased first letter and an `s` appended.
    pub fn type_name(&self) -> String {
        match self.type_name {
            Some(name) => name.to_string(),
            None => derive_type_name(self.name),
        }
    }

    pub fn attribute(&self, wire_name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.wire_name == wire_name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().map(|a| a.wire_name)
    }

    pub fn relationship(&self, field: &str) -> Option<&RelationshipSpec> {
        self.relationships.iter().find(|r| r.field == field)
    }
}

/// `ComponentRequest` → `componentRequests`.
pub fn derive_type_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}s", first.to_lowercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Minimal `{id, type}` reference to a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentifier {
    pub id: String,
    pub type_name: String,
}

impl ResourceIdentifier {
    pub fn to_json(&self) -> Value {
        serde_json::json!({"id": self.id, "type": self.type_name})
    }
}

/// State of one model instance.
#[derive(Clone)]
pub struct Resource {
    model: &'static ModelType,
    id: Option<String>,
    attributes: Map<String, Value>,
    to_one: BTreeMap<String, ResourceIdentifier>,
    to_many: BTreeMap<String, Vec<ResourceIdentifier>>,
    client: Client,
}

impl Resource {
    /// A fresh, unmapped instance with an empty attribute bag.
    pub fn new(model: &'static ModelType, client: Client) -> Self {
        Self::from_parts(model, client, None, Map::new())
    }

    pub(crate) fn from_parts(
        model: &'static ModelType,
        client: Client,
        id: Option<String>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            model,
            id,
            attributes,
            to_one: BTreeMap::new(),
            to_many: BTreeMap::new(),
            client,
        }
    }

    pub fn model(&self) -> &'static ModelType {
        self.model
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_mapped(&self) -> bool {
        self.id.is_some()
    }

    pub fn type_name(&self) -> String {
        self.model.type_name()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The loaded attribute bag, in insertion order.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Loaded value of an attribute, without fetching.
    pub fn attribute(&self, wire_name: &str) -> Option<&Value> {
        self.attributes.get(wire_name)
    }

    pub fn has_attribute(&self, wire_name: &str) -> bool {
        self.attributes.contains_key(wire_name)
    }

    /// Value of an attribute, refreshing the instance first if it is not
    /// loaded. An attribute the server does not return reads as `null`.
    pub fn read_attribute(&mut self, wire_name: &str) -> Result<Value, JsonApiError> {
        if !self.has_attribute(wire_name) {
            self.refresh()?;
        }
        Ok(self.attributes.get(wire_name).cloned().unwrap_or(Value::Null))
    }

    /// Store an attribute value, enforcing its declared policy.
    pub fn write_attribute(&mut self, wire_name: &str, value: Value) -> Result<(), JsonApiError> {
        let spec = self.model.attribute(wire_name).ok_or_else(|| {
            JsonApiError::AttributePolicy(format!("{} has no attribute {wire_name}", self.model.name))
        })?;
        match spec.policy {
            Policy::ReadOnly => {
                return Err(JsonApiError::AttributePolicy(
                    "Cannot set read-only attribute".into(),
                ))
            }
            Policy::WriteOnce if self.has_attribute(wire_name) => {
                return Err(JsonApiError::AttributePolicy(
                    "Cannot set write-once attribute".into(),
                ))
            }
            Policy::WriteOnce | Policy::Writable => {}
        }
        self.attributes.insert(wire_name.to_string(), value);
        Ok(())
    }

    /// Identifier of this instance, for relationship linkage.
    pub fn identifier(&self) -> Result<ResourceIdentifier, JsonApiError> {
        let id = self
            .id
            .clone()
            .ok_or_else(|| JsonApiError::UnmappedModel("Related model has no id".into()))?;
        Ok(ResourceIdentifier {
            id,
            type_name: self.type_name(),
        })
    }

    /// Re-fetch by id and replace the attribute bag and id.
    pub fn refresh(&mut self) -> Result<(), JsonApiError> {
        let id = self
            .id
            .clone()
            .ok_or_else(|| JsonApiError::UnmappedModel("Model is unmapped and has no ID".into()))?;
        let fresh = request::fetch_resource(&self.client, self.model, &id)?;
        self.merge(fresh);
        Ok(())
    }

    /// Adopt the id and attribute bag of a server response.
    pub(crate) fn merge(&mut self, fresh: Resource) {
        self.id = fresh.id;
        self.attributes = fresh.attributes;
    }

    pub fn to_one_relationships(&self) -> &BTreeMap<String, ResourceIdentifier> {
        &self.to_one
    }

    pub fn to_many_relationships(&self) -> &BTreeMap<String, Vec<ResourceIdentifier>> {
        &self.to_many
    }

    pub(crate) fn set_to_one(&mut self, name: String, target: ResourceIdentifier) {
        self.to_one.insert(name, target);
    }

    pub(crate) fn set_to_many(&mut self, name: String, targets: Vec<ResourceIdentifier>) {
        self.to_many.insert(name, targets);
    }
}

/// Same type, same id, and equal loaded values for every declared
/// attribute. Relationships are ignored and nothing is fetched.
impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.type_name() == other.type_name()
            && self
                .model
                .attribute_names()
                .chain(other.model.attribute_names())
                .all(|name| self.attributes.get(name) == other.attributes.get(name))
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const CUTOFF: usize = 3;
        let shown = self
            .attributes
            .iter()
            .take(CUTOFF)
            .map(|(k, v)| format!("{k:?}: {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        let more = if self.attributes.len() > CUTOFF { ", ..." } else { "" };
        write!(
            f,
            "{}(id={:?}, attributes={{{shown}{more}}})",
            self.model.name, self.id
        )
    }
}

/// A typed model bound to a JSON:API resource type.
///
/// Implementors wrap a [`Resource`] and provide a static [`ModelType`];
/// everything else is provided.
pub trait Model: Sized {
    /// Declared type name, used for registry lookups.
    const MODEL_NAME: &'static str;

    fn model_type() -> &'static ModelType;
    fn from_resource(resource: Resource) -> Self;
    fn resource(&self) -> &Resource;
    fn resource_mut(&mut self) -> &mut Resource;

    /// A fresh, unmapped instance bound to `client`.
    fn new(client: &Client) -> Self {
        Self::from_resource(Resource::new(Self::model_type(), client.clone()))
    }

    /// Build an instance from a JSON object keyed by wire attribute name.
    ///
    /// `id` is adopted as the identity and `type` is ignored. Every other key
    /// must be a declared attribute and is written through its policy.
    fn from_attributes(client: &Client, attributes: Value) -> Result<Self, JsonApiError> {
        let Value::Object(attributes) = attributes else {
            return Err(JsonApiError::Validation(
                "model attributes must be a JSON object".into(),
            ));
        };
        let mut resource = Resource::new(Self::model_type(), client.clone());
        for (name, value) in attributes {
            match name.as_str() {
                "id" => {
                    resource.id = match value {
                        Value::String(s) => Some(s),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    }
                }
                "type" => {}
                _ => resource.write_attribute(&name, value)?,
            }
        }
        Ok(Self::from_resource(resource))
    }

    fn id(&self) -> Option<&str> {
        self.resource().id()
    }

    fn jsonapi_type_name() -> String {
        Self::model_type().type_name()
    }

    /// Read an attribute through its binding, fetching if not loaded.
    fn read<T: DeserializeOwned>(&mut self, attribute: &Attribute<T>) -> Result<T, JsonApiError> {
        attribute.get(self)
    }

    /// Write an attribute through its binding.
    fn write<T: Serialize>(&mut self, attribute: &Attribute<T>, value: T) -> Result<(), JsonApiError> {
        attribute.set(self, value)
    }

    // -- Query forwarders ---------------------------------------------------

    fn query(client: &Client) -> Query<Self> {
        Query::new(client)
    }

    fn get(client: &Client, id: &str) -> Result<Self, JsonApiError> {
        Query::new(client).get(id)
    }

    fn iter(client: &Client) -> Pages<Self> {
        Query::new(client).iter()
    }

    fn first(client: &Client) -> Result<Option<Self>, JsonApiError> {
        Query::new(client).first()
    }

    fn first_n(client: &Client, n: usize) -> Result<Vec<Self>, JsonApiError> {
        Query::new(client).first_n(n)
    }

    fn filter(client: &Client, attribute: &str, operator: &str, value: &str) -> Query<Self> {
        Query::new(client).filter(attribute, operator, value)
    }

    fn asc(client: &Client, attribute: &str) -> Result<Query<Self>, JsonApiError> {
        Query::new(client).asc(attribute)
    }

    fn desc(client: &Client, attribute: &str) -> Result<Query<Self>, JsonApiError> {
        Query::new(client).desc(attribute)
    }

    // -- Instance forwarders ------------------------------------------------

    fn create(&mut self, meta: Option<&Meta>) -> Result<(), JsonApiError> {
        request::create_resource(self.resource_mut(), meta)
    }

    fn update(&mut self, meta: Option<&Meta>) -> Result<(), JsonApiError> {
        request::update_resource(self.resource_mut(), meta)
    }

    fn delete(&self, meta: Option<&Meta>) -> Result<(), JsonApiError> {
        request::delete_resource(self.resource(), meta)
    }

    fn refresh(&mut self) -> Result<(), JsonApiError> {
        self.resource_mut().refresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_client, Widget};
    use serde_json::json;

    #[test]
    fn derives_type_names() {
        assert_eq!(derive_type_name("Component"), "components");
        assert_eq!(derive_type_name("ComponentRequest"), "componentRequests");
        assert_eq!(derive_type_name("MonitoringList"), "monitoringLists");
        assert_eq!(Widget::jsonapi_type_name(), "widgets");
    }

    #[test]
    fn policy_maps_to_actions() {
        assert!(Policy::Writable.serializes_on(Action::Create));
        assert!(Policy::Writable.serializes_on(Action::Update));
        assert!(Policy::WriteOnce.serializes_on(Action::Create));
        assert!(!Policy::WriteOnce.serializes_on(Action::Update));
        assert!(!Policy::ReadOnly.serializes_on(Action::Create));
        assert!(!Policy::ReadOnly.serializes_on(Action::Update));
    }

    #[test]
    fn constructor_and_assignment_are_equivalent() {
        let client = test_client();
        let a = Widget::from_attributes(&client, json!({"name": "w", "size": 1})).unwrap();
        let mut b = Widget::new(&client);
        b.write(&Widget::NAME, "w".to_string()).unwrap();
        b.write(&Widget::SIZE, Some(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn constructor_rejects_undeclared_attribute() {
        let client = test_client();
        let err = Widget::from_attributes(&client, json!({"abc": 2})).unwrap_err();
        assert!(matches!(err, JsonApiError::AttributePolicy(ref m) if m.contains("abc")));
    }

    #[test]
    fn constructor_adopts_id_and_ignores_type() {
        let client = test_client();
        let w = Widget::from_attributes(&client, json!({"id": 7, "type": "widgets", "name": "x"})).unwrap();
        assert_eq!(w.id(), Some("7"));
        assert_eq!(w.resource().attribute("name"), Some(&json!("x")));
    }

    #[test]
    fn equality_uses_declared_attributes_and_id() {
        let client = test_client();
        let a = Widget::from_attributes(&client, json!({"name": "a", "size": 1})).unwrap();
        let b = Widget::from_attributes(&client, json!({"name": "a", "size": 2})).unwrap();
        let c = Widget::from_attributes(&client, json!({"id": "1", "name": "a", "size": 1})).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        let a2 = Widget::from_attributes(&client, json!({"size": 1, "name": "a"})).unwrap();
        assert_eq!(a, a2);
    }

    #[test]
    fn equality_ignores_relationships() {
        let client = test_client();
        let mut a = Widget::from_attributes(&client, json!({"name": "a"})).unwrap();
        let b = Widget::from_attributes(&client, json!({"name": "a"})).unwrap();
        let parent = Widget::from_attributes(&client, json!({"id": "9"})).unwrap();
        Widget::PARENT.set(&mut a, &parent).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn refresh_of_unmapped_instance_fails() {
        let client = test_client();
        let mut w = Widget::new(&client);
        assert!(matches!(w.refresh(), Err(JsonApiError::UnmappedModel(_))));
    }

    #[test]
    fn debug_shows_at_most_three_attributes() {
        let client = test_client();
        let w = Widget::from_attributes(&client, json!({"name": "a", "size": 2, "color": "red"})).unwrap();
        assert_eq!(
            format!("{w:?}"),
            r#"Widget(id=None, attributes={"name": "a", "size": 2, "color": "red"})"#
        );
        let w = Widget::from_attributes(
            &client,
            json!({"name": "a", "size": 2, "color": "red", "serial": "s-1"}),
        )
        .unwrap();
        assert_eq!(
            format!("{w:?}"),
            r#"Widget(id=None, attributes={"name": "a", "size": 2, "color": "red", ...})"#
        );
    }
}
