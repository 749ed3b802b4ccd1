//! # JSON:API Serializer
//!
//! Converts between JSON:API documents and [`Resource`]s.
//!
//! ## Documents read
//!
//! - single resource: `{"data": {"type", "id", "attributes"?}, "included"?: [...]}`
//! - collection: `{"data": [...], "included"?: [...], "links": {"next": ...}}`
//!
//! Relationship endpoints answer with a bare resource identifier in `data`
//! and the full resource in `included`; the attributes are then taken from
//! the included companion.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::client::Client;
use crate::error::JsonApiError;
use crate::model::{Action, ModelType, Resource, ResourceIdentifier};

/// Free-form `meta` member attached to write requests.
pub type Meta = Map<String, Value>;

fn invalid(reason: &str) -> JsonApiError {
    JsonApiError::Deserialization(format!("Received invalid JSON:API response. {reason}"))
}

fn document_object(document: &Value) -> Result<&Map<String, Value>, JsonApiError> {
    document
        .as_object()
        .ok_or_else(|| invalid("The document is not an object"))
}

/// Deserialize a single-resource document.
///
/// Returns `None` for an absent document or a `null`/missing `data` member.
pub fn deserialize_one(
    model: &'static ModelType,
    client: &Client,
    document: Option<&Value>,
) -> Result<Option<Resource>, JsonApiError> {
    let Some(document) = document else {
        return Ok(None);
    };
    let document = document_object(document)?;
    let data = match document.get("data") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(data)) => data,
        Some(_) => return Err(invalid("Expected data to be an object")),
    };

    let id = data
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("Resource object has no string id"))?
        .to_string();

    let included = match document.get("included") {
        None | Some(Value::Null) => None,
        Some(Value::Array(included)) => Some(included),
        Some(_) => return Err(invalid("`included` must be a list")),
    };

    let mut included_attributes = None;
    if let Some([companion]) = included.map(Vec::as_slice) {
        included_attributes = Some(included_companion_attributes(model, &id, companion)?);
    }

    let attributes = match data.get("attributes") {
        Some(Value::Object(attributes)) => attributes.clone(),
        Some(_) => return Err(invalid("`attributes` must be an object")),
        None => included_attributes.unwrap_or_default(),
    };

    Ok(Some(Resource::from_parts(model, client.clone(), Some(id), attributes)))
}

fn included_companion_attributes(
    model: &ModelType,
    id: &str,
    companion: &Value,
) -> Result<Map<String, Value>, JsonApiError> {
    let matches = companion.get("id").and_then(Value::as_str) == Some(id)
        && companion.get("type").and_then(Value::as_str) == Some(model.type_name().as_str());
    match companion.get("attributes") {
        Some(Value::Object(attributes)) if matches => Ok(attributes.clone()),
        _ => Err(JsonApiError::Deserialization(
            "Included document has wrong type or id".into(),
        )),
    }
}

/// Lazy iterator over the resources of one collection page.
pub struct ResourceIter {
    model: &'static ModelType,
    client: Client,
    items: std::vec::IntoIter<Value>,
    included: HashMap<(String, String), Value>,
}

impl ResourceIter {
    fn empty(model: &'static ModelType, client: &Client) -> Self {
        Self {
            model,
            client: client.clone(),
            items: Vec::new().into_iter(),
            included: HashMap::new(),
        }
    }

    fn deserialize_item(&self, item: Value) -> Result<Option<Resource>, JsonApiError> {
        let key = match (
            item.get("type").and_then(Value::as_str),
            item.get("id").and_then(Value::as_str),
        ) {
            (Some(t), Some(id)) => (t.to_string(), id.to_string()),
            _ => return Err(invalid("Collection item has no type or id")),
        };
        let mut single = json!({ "data": item });
        if let Some(companion) = self.included.get(&key) {
            single["included"] = json!([companion]);
        }
        deserialize_one(self.model, &self.client, Some(&single))
    }
}

impl Iterator for ResourceIter {
    type Item = Result<Resource, JsonApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.items.next()?;
            if item.is_null() {
                continue;
            }
            match self.deserialize_item(item) {
                Ok(Some(resource)) => return Some(Ok(resource)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Deserialize a collection document into a lazy sequence of resources.
///
/// Each element is paired with its `included` companion by `(type, id)`.
pub fn deserialize_many(
    model: &'static ModelType,
    client: &Client,
    document: Option<&Value>,
) -> Result<ResourceIter, JsonApiError> {
    let Some(document) = document else {
        return Ok(ResourceIter::empty(model, client));
    };
    let document = document_object(document)?;
    let items = match document.get("data") {
        None | Some(Value::Null) => return Ok(ResourceIter::empty(model, client)),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => return Err(invalid("Expected data to be a list")),
    };

    let included = match document.get("included") {
        None | Some(Value::Null) => HashMap::new(),
        Some(Value::Array(included)) => included
            .iter()
            .filter_map(|doc| {
                let t = doc.get("type")?.as_str()?;
                let id = doc.get("id")?.as_str()?;
                Some(((t.to_string(), id.to_string()), doc.clone()))
            })
            .collect(),
        Some(_) => return Err(invalid("Included response must be a list")),
    };

    Ok(ResourceIter {
        model,
        client: client.clone(),
        items: items.into_iter(),
        included,
    })
}

/// Extract the `links.next` cursor of a collection page.
pub fn deserialize_next_link(document: &Value) -> Result<Option<String>, JsonApiError> {
    let document = document_object(document)?;
    let links = document
        .get("links")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("links is not an object"))?;
    match links.get("next") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(next)) => Ok(Some(next.clone())),
        Some(_) => Err(invalid("The next link is not a string")),
    }
}

/// Serialize an instance for `action`.
///
/// Only attributes whose policy allows `action` and that are loaded are
/// sent. Queued relationships are folded into linkage objects.
pub fn serialize_one(resource: &Resource, meta: Option<&Meta>, action: Action) -> Value {
    let attributes: Map<String, Value> = resource
        .model()
        .attributes
        .iter()
        .filter(|spec| spec.policy.serializes_on(action))
        .filter_map(|spec| {
            resource
                .attribute(spec.wire_name)
                .map(|v| (spec.wire_name.to_string(), v.clone()))
        })
        .collect();

    let mut data = Map::new();
    data.insert("type".into(), Value::String(resource.type_name()));
    data.insert("attributes".into(), Value::Object(attributes));
    if let Some(id) = resource.id() {
        data.insert("id".into(), Value::String(id.to_string()));
    }

    let mut relationships = Map::new();
    for (name, targets) in resource.to_many_relationships() {
        let linkage: Vec<Value> = targets.iter().map(ResourceIdentifier::to_json).collect();
        relationships.insert(name.clone(), json!({ "data": linkage }));
    }
    for (name, target) in resource.to_one_relationships() {
        relationships.insert(name.clone(), json!({ "data": target.to_json() }));
    }
    if !relationships.is_empty() {
        data.insert("relationships".into(), Value::Object(relationships));
    }

    let mut document = Map::new();
    document.insert("data".into(), Value::Object(data));
    if let Some(meta) = meta.filter(|m| !m.is_empty()) {
        document.insert("meta".into(), Value::Object(meta.clone()));
    }
    Value::Object(document)
}

/// Serialize resource identifiers for a relationship write.
pub fn serialize_many_related(related: &[&Resource]) -> Result<Value, JsonApiError> {
    let data = related
        .iter()
        .map(|r| r.identifier().map(|i| i.to_json()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({ "data": data }))
}

/// Body of a delete request: `{"meta": {...}}`, empty when `meta` is `None`.
pub fn serialize_meta(meta: Option<&Meta>) -> Value {
    json!({ "meta": meta.cloned().unwrap_or_default() })
}
