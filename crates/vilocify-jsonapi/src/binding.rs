//! # Field Bindings
//!
//! Small stateless strategy objects declared as associated constants on a
//! model. Each binding knows its wire name and policy and performs its own
//! type coercion:
//!
//! - [`Attribute<T>`] reads fetch the instance when the attribute is not
//!   loaded; writes enforce the [`Policy`].
//! - [`ToOne<T>`] reads hit `/{type}/{id}/relationships/{name}` on every
//!   access. Nothing is cached.
//! - [`ToMany<T>`] reads return a [`Many`] handle that re-issues a paginated
//!   request each time it is iterated.
//!
//! Relationship assignments are queued on the instance and sent with its
//! next create or update.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::Client;
use crate::error::JsonApiError;
use crate::model::{AttributeSpec, Model, ModelType, Policy, RelationshipKind, RelationshipSpec};
use crate::registry::ResolvedRelationship;
use crate::request::{self, Pages, DEFAULT_PAGE_SIZE};

/// Typed attribute binding.
pub struct Attribute<T> {
    spec: AttributeSpec,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for Attribute<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Attribute<T> {}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Attribute").field(&self.spec).finish()
    }
}

impl<T> Attribute<T> {
    pub const fn new(wire_name: &'static str, policy: Policy) -> Self {
        Self {
            spec: AttributeSpec { wire_name, policy },
            _type: PhantomData,
        }
    }

    pub const fn writable(wire_name: &'static str) -> Self {
        Self::new(wire_name, Policy::Writable)
    }

    pub const fn write_once(wire_name: &'static str) -> Self {
        Self::new(wire_name, Policy::WriteOnce)
    }

    pub const fn read_only(wire_name: &'static str) -> Self {
        Self::new(wire_name, Policy::ReadOnly)
    }

    /// Untyped declaration, for listing in a [`ModelType`].
    pub const fn spec(&self) -> AttributeSpec {
        self.spec
    }

    pub fn wire_name(&self) -> &'static str {
        self.spec.wire_name
    }

    pub fn policy(&self) -> Policy {
        self.spec.policy
    }
}

impl<T: DeserializeOwned> Attribute<T> {
    /// Read the attribute, refreshing `obj` first if it is not loaded.
    pub fn get<M: Model>(&self, obj: &mut M) -> Result<T, JsonApiError> {
        let value = obj.resource_mut().read_attribute(self.spec.wire_name)?;
        self.coerce(value)
    }

    /// Read the attribute only if it is already loaded.
    pub fn peek<M: Model>(&self, obj: &M) -> Result<Option<T>, JsonApiError> {
        obj.resource()
            .attribute(self.spec.wire_name)
            .cloned()
            .map(|v| self.coerce(v))
            .transpose()
    }

    fn coerce(&self, value: serde_json::Value) -> Result<T, JsonApiError> {
        serde_json::from_value(value).map_err(|source| JsonApiError::Coercion {
            attribute: self.spec.wire_name.to_string(),
            source,
        })
    }
}

impl<T: Serialize> Attribute<T> {
    /// Write the attribute. Fails for read-only bindings and for write-once
    /// bindings that already hold a value.
    pub fn set<M: Model>(&self, obj: &mut M, value: T) -> Result<(), JsonApiError> {
        let value = serde_json::to_value(value).map_err(|source| JsonApiError::Coercion {
            attribute: self.spec.wire_name.to_string(),
            source,
        })?;
        obj.resource_mut().write_attribute(self.spec.wire_name, value)
    }
}

/// Look up a relationship declared on `M` and check its target is `T`.
fn resolve<M: Model, T: Model>(client: &Client, field: &str) -> Result<ResolvedRelationship, JsonApiError> {
    let resolved = client.registry().relationship(M::MODEL_NAME, field)?;
    if resolved.target.name != T::MODEL_NAME {
        return Err(JsonApiError::Registry(format!(
            "relationship `{}.{field}` targets `{}`, not `{}`",
            M::MODEL_NAME,
            resolved.target.name,
            T::MODEL_NAME
        )));
    }
    Ok(resolved.clone())
}

/// Typed to-one relationship binding.
pub struct ToOne<T> {
    field: &'static str,
    name: Option<&'static str>,
    _target: PhantomData<fn() -> T>,
}

impl<T> ToOne<T> {
    /// Relationship named after the target's singular type name.
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            name: None,
            _target: PhantomData,
        }
    }

    /// Relationship with an explicit wire name.
    pub const fn named(field: &'static str, name: &'static str) -> Self {
        Self {
            field,
            name: Some(name),
            _target: PhantomData,
        }
    }
}

impl<T: Model> ToOne<T> {
    pub const fn spec(&self) -> RelationshipSpec {
        RelationshipSpec {
            field: self.field,
            kind: RelationshipKind::ToOne,
            target: T::MODEL_NAME,
            name: self.name,
        }
    }

    /// Fetch the related resource. Issues a request on every call.
    pub fn get<M: Model>(&self, owner: &M) -> Result<Option<T>, JsonApiError> {
        let resource = owner.resource();
        let id = resource
            .id()
            .ok_or_else(|| JsonApiError::UnmappedModel("Model is not mapped".into()))?;
        let resolved = resolve::<M, T>(resource.client(), self.field)?;
        request::get_one_related::<T>(resource.client(), M::model_type(), id, &resolved.wire_name)
    }

    /// Queue `target` as the related resource for the next create/update.
    pub fn set<M: Model>(&self, owner: &mut M, target: &T) -> Result<(), JsonApiError> {
        let resolved = resolve::<M, T>(owner.resource().client(), self.field)?;
        let identifier = target.resource().identifier()?;
        owner.resource_mut().set_to_one(resolved.wire_name, identifier);
        Ok(())
    }
}

/// Typed to-many relationship binding.
pub struct ToMany<T> {
    field: &'static str,
    name: Option<&'static str>,
    _target: PhantomData<fn() -> T>,
}

impl<T> ToMany<T> {
    /// Relationship named after the target's plural type name.
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            name: None,
            _target: PhantomData,
        }
    }

    pub const fn named(field: &'static str, name: &'static str) -> Self {
        Self {
            field,
            name: Some(name),
            _target: PhantomData,
        }
    }
}

impl<T: Model> ToMany<T> {
    pub const fn spec(&self) -> RelationshipSpec {
        RelationshipSpec {
            field: self.field,
            kind: RelationshipKind::ToMany,
            target: T::MODEL_NAME,
            name: self.name,
        }
    }

    /// Handle on the related collection. Nothing is fetched until iterated.
    pub fn get<M: Model>(&self, owner: &M) -> Result<Many<T>, JsonApiError> {
        let resource = owner.resource();
        let resolved = resolve::<M, T>(resource.client(), self.field)?;
        Ok(Many {
            client: resource.client().clone(),
            owner_type: M::model_type(),
            owner_id: resource.id().map(str::to_string),
            relationship_name: resolved.wire_name,
            _target: PhantomData,
        })
    }

    /// Queue `targets` as the related resources for the next create/update.
    pub fn set<M: Model>(&self, owner: &mut M, targets: &[&T]) -> Result<(), JsonApiError> {
        let resolved = resolve::<M, T>(owner.resource().client(), self.field)?;
        let identifiers = targets
            .iter()
            .map(|t| t.resource().identifier())
            .collect::<Result<Vec<_>, _>>()?;
        owner.resource_mut().set_to_many(resolved.wire_name, identifiers);
        Ok(())
    }
}

/// The related collection of one owner instance.
///
/// Not a cached collection: every iteration re-issues the paginated request.
pub struct Many<T> {
    client: Client,
    owner_type: &'static ModelType,
    owner_id: Option<String>,
    relationship_name: String,
    _target: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Many<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Many")
            .field("owner_type", &self.owner_type.name)
            .field("owner_id", &self.owner_id)
            .field("relationship_name", &self.relationship_name)
            .finish()
    }
}

impl<T: Model> Many<T> {
    pub fn relationship_name(&self) -> &str {
        &self.relationship_name
    }

    fn owner_id(&self) -> Result<&str, JsonApiError> {
        self.owner_id
            .as_deref()
            .ok_or_else(|| JsonApiError::UnmappedModel("Model is unmapped and has no ID".into()))
    }

    /// Lazily iterate the related resources, following cursor links.
    pub fn iter(&self) -> Result<Pages<T>, JsonApiError> {
        request::iter_many_related::<T>(
            &self.client,
            self.owner_type,
            self.owner_id()?,
            &self.relationship_name,
            DEFAULT_PAGE_SIZE,
        )
    }

    pub fn all(&self) -> Result<Vec<T>, JsonApiError> {
        self.iter()?.collect()
    }

    pub fn ids(&self) -> Result<Vec<String>, JsonApiError> {
        self.iter()?
            .map(|item| item.map(|m| m.id().unwrap_or_default().to_string()))
            .collect()
    }

    /// Add `related` to the relationship. Existing members are kept.
    pub fn extend(&self, related: &[&T]) -> Result<(), JsonApiError> {
        let resources: Vec<_> = related.iter().map(|r| r.resource()).collect();
        request::update_many_related(
            &self.client,
            self.owner_type,
            self.owner_id.as_deref(),
            &self.relationship_name,
            &resources,
        )
    }
}
