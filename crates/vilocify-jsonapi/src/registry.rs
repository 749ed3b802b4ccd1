//! Registry of model types, built in two phases.
//!
//! Model types are first collected with [`RegistryBuilder::register`]; then
//! [`RegistryBuilder::build`] resolves every relationship target by name and
//! fixes its wire name. Unresolved targets fail the build, so relationship
//! lookups at request time cannot hit a dangling name.

use std::collections::HashMap;

use crate::error::JsonApiError;
use crate::model::{Model, ModelType, RelationshipKind};

/// A relationship with its target resolved.
#[derive(Debug, Clone)]
pub struct ResolvedRelationship {
    pub kind: RelationshipKind,
    pub target: &'static ModelType,
    /// Name used in `/relationships/{name}` URLs and linkage objects.
    pub wire_name: String,
}

#[derive(Debug, Default)]
pub struct Registry {
    models: HashMap<&'static str, &'static ModelType>,
    /// Owner model name, then relationship field.
    relationships: HashMap<&'static str, HashMap<&'static str, ResolvedRelationship>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// A registry without any model types.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn model(&self, name: &str) -> Result<&'static ModelType, JsonApiError> {
        self.models
            .get(name)
            .copied()
            .ok_or_else(|| JsonApiError::Registry(format!("model type `{name}` is not registered")))
    }

    pub fn relationship(
        &self,
        owner: &str,
        field: &str,
    ) -> Result<&ResolvedRelationship, JsonApiError> {
        self.relationships
            .get(owner)
            .and_then(|fields| fields.get(field))
            .ok_or_else(|| {
                JsonApiError::Registry(format!("relationship `{owner}.{field}` is not registered"))
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    models: Vec<&'static ModelType>,
}

impl RegistryBuilder {
    pub fn register<M: Model>(self) -> Self {
        self.register_type(M::model_type())
    }

    pub fn register_type(mut self, model: &'static ModelType) -> Self {
        self.models.push(model);
        self
    }

    /// Resolve every relationship target and freeze the registry.
    pub fn build(self) -> Result<Registry, JsonApiError> {
        let mut models = HashMap::new();
        for model in &self.models {
            if models.insert(model.name, *model).is_some() {
                return Err(JsonApiError::Registry(format!(
                    "model type `{}` registered twice",
                    model.name
                )));
            }
        }

        let mut relationships = HashMap::new();
        for model in &self.models {
            for spec in model.relationships {
                let target = models.get(spec.target).copied().ok_or_else(|| {
                    JsonApiError::Registry(format!(
                        "unresolved relationship target `{}` declared on `{}.{}`",
                        spec.target, model.name, spec.field
                    ))
                })?;
                let wire_name = match (spec.name, spec.kind) {
                    (Some(name), _) => name.to_string(),
                    (None, RelationshipKind::ToOne) => singular(&target.type_name()),
                    (None, RelationshipKind::ToMany) => target.type_name(),
                };
                tracing::trace!(owner = model.name, field = spec.field, %wire_name, "resolved relationship");
                relationships.entry(model.name).or_insert_with(HashMap::new).insert(
                    spec.field,
                    ResolvedRelationship {
                        kind: spec.kind,
                        target,
                        wire_name,
                    },
                );
            }
        }

        Ok(Registry {
            models,
            relationships,
        })
    }
}

/// `components` → `component`, `vulnerabilities` → `vulnerability`.
fn singular(type_name: &str) -> String {
    if let Some(stem) = type_name.strip_suffix("ies") {
        format!("{stem}y")
    } else {
        type_name.strip_suffix('s').unwrap_or(type_name).to_string()
    }
}
