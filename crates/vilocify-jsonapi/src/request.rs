//! # Query Builder and Request Dispatch
//!
//! [`Query`] accumulates filters, a single sort criterion, and a page size,
//! then either fetches one resource by id or iterates the collection through
//! [`Pages`], following the server's cursor links.
//!
//! ## Wire format
//!
//! | Parameter | Example |
//! |-----------|---------|
//! | filter | `filter[name][eq]=openssl` |
//! | sort | `sort=-createdAt` |
//! | sparse fieldset | `fields[components]=name,version` |
//! | page size | `page[size]=100` |
//!
//! Pages must be fetched in order: the `next` link of a page is only known
//! once that page has been received.

use std::marker::PhantomData;

use serde_json::Value;
use url::Url;

use crate::client::Client;
use crate::error::JsonApiError;
use crate::http::Params;
use crate::model::{Action, Model, ModelType, Resource};
use crate::serializer::{self, Meta, ResourceIter};

/// Page size used when none is set.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Append path segments to `base`, percent-encoding each segment.
pub fn join_url(base: &Url, segments: &[&str]) -> Result<Url, JsonApiError> {
    if !matches!(base.scheme(), "http" | "https") {
        return Err(JsonApiError::InvalidUrl(format!("Bad scheme in base URL {base}")));
    }
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| JsonApiError::InvalidUrl(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments.iter().map(|s| s.trim_matches('/')));
    Ok(url)
}

fn resource_url(client: &Client, model: &ModelType, segments: &[&str]) -> Result<Url, JsonApiError> {
    let type_name = model.type_name();
    let mut all = vec![type_name.as_str()];
    all.extend_from_slice(segments);
    join_url(&client.config().base_url, &all)
}

/// `fields[{type}]=a,b,c`, omitted for models without attributes.
fn fields_param(model: &ModelType) -> Option<(String, String)> {
    let fields = model.attribute_names().collect::<Vec<_>>().join(",");
    (!fields.is_empty()).then(|| (format!("fields[{}]", model.type_name()), fields))
}

fn inclusion_params(relationship_name: &str, target: &ModelType) -> Params {
    let mut params = vec![("include".to_string(), relationship_name.to_string())];
    params.extend(fields_param(target));
    params
}

/// `GET /{type}/{id}`; a `null` resource is an unmapped-model error.
pub(crate) fn fetch_resource(
    client: &Client,
    model: &'static ModelType,
    id: &str,
) -> Result<Resource, JsonApiError> {
    let url = resource_url(client, model, &[id])?;
    let params: Params = fields_param(model).into_iter().collect();
    let document = client.transport().get(&url, &params)?;
    serializer::deserialize_one(model, client, document.as_ref())?.ok_or_else(|| {
        JsonApiError::UnmappedModel(format!(
            "Cannot get resource {} with id {id}",
            model.type_name()
        ))
    })
}

/// `GET /{owner}/{id}/relationships/{name}` for a to-one relationship.
pub(crate) fn get_one_related<T: Model>(
    client: &Client,
    owner: &ModelType,
    owner_id: &str,
    relationship_name: &str,
) -> Result<Option<T>, JsonApiError> {
    let url = resource_url(client, owner, &[owner_id, "relationships", relationship_name])?;
    let params = inclusion_params(relationship_name, T::model_type());
    let document = client.transport().get(&url, &params)?;
    Ok(serializer::deserialize_one(T::model_type(), client, document.as_ref())?.map(T::from_resource))
}

/// Paginated `GET /{owner}/{id}/relationships/{name}` for a to-many relationship.
pub(crate) fn iter_many_related<T: Model>(
    client: &Client,
    owner: &ModelType,
    owner_id: &str,
    relationship_name: &str,
    page_size: u64,
) -> Result<Pages<T>, JsonApiError> {
    let url = resource_url(client, owner, &[owner_id, "relationships", relationship_name])?;
    let mut params = inclusion_params(relationship_name, T::model_type());
    params.push(("page[size]".into(), page_size.to_string()));
    Ok(Pages::new(client, url, params))
}

/// `POST /{owner}/{id}/relationships/{name}`. Adds members; never replaces.
pub(crate) fn update_many_related(
    client: &Client,
    owner: &ModelType,
    owner_id: Option<&str>,
    relationship_name: &str,
    related: &[&Resource],
) -> Result<(), JsonApiError> {
    let owner_id =
        owner_id.ok_or_else(|| JsonApiError::UnmappedModel("Model is unmapped and has no ID".into()))?;
    let url = resource_url(client, owner, &[owner_id, "relationships", relationship_name])?;
    let body = serializer::serialize_many_related(related)?;
    client.transport().post(&url, &body)?;
    Ok(())
}

/// `POST /{type}`, merging the response into `resource`.
pub(crate) fn create_resource(resource: &mut Resource, meta: Option<&Meta>) -> Result<(), JsonApiError> {
    let client = resource.client().clone();
    let url = resource_url(&client, resource.model(), &[])?;
    let body = serializer::serialize_one(resource, meta, Action::Create);
    let document = client.transport().post(&url, &body)?;
    if let Some(fresh) = serializer::deserialize_one(resource.model(), &client, document.as_ref())? {
        resource.merge(fresh);
    }
    Ok(())
}

/// `PATCH /{type}/{id}`, merging the response into `resource`.
pub(crate) fn update_resource(resource: &mut Resource, meta: Option<&Meta>) -> Result<(), JsonApiError> {
    let id = resource
        .id()
        .ok_or_else(|| JsonApiError::UnmappedModel("Model is unmapped and has no ID".into()))?
        .to_string();
    let client = resource.client().clone();
    let url = resource_url(&client, resource.model(), &[id.as_str()])?;
    let body = serializer::serialize_one(resource, meta, Action::Update);
    let document = client.transport().patch(&url, &body)?;
    if let Some(fresh) = serializer::deserialize_one(resource.model(), &client, document.as_ref())? {
        resource.merge(fresh);
    }
    Ok(())
}

/// `DELETE /{type}/{id}` with a `meta` body.
pub(crate) fn delete_resource(resource: &Resource, meta: Option<&Meta>) -> Result<(), JsonApiError> {
    let id = resource
        .id()
        .ok_or_else(|| JsonApiError::UnmappedModel("Model is unmapped and has no ID".into()))?;
    let url = resource_url(resource.client(), resource.model(), &[id])?;
    resource
        .client()
        .transport()
        .delete(&url, &serializer::serialize_meta(meta))?;
    Ok(())
}

/// One `filter[attribute][operator]=value` criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub attribute: String,
    pub operator: String,
    pub value: String,
}

/// Collection query over model `M`.
pub struct Query<M> {
    client: Client,
    filters: Vec<Filter>,
    sorter: Option<String>,
    page_size: u64,
    _model: PhantomData<fn() -> M>,
}

impl<M> std::fmt::Debug for Query<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("filters", &self.filters)
            .field("sorter", &self.sorter)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl<M: Model> Query<M> {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            filters: Vec::new(),
            sorter: None,
            page_size: DEFAULT_PAGE_SIZE,
            _model: PhantomData,
        }
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sorter(&self) -> Option<&str> {
        self.sorter.as_deref()
    }

    pub fn page_size_value(&self) -> u64 {
        self.page_size
    }

    // -- Builder --------------------------------------------------------------

    /// Add `filter[attribute][operator]=value`. Filters are ANDed.
    pub fn filter(mut self, attribute: &str, operator: &str, value: &str) -> Self {
        self.filters.push(Filter {
            attribute: attribute.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Add a filter whose value is a comma-joined list.
    pub fn filter_in<I, S>(self, attribute: &str, operator: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(attribute, operator, &joined)
    }

    /// Sort ascending by `attribute`. Only one sort criterion is allowed.
    pub fn asc(mut self, attribute: &str) -> Result<Self, JsonApiError> {
        if let Some(existing) = &self.sorter {
            return Err(JsonApiError::IllegalSort(format!(
                "Already sorted by `{existing}`. Cannot sort by multiple attributes."
            )));
        }
        self.sorter = Some(attribute.to_string());
        Ok(self)
    }

    /// Sort descending by `attribute`.
    pub fn desc(self, attribute: &str) -> Result<Self, JsonApiError> {
        self.asc(&format!("-{attribute}"))
    }

    pub fn page_size(mut self, size: i64) -> Result<Self, JsonApiError> {
        if size < 1 {
            return Err(JsonApiError::Validation("Page size must be at least 1".into()));
        }
        self.page_size = size as u64;
        Ok(self)
    }

    // -- Reads ----------------------------------------------------------------

    /// Fetch one resource by id.
    pub fn get(&self, id: &str) -> Result<M, JsonApiError> {
        fetch_resource(&self.client, M::model_type(), id).map(M::from_resource)
    }

    /// Query parameters of the first page request.
    pub fn params(&self) -> Params {
        let mut params: Params = self
            .filters
            .iter()
            .map(|f| (format!("filter[{}][{}]", f.attribute, f.operator), f.value.clone()))
            .collect();
        params.push(("page[size]".into(), self.page_size.to_string()));
        params.extend(fields_param(M::model_type()));
        if let Some(sorter) = &self.sorter {
            params.push(("sort".into(), sorter.clone()));
        }
        params
    }

    /// Lazily iterate all matching resources. Every call starts over and
    /// re-issues all requests.
    pub fn iter(&self) -> Pages<M> {
        match resource_url(&self.client, M::model_type(), &[]) {
            Ok(url) => Pages::new(&self.client, url, self.params()),
            Err(e) => Pages::failed(&self.client, e),
        }
    }

    pub fn all(&self) -> Result<Vec<M>, JsonApiError> {
        self.iter().collect()
    }

    /// The first `n` resources. Stops requesting pages once `n` are read.
    pub fn first_n(&self, n: usize) -> Result<Vec<M>, JsonApiError> {
        self.iter().take(n).collect()
    }

    pub fn first(&self) -> Result<Option<M>, JsonApiError> {
        self.iter().next().transpose()
    }

    /// Lazily project each resource onto the given wire attributes.
    ///
    /// `id` selects the resource id. Attributes missing from the sparse
    /// response are fetched per resource.
    pub fn pick_iter<'a>(
        &self,
        attributes: &'a [&'a str],
    ) -> impl Iterator<Item = Result<Vec<Value>, JsonApiError>> + 'a
    where
        M: 'a,
    {
        self.iter().map(move |item| {
            let mut model = item?;
            attributes
                .iter()
                .map(|name| match *name {
                    "id" => Ok(model.id().map_or(Value::Null, |id| Value::String(id.to_string()))),
                    wire => model.resource_mut().read_attribute(wire),
                })
                .collect()
        })
    }

    pub fn pick(&self, attributes: &[&str]) -> Result<Vec<Vec<Value>>, JsonApiError> {
        self.pick_iter(attributes).collect()
    }

    pub fn ids_iter(&self) -> impl Iterator<Item = Result<String, JsonApiError>> {
        self.iter()
            .map(|item| item.map(|m| m.id().unwrap_or_default().to_string()))
    }

    pub fn ids(&self) -> Result<Vec<String>, JsonApiError> {
        self.ids_iter().collect()
    }

    // -- Writes ---------------------------------------------------------------

    pub fn create(&self, obj: &mut M, meta: Option<&Meta>) -> Result<(), JsonApiError> {
        create_resource(obj.resource_mut(), meta)
    }

    pub fn update(&self, obj: &mut M, meta: Option<&Meta>) -> Result<(), JsonApiError> {
        update_resource(obj.resource_mut(), meta)
    }

    pub fn delete(&self, obj: &M, meta: Option<&Meta>) -> Result<(), JsonApiError> {
        delete_resource(obj.resource(), meta)
    }

    /// Add `related` to `owner`'s to-many relationship `relationship_name`.
    pub fn update_many_related<R: Model>(
        &self,
        owner: &M,
        relationship_name: &str,
        related: &[&R],
    ) -> Result<(), JsonApiError> {
        let resources: Vec<&Resource> = related.iter().map(|r| r.resource()).collect();
        update_many_related(
            &self.client,
            M::model_type(),
            owner.id(),
            relationship_name,
            &resources,
        )
    }
}

impl<'q, M: Model> IntoIterator for &'q Query<M> {
    type Item = Result<M, JsonApiError>;
    type IntoIter = Pages<M>;

    fn into_iter(self) -> Pages<M> {
        self.iter()
    }
}

/// Cursor-following iterator over a paginated collection.
///
/// The first request is sent on the first call to `next`. After a page is
/// exhausted its `links.next` is followed until there is none. The first
/// error is yielded once and ends the iteration.
pub struct Pages<M> {
    client: Client,
    model: &'static ModelType,
    initial: Option<(Url, Params)>,
    page: Option<ResourceIter>,
    document: Option<Value>,
    failure: Option<JsonApiError>,
    done: bool,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Pages<M> {
    pub(crate) fn new(client: &Client, url: Url, params: Params) -> Self {
        Self {
            client: client.clone(),
            model: M::model_type(),
            initial: Some((url, params)),
            page: None,
            document: None,
            failure: None,
            done: false,
            _model: PhantomData,
        }
    }

    fn failed(client: &Client, error: JsonApiError) -> Self {
        Self {
            client: client.clone(),
            model: M::model_type(),
            initial: None,
            page: None,
            document: None,
            failure: Some(error),
            done: false,
            _model: PhantomData,
        }
    }

    fn fetch(&mut self, url: Url, params: Params) -> Result<(), JsonApiError> {
        tracing::debug!(model = self.model.name, %url, "fetching page");
        if let Some(document) = self.client.transport().get(&url, &params)? {
            self.page = Some(serializer::deserialize_many(self.model, &self.client, Some(&document))?);
            self.document = Some(document);
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<Option<Resource>, JsonApiError> {
        loop {
            if let Some(page) = self.page.as_mut() {
                if let Some(item) = page.next() {
                    return item.map(Some);
                }
                self.page = None;
                let Some(document) = self.document.take() else {
                    return Ok(None);
                };
                let Some(next) = serializer::deserialize_next_link(&document)? else {
                    return Ok(None);
                };
                let url = self
                    .client
                    .config()
                    .api_host
                    .join(&next)
                    .map_err(|e| JsonApiError::InvalidUrl(format!("{next}: {e}")))?;
                self.fetch(url, Vec::new())?;
            } else if let Some((url, params)) = self.initial.take() {
                self.fetch(url, params)?;
            } else {
                return Ok(None);
            }
        }
    }
}

impl<M: Model> Iterator for Pages<M> {
    type Item = Result<M, JsonApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(error) = self.failure.take() {
            self.done = true;
            return Some(Err(error));
        }
        match self.advance() {
            Ok(Some(resource)) => Some(Ok(M::from_resource(resource))),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
