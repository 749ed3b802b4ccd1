//! Fixture model for unit tests.

use crate::binding::{Attribute, ToMany, ToOne};
use crate::client::Client;
use crate::config::ApiConfig;
use crate::model::{Model, ModelType, Resource};
use crate::registry::Registry;

pub(crate) struct Widget {
    resource: Resource,
}

impl Widget {
    pub const NAME: Attribute<String> = Attribute::writable("name");
    pub const SIZE: Attribute<Option<i64>> = Attribute::writable("size");
    pub const COLOR: Attribute<Option<String>> = Attribute::writable("color");
    pub const SERIAL: Attribute<String> = Attribute::write_once("serial");
    pub const CREATED_AT: Attribute<String> = Attribute::read_only("createdAt");

    pub const PARENT: ToOne<Widget> = ToOne::new("parent");
    pub const CHILDREN: ToMany<Widget> = ToMany::named("children", "children");
}

static WIDGET: ModelType = ModelType {
    name: "Widget",
    type_name: None,
    attributes: &[
        Widget::NAME.spec(),
        Widget::SIZE.spec(),
        Widget::COLOR.spec(),
        Widget::SERIAL.spec(),
        Widget::CREATED_AT.spec(),
    ],
    relationships: &[Widget::PARENT.spec(), Widget::CHILDREN.spec()],
};

impl Model for Widget {
    const MODEL_NAME: &'static str = "Widget";

    fn model_type() -> &'static ModelType {
        &WIDGET
    }

    fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        self.resource == other.resource
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.resource, f)
    }
}

/// Client pointed at a closed port; any request it sends fails.
pub(crate) fn test_client() -> Client {
    let registry = Registry::builder()
        .register::<Widget>()
        .build()
        .expect("widget registry");
    Client::new(
        ApiConfig::new("http://127.0.0.1:1/api/v2", "test-token").expect("config"),
        registry,
    )
    .expect("client")
}
