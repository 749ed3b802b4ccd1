//! Shared fixtures for the contract tests.
//!
//! The client is blocking, so each test owns a tokio runtime that only
//! drives wiremock; requests are sent from the test thread itself.

#![allow(dead_code)]

use serde_json::Value;
use vilocify_jsonapi::{
    ApiConfig, Attribute, Client, Model, ModelType, Registry, Resource, ToMany, ToOne,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const JSONAPI: &str = "application/vnd.api+json";

/// A wiremock server plus the runtime it is driven by.
pub struct TestServer {
    // Dropped before the runtime so expectations are verified first.
    pub server: MockServer,
    runtime: tokio::runtime::Runtime,
}

impl TestServer {
    pub fn start() -> Self {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn client(&self) -> Client {
        Client::new(
            ApiConfig::local_mock(&self.server.uri(), "test-token").unwrap(),
            registry(),
        )
        .unwrap()
    }

    pub fn received(&self) -> Vec<wiremock::Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }
}

/// A response carrying a JSON:API document.
pub fn jsonapi(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.to_string(), JSONAPI)
}

pub fn gadget_doc(id: &str, name: &str) -> Value {
    serde_json::json!({
        "type": "gadgets",
        "id": id,
        "attributes": {"name": name, "version": "1.0", "serial": format!("s-{id}"), "createdAt": "2025-01-01T00:00:00Z"}
    })
}

pub struct Gadget {
    resource: Resource,
}

impl Gadget {
    pub const NAME: Attribute<String> = Attribute::writable("name");
    pub const VERSION: Attribute<Option<String>> = Attribute::writable("version");
    pub const SERIAL: Attribute<String> = Attribute::write_once("serial");
    pub const CREATED_AT: Attribute<String> = Attribute::read_only("createdAt");

    pub const OWNER: ToOne<Person> = ToOne::named("owner", "owner");
    pub const PARTS: ToMany<Gadget> = ToMany::named("parts", "parts");
}

static GADGET: ModelType = ModelType {
    name: "Gadget",
    type_name: None,
    attributes: &[
        Gadget::NAME.spec(),
        Gadget::VERSION.spec(),
        Gadget::SERIAL.spec(),
        Gadget::CREATED_AT.spec(),
    ],
    relationships: &[Gadget::OWNER.spec(), Gadget::PARTS.spec()],
};

impl Model for Gadget {
    const MODEL_NAME: &'static str = "Gadget";

    fn model_type() -> &'static ModelType {
        &GADGET
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

impl PartialEq for Gadget {
    fn eq(&self, other: &Self) -> bool {
        self.resource == other.resource
    }
}

impl std::fmt::Debug for Gadget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.resource, f)
    }
}

pub struct Person {
    resource: Resource,
}

impl Person {
    pub const EMAIL: Attribute<String> = Attribute::write_once("email");
}

static PERSON: ModelType = ModelType {
    name: "Person",
    type_name: Some("people"),
    attributes: &[Person::EMAIL.spec()],
    relationships: &[],
};

impl Model for Person {
    const MODEL_NAME: &'static str = "Person";

    fn model_type() -> &'static ModelType {
        &PERSON
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

impl std::fmt::Debug for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.resource, f)
    }
}

pub fn registry() -> Registry {
    Registry::builder()
        .register::<Gadget>()
        .register::<Person>()
        .build()
        .unwrap()
}
