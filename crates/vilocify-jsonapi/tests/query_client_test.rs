//! Contract tests for query building and cursor pagination.

mod common;

use common::{gadget_doc, jsonapi, Gadget, TestServer};
use serde_json::json;
use vilocify_jsonapi::{JsonApiError, Model};
use wiremock::matchers::{method, path, query_param};
use wiremock::Mock;

#[test]
fn iteration_follows_next_link_with_exactly_two_requests() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .and(query_param("page[size]", "2"))
            .respond_with(jsonapi(
                200,
                json!({
                    "data": [gadget_doc("1", "a"), gadget_doc("2", "b")],
                    "links": {"next": "/api/v2/gadgets?page[after]=c2"}
                }),
            ))
            .expect(1),
    );
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .and(query_param("page[after]", "c2"))
            .respond_with(jsonapi(
                200,
                json!({"data": [gadget_doc("3", "c")], "links": {"next": null}}),
            ))
            .expect(1),
    );

    let client = srv.client();
    let gadgets = Gadget::query(&client).page_size(2).unwrap().all().unwrap();
    let names: Vec<String> = gadgets
        .into_iter()
        .map(|g| Gadget::NAME.peek(&g).unwrap().unwrap())
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn absolute_next_link_is_followed() {
    let srv = TestServer::start();
    let next = format!("{}/api/v2/gadgets?page[after]=xyz", srv.uri());
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .and(query_param("page[size]", "100"))
            .respond_with(jsonapi(
                200,
                json!({"data": [gadget_doc("1", "a")], "links": {"next": next}}),
            ))
            .expect(1),
    );
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .and(query_param("page[after]", "xyz"))
            .respond_with(jsonapi(200, json!({"data": [gadget_doc("2", "b")], "links": {}})))
            .expect(1),
    );

    let client = srv.client();
    assert_eq!(Gadget::query(&client).ids().unwrap(), ["1", "2"]);
}

#[test]
fn query_sends_filters_sort_and_sparse_fieldset() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .and(query_param("filter[name][eq]", "openssl"))
            .and(query_param("filter[version][in]", "1.0,1.1"))
            .and(query_param("sort", "-createdAt"))
            .and(query_param("fields[gadgets]", "name,version,serial,createdAt"))
            .and(query_param("page[size]", "100"))
            .respond_with(jsonapi(200, json!({"data": [gadget_doc("7", "openssl")], "links": {}})))
            .expect(1),
    );

    let client = srv.client();
    let found = Gadget::filter(&client, "name", "eq", "openssl")
        .filter_in("version", "in", ["1.0", "1.1"])
        .desc("createdAt")
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), Some("7"));
}

#[test]
fn first_n_stops_before_the_next_page() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .and(query_param("page[size]", "100"))
            .respond_with(jsonapi(
                200,
                json!({
                    "data": [gadget_doc("1", "a"), gadget_doc("2", "b"), gadget_doc("3", "c")],
                    "links": {"next": "/api/v2/gadgets?page[after]=c3"}
                }),
            ))
            .expect(1),
    );
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .and(query_param("page[after]", "c3"))
            .respond_with(jsonapi(200, json!({"data": [], "links": {}})))
            .expect(0),
    );

    let client = srv.client();
    let two = Gadget::first_n(&client, 2).unwrap();
    assert_eq!(two.len(), 2);
    assert_eq!(two[1].id(), Some("2"));
}

#[test]
fn first_of_empty_collection_is_none() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .respond_with(jsonapi(200, json!({"data": [], "links": {}})))
            .expect(1),
    );

    let client = srv.client();
    assert!(Gadget::first(&client).unwrap().is_none());
}

#[test]
fn every_iteration_reissues_requests() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .respond_with(jsonapi(200, json!({"data": [gadget_doc("1", "a")], "links": {}})))
            .expect(2),
    );

    let client = srv.client();
    let query = Gadget::query(&client);
    assert_eq!(query.iter().count(), 1);
    assert_eq!((&query).into_iter().count(), 1);
}

#[test]
fn failing_page_yields_one_error_and_ends() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .respond_with(jsonapi(403, json!({"errors": [{"title": "Forbidden"}]})))
            .expect(1),
    );

    let client = srv.client();
    let mut pages = Gadget::iter(&client);
    let err = pages.next().unwrap().unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(pages.next().is_none());
}

#[test]
fn get_by_id_fetches_sparse_fieldset() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets/42"))
            .and(query_param("fields[gadgets]", "name,version,serial,createdAt"))
            .respond_with(jsonapi(200, json!({"data": gadget_doc("42", "lamp")})))
            .expect(1),
    );

    let client = srv.client();
    let mut gadget: Gadget = client.get("42").unwrap();
    assert_eq!(gadget.read(&Gadget::NAME).unwrap(), "lamp");
    assert_eq!(gadget.read(&Gadget::VERSION).unwrap().as_deref(), Some("1.0"));
}

#[test]
fn get_of_null_resource_is_unmapped() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets/9"))
            .respond_with(jsonapi(200, json!({"data": null}))),
    );

    let client = srv.client();
    let err = Gadget::get(&client, "9").unwrap_err();
    assert!(matches!(err, JsonApiError::UnmappedModel(_)), "{err:?}");
    assert!(err.to_string().contains("Cannot get resource gadgets with id 9"));
}

#[test]
fn pick_projects_id_and_attributes() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .respond_with(jsonapi(
                200,
                json!({"data": [gadget_doc("1", "a"), gadget_doc("2", "b")], "links": {}}),
            ))
            .expect(1),
    );

    let client = srv.client();
    let rows = Gadget::query(&client).pick(&["id", "name"]).unwrap();
    assert_eq!(rows, vec![vec![json!("1"), json!("a")], vec![json!("2"), json!("b")]]);
}

#[test]
fn null_items_in_a_page_are_skipped() {
    let srv = TestServer::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/api/v2/gadgets"))
            .respond_with(jsonapi(
                200,
                json!({"data": [gadget_doc("1", "a"), null, gadget_doc("2", "b")], "links": {}}),
            )),
    );

    let client = srv.client();
    assert_eq!(Gadget::query(&client).ids().unwrap(), ["1", "2"]);
}
