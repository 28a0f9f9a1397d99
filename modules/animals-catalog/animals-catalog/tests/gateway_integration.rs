#![allow(clippy::unwrap_used, clippy::expect_used, clippy::use_debug)]

//! End-to-end tests of the data layer over a real HTTP gateway.

use std::sync::Arc;
use std::time::Duration;

use animals_catalog::{
    AnimalsCatalog, GraphQlClient, ListStatus, LoadOutcome, QueryExecutor,
    domain::list::{AnimalFilter, NoFilter},
};
use animals_catalog_sdk::{AnimalId, AnimalsCatalogClientV1, AnimalsQuery, CatalogError, PersonId};
use httpmock::prelude::*;
use serde_json::{Value, json};

fn endpoint(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}/graphql", server.port())
}

fn client(server: &MockServer) -> GraphQlClient {
    GraphQlClient::builder(endpoint(server))
        .allow_insecure_http()
        .build()
        .unwrap()
}

fn catalog(server: &MockServer, page_size: u32) -> AnimalsCatalog {
    AnimalsCatalog::with_executor(Arc::new(client(server)), page_size)
}

fn animal(id: i64, name: &str, species: &str, weight: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "dateOfBirth": "2019-06-01",
        "species": species,
        "breed": "Mixed",
        "color": "000000",
        "weight": weight,
    })
}

#[tokio::test]
async fn animal_list_pages_accumulate_over_http() {
    let server = MockServer::start();
    let page_one = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .header("content-type", "application/json")
            .body_includes(r#""operationName":"GetAnimals""#)
            .body_includes(r#""page":1"#);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "data": { "animals": {
                "items": [animal(1, "Rex", "Dog", 9_000), animal(2, "Tom", "Cat", 4_000)],
                "total": 3,
                "hasMore": true
            }}}));
    });
    let page_two = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_includes(r#""operationName":"GetAnimals""#)
            .body_includes(r#""page":2"#);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "data": { "animals": {
                "items": [animal(3, "Kit", "Cat", 3_500)],
                "total": 3,
                "hasMore": false
            }}}));
    });

    let list = catalog(&server, 2).animal_list();
    assert_eq!(list.apply_query(AnimalsQuery::default()).await, LoadOutcome::Loaded);
    assert_eq!(list.load_more().await, LoadOutcome::Appended);
    assert!(!list.can_load_more());

    let view = list.view(&NoFilter);
    assert_eq!(view.status, ListStatus::Ready);
    assert_eq!(view.loaded, 3);
    assert_eq!(view.total, 3);

    let cats = AnimalFilter {
        species: Some("cat".to_owned()),
        ..AnimalFilter::default()
    };
    let names: Vec<_> = list.view(&cats).items.into_iter().map(|a| a.name).collect();
    assert_eq!(names, ["Tom", "Kit"]);

    page_one.assert_calls(1);
    page_two.assert_calls(1);
}

#[tokio::test]
async fn error_payload_maps_to_remote_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "data": null,
                "errors": [{ "message": "Cannot query field", "path": ["animals"] }]
            }));
    });

    let err = catalog(&server, 10)
        .animals()
        .heaviest()
        .await
        .unwrap_err();
    let CatalogError::Remote { errors } = err else {
        panic!("expected remote error, got {err:?}");
    };
    assert_eq!(errors[0].message, "Cannot query field");
    assert_eq!(errors[0].path.as_deref(), Some("animals"));
}

#[tokio::test]
async fn non_json_server_error_maps_to_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(502)
            .header("content-type", "text/html")
            .body("<html>Bad Gateway</html>");
    });

    let err = catalog(&server, 10)
        .persons()
        .top_owner()
        .await
        .unwrap_err();
    assert!(
        matches!(&err, CatalogError::Transport { message } if message.contains("502")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn null_detail_maps_to_not_found() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_includes(r#""operationName":"GetPerson""#)
            .body_includes(r#""variables":{"id":42}"#);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "data": { "person": null } }));
    });

    let err = catalog(&server, 10)
        .client()
        .get_person(PersonId(42))
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::not_found("Person", 42));
    mock.assert_calls(1);
}

#[tokio::test]
async fn detail_lookups_are_served_from_cache() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_includes(r#""operationName":"GetAnimal""#);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "data": { "animal": animal(7, "Bolt", "Dog", 12_000) } }));
    });

    let client = catalog(&server, 10).client();
    for _ in 0..3 {
        let animal = client.get_animal(AnimalId(7)).await.unwrap();
        assert_eq!(animal.name, "Bolt");
    }
    mock.assert_calls(1);
}

#[tokio::test]
async fn statistics_fan_out_over_http() {
    let server = MockServer::start();
    let reply = |op: &'static str, data: Value| {
        server.mock(move |when, then| {
            when.method(POST)
                .path("/graphql")
                .body_includes(format!(r#""operationName":"{op}""#));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "data": data }));
        })
    };
    let owner = json!({ "id": 1, "firstName": "Ann", "lastName": "Lee",
                        "email": "ann@example.com", "animals": [] });
    let mocks = [
        reply(
            "GetMostCommonSpecies",
            json!({ "mostCommonSpecies": [{ "species": "Dog", "count": 3 }] }),
        ),
        reply(
            "GetTopOwner",
            json!({ "topOwner": { "owner": owner, "animalCount": 4 } }),
        ),
        reply(
            "GetOwnerWithHeaviestPets",
            json!({ "ownerWithHeaviestPets": {
                "owner": owner, "animalCount": 2, "totalWeight": 52000
            }}),
        ),
        reply(
            "GetHeaviestAnimal",
            json!({ "heaviestAnimal": animal(5, "Tank", "Dog", 40_000) }),
        ),
        reply(
            "GetOldestAnimal",
            json!({ "oldestAnimal": animal(6, "Gran", "Cat", 3_000) }),
        ),
    ];

    let statistics = catalog(&server, 10).statistics();
    let stats = statistics.load().await.unwrap();
    assert_eq!(stats.heaviest_animal.name, "Tank");
    assert_eq!(stats.top_owner.animal_count, 4);
    assert_eq!(stats.owner_with_heaviest_pets.total_weight_grams, 52_000);

    statistics.load().await.unwrap();
    for mock in &mocks {
        mock.assert_calls(1);
    }
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .header("content-type", "application/json")
            .body("x".repeat(4_096));
    });
    let client = GraphQlClient::builder(endpoint(&server))
        .allow_insecure_http()
        .max_body_size(1_024)
        .build()
        .unwrap();

    let err = client
        .execute(animals_catalog::Operation::GetOldestAnimal, json!({}))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, CatalogError::Transport { message } if message.contains("1024 bytes")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn unresponsive_server_times_out() {
    // Accepts connections and never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hold = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let client = GraphQlClient::builder(format!("http://127.0.0.1:{port}/graphql"))
        .allow_insecure_http()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let err = client
        .execute(animals_catalog::Operation::GetHeaviestAnimal, json!({}))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, CatalogError::Transport { message } if message.contains("timed out")),
        "unexpected error: {err:?}"
    );
    hold.abort();
}
