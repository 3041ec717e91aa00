//! Mock substitute: request matching, rendering and recording over real HTTP.

use pactum::domain::contract::{Interaction, InteractionBuilder, Request, Response};
use pactum::domain::matching::{find_match, IncomingRequest};
use pactum::mock::MockServer;
use serde_json::{json, Value};

fn interaction(description: &str, request: Request, response: Response) -> Interaction {
    InteractionBuilder::new()
        .upon_receiving(description)
        .with_request(request)
        .will_respond_with(response)
        .build()
        .unwrap()
}

async fn started(interactions: Vec<Interaction>) -> (MockServer, String) {
    let mut server = MockServer::new();
    for i in interactions {
        server.register(i).await;
    }
    server.start().await.unwrap();
    let url = server.base_url().unwrap();
    (server, url)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn first_registered_interaction_wins() -> Result<(), Box<dyn std::error::Error>> {
    let a = interaction(
        "A",
        Request::new("GET", "/users/1"),
        Response::new(200).with_body(json!({"from": "A"})),
    );
    let b = interaction(
        "B",
        Request::new("GET", "/users/1"),
        Response::new(200).with_body(json!({"from": "B"})),
    );
    let (mut server, url) = started(vec![a, b]).await;

    let body: Value = reqwest::get(format!("{}/users/1", url)).await?.json().await?;
    assert_eq!(body, json!({"from": "A"}));

    let recorded = server.recorded_interactions().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].description, "A");

    server.stop().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unmatched_request_is_a_server_error_and_not_recorded() -> Result<(), Box<dyn std::error::Error>> {
    let (mut server, url) = started(vec![interaction(
        "get user",
        Request::new("GET", "/users/1"),
        Response::new(200),
    )])
    .await;

    let response = reqwest::Client::new()
        .post(format!("{}/orders", url))
        .send()
        .await?;
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await?;
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/orders");
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("POST") && error.contains("/orders"), "{}", error);

    assert!(server.recorded_interactions().await.is_empty());
    server.stop().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn responses_are_rendered_with_status_headers_and_body() -> Result<(), Box<dyn std::error::Error>> {
    let (mut server, url) = started(vec![
        interaction(
            "create user",
            Request::new("POST", "/users"),
            Response::new(201)
                .with_header("Location", "/users/9")
                .with_body(json!({"id": 9})),
        ),
        interaction(
            "plain text",
            Request::new("GET", "/motd"),
            Response::new(200)
                .with_header("Content-Type", "text/plain")
                .with_body("hello"),
        ),
        interaction("no body", Request::new("DELETE", "/users/9"), Response::new(204)),
    ])
    .await;
    let client = reqwest::Client::new();

    let created = client.post(format!("{}/users", url)).send().await?;
    assert_eq!(created.status(), 201);
    assert_eq!(created.headers()["location"], "/users/9");
    assert!(created.headers()["content-type"]
        .to_str()?
        .starts_with("application/json"));
    assert_eq!(created.json::<Value>().await?, json!({"id": 9}));

    let text = client.get(format!("{}/motd", url)).send().await?;
    assert_eq!(text.headers()["content-type"], "text/plain");
    assert_eq!(text.text().await?, "hello");

    let deleted = client.delete(format!("{}/users/9", url)).send().await?;
    assert_eq!(deleted.status(), 204);
    assert!(deleted.text().await?.is_empty());

    let order: Vec<String> = server
        .recorded_interactions()
        .await
        .into_iter()
        .map(|i| i.description)
        .collect();
    assert_eq!(order, ["create user", "plain text", "no body"]);

    server.stop().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn query_and_headers_take_part_in_matching() -> Result<(), Box<dyn std::error::Error>> {
    let (mut server, url) = started(vec![
        interaction(
            "json search",
            Request::new("GET", "/search")
                .with_query("q", ["rust"])
                .with_header("Accept", "application/json"),
            Response::new(200).with_body(json!({"kind": "json"})),
        ),
        interaction(
            "any search",
            Request::new("GET", "/search"),
            Response::new(200).with_body(json!({"kind": "any"})),
        ),
    ])
    .await;
    let client = reqwest::Client::new();

    let exact: Value = client
        .get(format!("{}/search?q=rust", url))
        .header("accept", "application/json")
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(exact["kind"], "json");

    let fallback: Value = client
        .get(format!("{}/search?q=go", url))
        .header("accept", "application/json")
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(fallback["kind"], "any");

    server.stop().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn health_clear_and_stop() -> Result<(), Box<dyn std::error::Error>> {
    let (mut server, url) = started(vec![interaction(
        "ping",
        Request::new("GET", "/ping"),
        Response::new(200),
    )])
    .await;
    let client = reqwest::Client::new();

    let health = client.get(format!("{}/health", url)).send().await?;
    assert_eq!(health.status(), 200);
    assert_eq!(health.text().await?, "OK");

    assert_eq!(client.get(format!("{}/ping", url)).send().await?.status(), 200);
    server.clear().await;
    assert!(server.recorded_interactions().await.is_empty());
    assert_eq!(client.get(format!("{}/ping", url)).send().await?.status(), 500);

    assert!(server.start().await.is_err(), "second start must be refused");

    server.stop().await?;
    assert!(!server.is_running());
    assert!(server.base_url().is_err());
    assert!(reqwest::Client::new()
        .get(format!("{}/health", url))
        .send()
        .await
        .is_err());
    Ok(())
}

#[test]
fn method_comparison_ignores_case() {
    let mut lower = interaction("lower", Request::new("GET", "/a"), Response::new(200));
    lower.request.method = "get".to_string();
    let interactions = vec![lower];
    let request = IncomingRequest::new("GET", "/a");
    assert_eq!(
        find_match(&request, &interactions).map(|i| i.description.as_str()),
        Some("lower")
    );
    assert!(find_match(&IncomingRequest::new("GET", "/a/"), &interactions).is_none());
}
