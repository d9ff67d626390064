use std::time::Duration;

use monday_client::{ClientConfig, MondayClient, MondayError, RequestOptions, aggregated_items};
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, request: RequestOptions) -> MondayClient {
    let mut config = ClientConfig::new("test-token");
    config.api_url = Url::parse(&format!("{}/v2", server.uri())).unwrap();
    config.request = request;
    MondayClient::new(config).unwrap()
}

fn fast() -> RequestOptions {
    RequestOptions {
        timeout: Duration::from_millis(200),
        retries: 3,
        retry_delay: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn test_sends_headers_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2"))
        .and(header("Authorization", "test-token"))
        .and(header("API-Version", "2024-01"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "query": "query { me { name } }",
            "variables": { "id": 5 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "me": { "name": "Ada" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, fast());
    let vars = json!({ "id": 5 });

    let data: Value = client
        .execute_query("query { me { name } }", vars.as_object(), None)
        .await
        .unwrap();

    assert_eq!(data, json!({ "me": { "name": "Ada" } }));
}

#[tokio::test]
async fn test_http_500_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, fast())
        .execute_query::<Value>("{ me { id } }", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MondayError::Status { status: 500, .. }));
    assert_eq!(err.to_string(), "HTTP error 500 Internal Server Error");
}

#[tokio::test]
async fn test_graphql_errors_fail_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "boards": [] },
            "errors": [{ "message": "Complexity budget exhausted" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, fast())
        .execute_query::<Value>("{ boards { id } }", None, None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "GraphQL errors: Complexity budget exhausted");
}

#[tokio::test]
async fn test_slow_server_times_out_after_all_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": {} }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client(&server, fast())
        .execute_query::<Value>("{ me { id } }", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MondayError::Timeout { attempts: 3, timeout_ms: 200 }));
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
}

#[tokio::test]
async fn test_connection_refused_not_retried() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let mut config = ClientConfig::new("test-token");
    config.api_url = Url::parse(&format!("http://{addr}/v2")).unwrap();
    let client = MondayClient::new(config).unwrap();

    let err = client
        .execute_query::<Value>("{ me { id } }", None, Some(&fast()))
        .await
        .unwrap_err();

    assert!(matches!(err, MondayError::Http(_)));
}

#[tokio::test]
async fn test_paginates_against_server() {
    let server = MockServer::start().await;
    let query = "query ($limit: Int!, $cursor: String) { boards(ids: [1]) { items_page(limit: $limit, cursor: $cursor) { cursor items { id } } } }";

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "cursor": "c1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "boards": [{ "items_page": { "cursor": null, "items": [{ "id": "3" }] } }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "limit": 500 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "boards": [{ "items_page": { "cursor": "c1", "items": [{ "id": "1" }, { "id": "2" }] } }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, fast())
        .execute_paginated_query(query, None, None, None)
        .await
        .unwrap();

    let ids: Vec<&str> = aggregated_items(&result)
        .iter()
        .filter_map(|item| item["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}
