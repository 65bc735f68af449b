//! Region catalog download tests against a local mock server

use awsping::{catalog::CatalogClient, error::AppError, USER_AGENT};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG: &str = r#"{
    "us-east-1": "US East (N. Virginia)",
    "eu-central-1": "Europe (Frankfurt)",
    "cn-north-1": "China (Beijing)",
    "ap-south-1": "Asia Pacific (Mumbai)"
}"#;

async fn serve(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions.json"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

fn client() -> CatalogClient {
    CatalogClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_orders_regions_by_code() {
    let server = serve(200, CATALOG).await;

    let set = client().fetch(&format!("{}/regions.json", server.uri())).await.unwrap();

    assert_eq!(set.codes(), vec!["ap-south-1", "cn-north-1", "eu-central-1", "us-east-1"]);
    assert_eq!(set.get("eu-central-1").unwrap().name(), "Europe (Frankfurt)");
    assert!(set.iter().all(|endpoint| endpoint.samples().is_empty()));
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .expect(1)
        .mount(&server)
        .await;

    client().fetch(&format!("{}/any.json", server.uri())).await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_a_fetch_error() {
    let server = serve(500, "oops").await;

    let error = client().fetch(&format!("{}/regions.json", server.uri())).await.unwrap_err();

    assert!(matches!(error, AppError::CatalogFetch(ref msg) if msg.contains("500")), "{:?}", error);
    assert_eq!(error.exit_code(), 4);
}

#[tokio::test]
async fn test_missing_catalog_is_a_fetch_error() {
    let server = serve(200, CATALOG).await;

    let error = client().fetch(&format!("{}/elsewhere.json", server.uri())).await.unwrap_err();

    assert!(matches!(error, AppError::CatalogFetch(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_a_fetch_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/regions.json", listener.local_addr().unwrap());
    drop(listener);

    let error = client().fetch(&url).await.unwrap_err();

    assert!(matches!(error, AppError::CatalogFetch(_)), "{:?}", error);
}

#[tokio::test]
async fn test_malformed_catalog_is_a_decode_error() {
    for body in ["<html>rate limited</html>", r#"["us-east-1"]"#, r#"{"us-east-1": {"name": "x"}}"#] {
        let server = serve(200, body).await;

        let error = client().fetch(&format!("{}/regions.json", server.uri())).await.unwrap_err();

        assert!(matches!(error, AppError::CatalogDecode(_)), "{} gave {:?}", body, error);
    }
}

#[tokio::test]
async fn test_empty_catalog_is_a_decode_error() {
    let server = serve(200, "{}").await;

    let error = client().fetch(&format!("{}/regions.json", server.uri())).await.unwrap_err();

    assert!(matches!(error, AppError::CatalogDecode(_)));
}
