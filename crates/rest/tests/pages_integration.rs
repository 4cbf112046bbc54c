//! Integration tests for the read-only pages: landing, search, comparison,
//! lab directory and health checks.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use labwise_persistence::backends::memory::MemoryBackend;
use labwise_persistence::query::Table;
use labwise_rest::{ServerConfig, create_app_with_config};
use serde_json::{Value, json};

use common::harness::TestApp;

fn names(body: &Value, list: &str, field: &str) -> Vec<String> {
    body[list]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item[field].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Landing
// ============================================================================

#[tokio::test]
async fn test_landing_page() {
    let app = TestApp::seeded();
    let response = app.server.get("/").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["headline"], "Find and Compare Lab Tests Near You");
    assert_eq!(body["packages"].as_array().unwrap().len(), 3);
    assert_eq!(body["search_action"], "/search");
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_without_query_lists_all_tests() {
    let app = TestApp::seeded();
    let response = app.server.get("/search").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["loading"], false);
    assert_eq!(body["error"], Value::Null);
    assert_eq!(body["results"].as_array().unwrap().len(), 15);
}

#[tokio::test]
async fn test_search_filters_by_name() {
    let app = TestApp::seeded();
    let response = app
        .server
        .get("/search")
        .add_query_param("q", "panel")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        names(&body, "results", "name"),
        vec!["Diabetes Panel", "Liver Panel"]
    );
    assert_eq!(
        body["results"][0]["compare_href"],
        "/compare?testId=test-diabetes-panel"
    );
}

#[tokio::test]
async fn test_blank_search_equals_listing() {
    let app = TestApp::seeded();
    let all: Value = app.server.get("/search").await.json();
    let blank: Value = app
        .server
        .get("/search")
        .add_query_param("q", "   ")
        .await
        .json();
    assert_eq!(all["results"], blank["results"]);
}

#[tokio::test]
async fn test_search_descriptions_are_previews() {
    let app = TestApp::seeded();
    let body: Value = app.server.get("/search").await.json();
    let limit = ServerConfig::for_testing().description_preview_length + 3;
    for result in body["results"].as_array().unwrap() {
        assert!(result["description"].as_str().unwrap().chars().count() <= limit);
    }
}

#[tokio::test]
async fn test_search_backend_failure_is_inline() {
    let app = TestApp::seeded();
    app.backend.fail_table(Table::Tests, "connection refused");

    let response = app.server.get("/search").add_query_param("q", "sugar").await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_eq!(body["loading"], false);
    assert_eq!(
        body["error"],
        json!({"code": "query-failed", "message": "Failed to search tests"})
    );
    assert_eq!(body["results"], json!([]));
}

// ============================================================================
// Comparison
// ============================================================================

#[tokio::test]
async fn test_compare_lists_lab_prices() {
    let app = TestApp::seeded();
    let response = app
        .server
        .get("/compare")
        .add_query_param("testId", "test-thyroid-test")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["test"]["name"], "Thyroid Test");
    let mut labs = names(&body, "rows", "lab_name");
    labs.sort();
    assert_eq!(labs, vec!["Dr. Lal PathLabs", "Path Plus Care"]);

    for row in body["rows"].as_array().unwrap() {
        let expected = format!("/book/{}", row["price_id"].as_str().unwrap());
        assert_eq!(row["book_href"], expected);
        if row["lab_name"] == "Path Plus Care" {
            assert_eq!(row["home_collection_fee"], Value::Null);
        }
    }
}

#[tokio::test]
async fn test_compare_without_test_id() {
    let app = TestApp::seeded();
    let response = app.server.get("/compare").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["no_test_selected"], true);
    assert_eq!(body["search_href"], "/search");
    assert_eq!(body["error"], Value::Null);
}

#[tokio::test]
async fn test_compare_unknown_test() {
    let app = TestApp::seeded();
    let response = app
        .server
        .get("/compare")
        .add_query_param("testId", "test-nope")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "not-found");
    assert_eq!(body["loading"], false);
}

// ============================================================================
// Lab directory
// ============================================================================

#[tokio::test]
async fn test_labs_default_city() {
    let app = TestApp::seeded();
    let response = app.server.get("/labs").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["city"], "Jaipur");
    assert_eq!(body["labs"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_labs_other_city_is_empty() {
    let app = TestApp::seeded();
    let body: Value = app
        .server
        .get("/labs")
        .add_query_param("city", "Udaipur")
        .await
        .json();
    assert_eq!(body["labs"], json!([]));
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::seeded();

    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");

    app.server.get("/_liveness").await.assert_status_ok();
    app.server.get("/_readiness").await.assert_status_ok();
}

#[tokio::test]
async fn test_readiness_reports_backend_failure() {
    let app = TestApp::seeded();
    app.backend.fail_table(Table::Labs, "down");

    let response = app.server.get("/_readiness").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "unavailable");
}

// ============================================================================
// Full application
// ============================================================================

#[tokio::test]
async fn test_full_app_serves_pages() {
    let config = ServerConfig {
        enable_cors: true,
        ..ServerConfig::for_testing()
    };
    let app = create_app_with_config(MemoryBackend::seeded(), config);
    let server = TestServer::new(app).expect("Failed to create test server");

    server.get("/").await.assert_status_ok();
    server.get("/search").await.assert_status_ok();
    server.get("/does-not-exist").await.assert_status_not_found();
}
