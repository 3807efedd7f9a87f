//! Error-to-HTTP mapping through a real router

#![allow(dead_code)]

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{parse_body, request, test_router, LogCapture};

fn valid_signup() -> serde_json::Value {
    json!({ "email": "dev@example.com", "password": "correct horse", "age": 30 })
}

#[tokio::test]
async fn test_health_returns_ok() {
    let response = test_router()
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_valid_payload_passes_through() {
    let response = test_router()
        .oneshot(request(Method::POST, "/v1/signups", Some(valid_signup())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_body(response).await,
        json!({ "email": "dev@example.com" })
    );
}

#[tokio::test]
async fn test_deadline_exceeded_is_408() {
    let response = test_router()
        .oneshot(request(Method::GET, "/v1/slow", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(
        parse_body(response).await,
        json!({ "error": "request canceled or deadline exceeded" })
    );
}

#[tokio::test]
async fn test_extractor_validation_failure_is_422_with_one_entry_per_field() {
    let payload = json!({ "email": "nope", "password": "short", "age": 30 });
    let response = test_router()
        .oneshot(request(Method::POST, "/v1/signups", Some(payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = parse_body(response).await;
    assert_eq!(body["error"], "invalid data provided");

    let detail = body["detail"].as_object().unwrap();
    assert_eq!(detail.len(), 2);
    assert_eq!(
        detail["emailAddress"],
        "emailAddress must be a valid email address"
    );
    assert_eq!(
        detail["password"],
        "password must be at least 8 characters in length"
    );
}

#[tokio::test]
async fn test_handler_validation_failure_is_422() {
    let payload = json!({ "email": "nope", "password": "correct horse", "age": 9 });
    let response = test_router()
        .oneshot(request(Method::POST, "/v1/signups/manual", Some(payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = parse_body(response).await;
    let detail = body["detail"].as_object().unwrap();
    assert_eq!(detail.len(), 2);
    assert!(detail["age"]
        .as_str()
        .is_some_and(|msg| msg.starts_with("age must be 13")));
    // Same field names as the extractor path
    assert_eq!(
        detail["emailAddress"],
        "emailAddress must be a valid email address"
    );
    assert!(!detail.contains_key("email"));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let response = test_router()
        .oneshot(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/v1/signups")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_content_type_is_415() {
    let response = test_router()
        .oneshot(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/v1/signups")
                .body(axum::body::Body::from(valid_signup().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = parse_body(response).await;
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
}

#[tokio::test]
async fn test_tagged_errors_use_their_status() {
    let cases = [
        ("/v1/teams/taken", StatusCode::CONFLICT, "team slug already taken"),
        ("/v1/rows/missing", StatusCode::NOT_FOUND, "resource not found"),
        ("/v1/feature", StatusCode::NOT_IMPLEMENTED, "not implemented"),
    ];

    for (uri, status, message) in cases {
        let response = test_router()
            .oneshot(request(Method::GET, uri, None))
            .await
            .unwrap();

        assert_eq!(response.status(), status, "{uri}");
        assert_eq!(parse_body(response).await, json!({ "error": message }));
    }
}

#[tokio::test]
async fn test_opaque_error_is_500_and_cause_only_logged() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let response = test_router()
        .oneshot(request(Method::GET, "/v1/leaky", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = parse_body(response).await;
    assert_eq!(body, json!({ "error": "internal server error" }));
    assert!(!body.to_string().contains("hunter2"));

    let lines = logs.lines();
    assert_eq!(lines.len(), 1, "expected one log line, got {lines:?}");
    assert!(lines[0].contains("hunter2"));
    assert!(lines[0].contains("ERROR"));
}

#[tokio::test]
async fn test_each_failed_request_logs_once() {
    let cases = [
        request(Method::GET, "/v1/slow", None),
        request(
            Method::POST,
            "/v1/signups",
            Some(json!({ "email": "nope", "password": "short", "age": 1 })),
        ),
        request(Method::GET, "/v1/teams/taken", None),
    ];

    for req in cases {
        let logs = LogCapture::default();
        let _guard = logs.install();

        let response = test_router().oneshot(req).await.unwrap();
        assert!(!response.status().is_success());
        assert_eq!(logs.lines().len(), 1, "{:?}", logs.lines());
    }
}

#[tokio::test]
async fn test_failure_events_carry_status_code_and_error() {
    let cases = [
        (request(Method::GET, "/v1/slow", None), 408),
        (
            request(
                Method::POST,
                "/v1/signups",
                Some(json!({ "email": "nope", "password": "short", "age": 1 })),
            ),
            422,
        ),
        (request(Method::GET, "/v1/teams/taken", None), 409),
    ];

    for (req, status) in cases {
        let logs = LogCapture::default();
        let _guard = logs.install();

        test_router().oneshot(req).await.unwrap();

        let lines = logs.lines();
        assert_eq!(lines.len(), 1, "{lines:?}");
        let event: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        let fields = &event["fields"];
        assert_eq!(fields["status"], status, "{event}");
        assert!(fields["code"].is_string(), "{event}");
        assert!(fields["error"].is_string(), "{event}");
    }
}
