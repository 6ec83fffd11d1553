// Problem+json bodies produced at the HTTP edge.

use actix_web::http::header::{HeaderName, CONTENT_TYPE};
use actix_web::test;
use serde_json::Value;

use crate::support::app_builder::{build_test_state, create_test_app};

#[actix_web::test]
async fn non_positive_user_id_is_rejected_before_upgrade() {
    let app = create_test_app(build_test_state()).await;

    let req = test::TestRequest::get().uri("/ws/0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let headers = resp.headers().clone();
    let trace_id = headers
        .get(HeaderName::from_static("x-trace-id"))
        .and_then(|v| v.to_str().ok())
        .expect("X-Trace-Id header should be present")
        .to_string();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "Content-Type must be application/problem+json (got {content_type})"
    );

    let body: Value = test::read_body_json(resp).await;
    for key in ["type", "title", "status", "detail", "code", "trace_id"] {
        assert!(body.get(key).is_some(), "{key} field should be present");
    }
    assert_eq!(body["code"], "INVALID_USER_ID");
    assert_eq!(body["status"], 400);
    assert_eq!(body["trace_id"], trace_id.as_str());
    assert!(body["type"]
        .as_str()
        .is_some_and(|t| t.ends_with("/INVALID_USER_ID")));
}

#[actix_web::test]
async fn unknown_route_is_not_found() {
    let app = create_test_app(build_test_state()).await;
    let req = test::TestRequest::get().uri("/matches").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}
