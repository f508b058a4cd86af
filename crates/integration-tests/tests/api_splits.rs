//! API tests for the splitter endpoints, driven through the router with
//! `oneshot`.

use axum::http::StatusCode;
use integration_tests::api::{body_json, request, test_router};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn split_endpoints_require_identity() {
    let (router, _app) = test_router(140);

    for (method, uri) in [
        ("GET", "/api/splits"),
        ("POST", "/api/splits"),
        ("PATCH", "/api/splits"),
        ("DELETE", "/api/splits"),
    ] {
        let body = (method != "GET" && method != "DELETE")
            .then(|| json!({"content": "anything"}));
        let response = router
            .clone()
            .oneshot(request(method, uri, None, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn draft_lifecycle_over_http() {
    let (router, _app) = test_router(4);
    let user = Uuid::now_v7();

    // no draft yet
    let response = router
        .clone()
        .oneshot(request("GET", "/api/splits", Some(user), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // create with two cut points
    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/splits",
            Some(user),
            Some(json!({"content": "ABCDEFGHIJ", "offsets": [3, 7]})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["draft"]["content"], "ABCDEFGHIJ");
    assert_eq!(body["draft"]["split_offsets"], json!([3, 7]));

    // toggle a cut point on and off again
    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            "/api/splits",
            Some(user),
            Some(json!({"offset": 5})),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["draft"]["split_offsets"], json!([3, 5, 7]));

    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            "/api/splits",
            Some(user),
            Some(json!({"offset": 5})),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["draft"]["split_offsets"], json!([3, 7]));

    // publish: head freet comes back, the draft is gone
    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/splits",
            Some(user),
            Some(json!({"publish": true})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["freet"]["content"], "ABC");

    let response = router
        .clone()
        .oneshot(request("GET", "/api/splits", Some(user), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn content_update_evicts_trailing_offsets() {
    let (router, _app) = test_router(140);
    let user = Uuid::now_v7();

    router
        .clone()
        .oneshot(request(
            "POST",
            "/api/splits",
            Some(user),
            Some(json!({"content": "a rather long draft", "offsets": [4, 15]})),
        ))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            "/api/splits",
            Some(user),
            Some(json!({"content": "short now"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // 15 points past the new end and is dropped; 4 survives
    assert_eq!(body["draft"]["split_offsets"], json!([4]));
}

#[tokio::test]
async fn validation_failures_map_to_http_statuses() {
    let (router, _app) = test_router(4);
    let user = Uuid::now_v7();

    // a zero offset is malformed
    router
        .clone()
        .oneshot(request(
            "POST",
            "/api/splits",
            Some(user),
            Some(json!({"content": "ABCDEFGHIJ"})),
        ))
        .await
        .unwrap();
    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            "/api/splits",
            Some(user),
            Some(json!({"offset": 0})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // publishing with a 10-char head segment against a 4-char limit
    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/splits",
            Some(user),
            Some(json!({"publish": true})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // neither content nor offset on a PATCH is a malformed request
    let response = router
        .clone()
        .oneshot(request("PATCH", "/api/splits", Some(user), Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn discard_removes_the_draft() {
    let (router, _app) = test_router(140);
    let user = Uuid::now_v7();

    router
        .clone()
        .oneshot(request(
            "POST",
            "/api/splits",
            Some(user),
            Some(json!({"content": "never mind"})),
        ))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(request("DELETE", "/api/splits", Some(user), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(request("GET", "/api/splits", Some(user), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
