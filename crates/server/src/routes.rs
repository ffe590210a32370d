pub mod diagnostics;
pub mod items;

use axum::{
    http::{StatusCode, Uri},
    middleware,
    routing::{get, post},
    Json, Router,
};
use common::types::Health;
use tower_http::{
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::errors::ApiError;
use crate::middleware::{track_metrics, RequestSpan};
use crate::observability;
use crate::state::AppState;

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn metrics() -> (StatusCode, String) {
    observability::encode_metrics()
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

/// Build the full application router.
///
/// A path that exists under another method answers 405; an unknown path
/// answers 404 through the fallback.
pub fn build_router(state: AppState) -> Router {
    let items = Router::new()
        .route("/items", post(items::create_item))
        .route("/items/:id", get(items::get_item).put(items::update_item))
        .route("/slow", get(diagnostics::slow));

    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    items
        .merge(ops)
        .fallback(route_not_found)
        .with_state(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(RequestSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use axum::response::Response;
    use serde_json::{json, Value};
    use service::{Record, RecordStore};
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<RecordStore>) {
        let store = Arc::new(RecordStore::new());
        let state = AppState::new(Arc::clone(&store), Duration::from_millis(10));
        (build_router(state), store)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap_or_else(|err| panic!("failed to build request: {err}"));
        match app.clone().oneshot(req).await {
            Ok(resp) => resp,
            Err(err) => panic!("router request failed: {err}"),
        }
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.expect("read body");
        serde_json::from_slice(&bytes).unwrap_or_else(|err| panic!("body is not JSON: {err}"))
    }

    #[tokio::test]
    async fn create_read_update_scenario() {
        let (app, _) = test_app();

        let resp = send(&app, "POST", "/items", Some(r#"{"id":101,"name":"Alice","age":30}"#)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert_eq!(body_json(resp).await, json!({"id":101,"name":"Alice","age":30}));

        let resp = send(&app, "GET", "/items/101", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"id":101,"name":"Alice","age":30}));

        let resp = send(
            &app,
            "PUT",
            "/items/101",
            Some(r#"{"id":101,"name":"Alice Smith","age":31}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"id":101,"name":"Alice Smith","age":31}));

        let resp = send(&app, "GET", "/items/999", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], "Item not found");
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_and_keeps_first() {
        let (app, store) = test_app();
        let resp = send(&app, "POST", "/items", Some(r#"{"id":1,"name":"first","age":1}"#)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = send(&app, "POST", "/items", Some(r#"{"id":1,"name":"second","age":2}"#)).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["error"], "Error: ID 1 already in use");
        assert_eq!(store.get(1).await, Some(Record::new(1, "first", 1)));
    }

    #[tokio::test]
    async fn create_with_malformed_body_is_bad_request() {
        let (app, store) = test_app();
        for body in ["{", r#"{"id":"x"}"#, "[1,2]", r#"[101,"Alice",30]"#, ""] {
            let resp = send(&app, "POST", "/items", Some(body)).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body:?}");
            assert_eq!(body_json(resp).await["error"], "Bad request: invalid JSON");
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn create_without_content_type_still_decodes() {
        let (app, _) = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/items")
            .body(Body::from(r#"{"id":5,"name":"plain","age":5}"#))
            .expect("request");
        let resp = app.clone().oneshot(req).await.expect("router call");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn non_integer_id_is_bad_request() {
        let (app, _) = test_app();
        let resp = send(&app, "GET", "/items/abc", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Invalid item ID");

        let resp = send(&app, "PUT", "/items/abc", Some(r#"{"id":1}"#)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Invalid item ID");
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found_and_inserts_nothing() {
        let (app, store) = test_app();
        let resp = send(&app, "PUT", "/items/42", Some(r#"{"id":42,"name":"ghost","age":1}"#)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(!store.contains(42).await);
    }

    #[tokio::test]
    async fn update_of_missing_record_wins_over_bad_body() {
        let (app, _) = test_app();
        let resp = send(&app, "PUT", "/items/42", Some("{")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_with_malformed_body_is_bad_request() {
        let (app, store) = test_app();
        store.put(3, Record::new(3, "c", 3)).await;
        for body in ["not json", r#"[3,"Alice",30]"#] {
            let resp = send(&app, "PUT", "/items/3", Some(body)).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body:?}");
            assert_eq!(body_json(resp).await["error"], "Bad request: invalid JSON");
        }
        assert_eq!(store.get(3).await, Some(Record::new(3, "c", 3)));
    }

    #[tokio::test]
    async fn update_path_id_overrides_body_id() {
        let (app, store) = test_app();
        store.put(10, Record::new(10, "ten", 10)).await;
        let resp = send(&app, "PUT", "/items/10", Some(r#"{"id":77,"name":"renamed","age":11}"#)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"id":10,"name":"renamed","age":11}));
        assert_eq!(store.get(10).await, Some(Record::new(10, "renamed", 11)));
        assert!(!store.contains(77).await);
    }

    #[tokio::test]
    async fn update_replaces_instead_of_merging() {
        let (app, store) = test_app();
        store.put(8, Record::new(8, "keep?", 80)).await;
        let resp = send(&app, "PUT", "/items/8", Some(r#"{"age":81}"#)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(store.get(8).await, Some(Record::new(8, "", 81)));
    }

    #[tokio::test]
    async fn wrong_method_is_405_and_unknown_path_is_404() {
        let (app, _) = test_app();
        let resp = send(&app, "DELETE", "/items/1", None).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let resp = send(&app, "GET", "/items", None).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let resp = send(&app, "GET", "/nowhere", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], "Route not found");
    }

    #[tokio::test]
    async fn slow_answers_plain_text_after_delay() {
        let (app, _) = test_app();
        let resp = send(&app, "GET", "/slow", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(ct.starts_with("text/plain"), "content type was {ct}");
        let bytes = to_bytes(resp.into_body(), 1024).await.expect("body");
        assert_eq!(&bytes[..], b"Finally, I am done.");
    }

    #[tokio::test]
    async fn health_and_metrics_are_served() {
        let (app, _) = test_app();
        let resp = send(&app, "GET", "/health", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"status": "ok"}));

        let resp = send(&app, "GET", "/metrics", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.expect("body");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("records_api_requests_total"), "metrics were: {text}");
    }

    #[tokio::test]
    async fn independent_apps_do_not_share_records() {
        let (a, _) = test_app();
        let (b, _) = test_app();
        let resp = send(&a, "POST", "/items", Some(r#"{"id":1,"name":"a","age":1}"#)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let resp = send(&b, "GET", "/items/1", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
