//! Method dispatch, CORS and admission checks, driven through the router.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::{body_bytes, body_json, relay_config, relay_router, ALLOWED_ORIGIN};

const UNREACHABLE: &str = "http://127.0.0.1:9/exec";

fn request(method: Method) -> axum::http::request::Builder {
    Request::builder().method(method).uri("/")
}

#[tokio::test]
async fn test_get_liveness() {
    let router = relay_router(relay_config(UNREACHABLE));

    let response = router
        .oneshot(request(Method::GET).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "message": "gas_proxy alive"})
    );
}

#[tokio::test]
async fn test_get_with_allowed_origin_gets_cors() {
    let router = relay_router(relay_config(UNREACHABLE));

    let response = router
        .oneshot(
            request(Method::GET)
                .header(header::ORIGIN, ALLOWED_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    assert_eq!(response.headers()[header::VARY], "Origin");
}

#[tokio::test]
async fn test_get_skips_origin_enforcement() {
    let router = relay_router(relay_config(UNREACHABLE));

    let response = router
        .oneshot(
            request(Method::GET)
                .header(header::ORIGIN, "https://evil.example.net")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn test_preflight_from_allowed_origin() {
    let router = relay_router(relay_config(UNREACHABLE));

    let response = router
        .oneshot(
            request(Method::OPTIONS)
                .header(header::ORIGIN, ALLOWED_ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers().clone();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS, GET");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, X-Proxy-Key");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_preflight_from_unknown_origin_has_no_cors() {
    let router = relay_router(relay_config(UNREACHABLE));

    let response = router
        .oneshot(
            request(Method::OPTIONS)
                .header(header::ORIGIN, "https://evil.example.net")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn test_other_methods_not_allowed() {
    for method in [Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD, Method::TRACE] {
        let router = relay_router(relay_config(UNREACHABLE));
        let response = router
            .oneshot(request(method.clone()).body(Body::from("x")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        if method != Method::HEAD {
            assert_eq!(
                body_json(response).await,
                json!({"success": false, "error": "Method not allowed"})
            );
        }
    }
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    for method in [Method::GET, Method::OPTIONS, Method::PUT, Method::POST] {
        let router = relay_router(relay_config(UNREACHABLE));
        let response = router
            .oneshot(request(method).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::REFERRER_POLICY], "no-referrer");
        assert!(headers.contains_key("x-request-id"));
    }
}

#[tokio::test]
async fn test_request_id_propagated() {
    let router = relay_router(relay_config(UNREACHABLE));

    let response = router
        .oneshot(
            request(Method::GET)
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_post_from_unknown_origin_forbidden() {
    let router = relay_router(relay_config(UNREACHABLE));

    let response = router
        .oneshot(
            request(Method::POST)
                .header(header::ORIGIN, "https://evil.example.net")
                .body(Body::from("payload"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "error": "Forbidden"})
    );
}

#[tokio::test]
async fn test_post_with_foreign_referer_forbidden() {
    let router = relay_router(relay_config(UNREACHABLE));

    let response = router
        .oneshot(
            request(Method::POST)
                .header(header::REFERER, "https://evil.example.net/page")
                .body(Body::from("payload"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_non_text_origin_or_referer_forbidden() {
    let mut config = relay_config(UNREACHABLE);
    config.access.secret = Some("s3cret".into());

    for name in [header::ORIGIN, header::REFERER] {
        let response = relay_router(config.clone())
            .oneshot(
                request(Method::POST)
                    .header(
                        name.clone(),
                        HeaderValue::from_bytes(b"https://evil\xe9.example").unwrap(),
                    )
                    .body(Body::from("payload"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{name}");
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}

#[tokio::test]
async fn test_origin_enforcement_disabled() {
    let mut config = relay_config(UNREACHABLE);
    config.access.enforce_origin_check = false;
    config.access.secret = Some("s3cret".into());
    let router = relay_router(config);

    // Passing the origin check is observable as reaching the secret check.
    let response = router
        .oneshot(
            request(Method::POST)
                .header(header::ORIGIN, "https://evil.example.net")
                .body(Body::from("payload"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_secret_required() {
    let mut config = relay_config(UNREACHABLE);
    config.access.secret = Some("s3cret".into());

    for key in [None, Some(""), Some("wrong"), Some("s3cret-but-longer")] {
        let mut builder = request(Method::POST).header(header::ORIGIN, ALLOWED_ORIGIN);
        if let Some(key) = key {
            builder = builder.header("x-proxy-key", key);
        }
        let response = relay_router(config.clone())
            .oneshot(builder.body(Body::from("payload")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "key {key:?}");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "error": "Unauthorized"})
        );
    }
}

#[tokio::test]
async fn test_declared_length_over_cap() {
    let mut config = relay_config(UNREACHABLE);
    config.access.max_body_bytes = 16;
    let router = relay_router(config);

    let response = router
        .oneshot(
            request(Method::POST)
                .header(header::CONTENT_LENGTH, "17")
                .body(Body::from("x".repeat(17)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "error": "Payload too large"})
    );
}

#[tokio::test]
async fn test_actual_length_over_cap_without_declaration() {
    let mut config = relay_config(UNREACHABLE);
    config.access.max_body_bytes = 16;
    let router = relay_router(config);

    let chunks = futures_util::stream::iter(vec![
        Ok::<_, std::io::Error>(Bytes::from_static(b"0123456789")),
        Ok(Bytes::from_static(b"0123456789")),
    ]);
    let response = router
        .oneshot(request(Method::POST).body(Body::from_stream(chunks)).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_understated_length_still_capped() {
    let mut config = relay_config(UNREACHABLE);
    config.access.max_body_bytes = 16;
    let router = relay_router(config);

    let chunks = futures_util::stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from(
        "x".repeat(32),
    ))]);
    let response = router
        .oneshot(
            request(Method::POST)
                .header(header::CONTENT_LENGTH, "4")
                .body(Body::from_stream(chunks))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_empty_body_rejected() {
    let router = relay_router(relay_config(UNREACHABLE));

    let response = router
        .oneshot(
            request(Method::POST)
                .header(header::ORIGIN, ALLOWED_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "error": "Empty body"})
    );
}

#[tokio::test]
async fn test_secret_checked_before_size() {
    let mut config = relay_config(UNREACHABLE);
    config.access.secret = Some("s3cret".into());
    config.access.max_body_bytes = 4;
    let router = relay_router(config);

    let response = router
        .oneshot(
            request(Method::POST)
                .header(header::CONTENT_LENGTH, "100")
                .body(Body::from("x".repeat(100)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
