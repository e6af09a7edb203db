//! End-to-end tests for the standalone upload route, with the remote strategy
//! pointed at an image host served on a local port.

use alumni_server::{AppState, Config, api};
use axum::body::Body;
use axum::routing::post;
use axum::{Json, Router};
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "----alumni-upload-boundary";
const SECURE_URL: &str = "https://res.cloudinary.com/demo/image/upload/alumni_members/me.png";

struct TestApp {
    router: Router,
    _dir: tempfile::TempDir,
}

/// Serve `host` on an ephemeral port and return its base URL
async fn serve(host: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, host).await.unwrap();
    });
    format!("http://{addr}")
}

fn app_with(api_base: &str, extra: &[(&str, &str)]) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("members.db").display());

    let mut vars: HashMap<String, String> = [
        ("IMAGE_STRATEGY", "cloudinary"),
        ("CLOUDINARY_CLOUD_NAME", "demo"),
        ("CLOUDINARY_API_KEY", "123456"),
        ("CLOUDINARY_API_SECRET", "topsecret"),
        ("CLOUDINARY_API_BASE", api_base),
    ]
    .iter()
    .chain(extra)
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    vars.insert("DATABASE_URL".into(), url);
    let config = Config::from_lookup(move |k: &str| vars.get(k).cloned()).unwrap();

    let state = AppState::new(config).unwrap();
    TestApp {
        router: api::router(state),
        _dir: dir,
    }
}

fn accepting_host() -> Router {
    Router::new().route(
        "/demo/image/upload",
        post(|| async { Json(json!({ "secure_url": SECURE_URL })) }),
    )
}

fn upload_request(image: Option<(&str, &str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nme\r\n")
            .as_bytes(),
    );
    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn png() -> Option<(&'static str, &'static str, &'static [u8])> {
    Some(("me.png", "image/png", b"\x89PNG\r\n\x1a\n"))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let allow = response
        .headers()
        .get(header::ALLOW)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, allow, json)
}

#[tokio::test]
async fn uploaded_image_returns_host_url() {
    let base = serve(accepting_host()).await;
    let app = app_with(&base, &[]);

    let (status, _, json) = send(&app.router, upload_request(png())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "message": "Upload successful", "imageUrl": SECURE_URL })
    );
}

#[tokio::test]
async fn missing_or_empty_image_is_a_bad_request() {
    let base = serve(accepting_host()).await;
    let app = app_with(&base, &[]);

    let (status, _, json) = send(&app.router, upload_request(None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "No image provided");

    let empty = Some(("me.png", "image/png", &b""[..]));
    let (status, _, json) = send(&app.router, upload_request(empty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "No image provided");
}

#[tokio::test]
async fn host_rejection_is_an_upload_failure() {
    let base = serve(Router::new().route(
        "/demo/image/upload",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "message": "Invalid image file" } })),
            )
        }),
    ))
    .await;
    let app = app_with(&base, &[]);

    let (status, _, json) = send(&app.router, upload_request(png())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Upload failed");
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("Invalid image file"));
    assert!(!error.contains("topsecret"));
}

#[tokio::test]
async fn non_image_file_is_refused_before_upload() {
    // Unroutable host: reaching it would turn into an upload failure instead
    let app = app_with("http://127.0.0.1:9", &[]);
    let pdf = Some(("cv.pdf", "application/pdf", &b"%PDF-1.4"[..]));

    let (status, _, json) = send(&app.router, upload_request(pdf)).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json["message"], "Unsupported image type");
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    let app = app_with("http://127.0.0.1:9", &[]);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/upload")
        .body(Body::empty())
        .unwrap();

    let (status, allow, json) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(allow.as_deref(), Some("POST"));
    assert_eq!(json["message"], "Method Not Allowed");
}

#[tokio::test]
async fn slow_request_times_out_with_json_body() {
    let base = serve(Router::new().route(
        "/demo/image/upload",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "secure_url": SECURE_URL }))
        }),
    ))
    .await;
    let app = app_with(
        &base,
        &[("REQUEST_TIMEOUT_SECS", "1"), ("UPLOAD_TIMEOUT_SECS", "10")],
    );

    let (status, _, json) = send(&app.router, upload_request(png())).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(json["message"], "Operation timed out");
}
