mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{EXTRACTED, Fixture};
use file_metadata_resolver::{handlers::AppState, routes::routes};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(fx: &Fixture) -> Router {
    routes::routes().with_state(AppState {
        resolver: fx.resolver.clone(),
        legacy_db: fx.legacy_db.clone(),
        resource_db: fx.resource_db.clone(),
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let fx = Fixture::new().await;
    let (status, body) = send(app(&fx), get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn readyz_reports_both_backends() {
    let fx = Fixture::new().await;
    let (status, body) = send(app(&fx), get("/readyz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["legacy"]["ok"], true);
    assert_eq!(body["checks"]["resource"]["ok"], true);
}

#[tokio::test]
async fn get_file_in_legacy_shape() {
    let fx = Fixture::new().await;
    fx.legacy_file("file1", "some_text.txt", "text/plain", &[]).await;

    let (status, body) = send(app(&fx), get("/files/file1?scheme=legacy&shape=legacy")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shape"], "legacy");
    assert_eq!(body["id"], "file1");
    assert_eq!(body["original_name"], "some_text.txt");
}

#[tokio::test]
async fn get_missing_file_is_404() {
    let fx = Fixture::new().await;
    let (status, body) = send(app(&fx), get("/files/BOGUS")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn get_file_with_unknown_scheme_is_400() {
    let fx = Fixture::new().await;
    let (status, _) = send(app(&fx), get("/files/file1?scheme=fedora")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_file_when_backend_is_down_is_503() {
    let fx = Fixture::new().await;
    fx.resource.take_down();
    let (status, _) = send(app(&fx), get("/files/file1")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn alternate_id_route_accepts_slashes() {
    let fx = Fixture::new().await;
    fx.file_metadata("file1", None, "a.txt", "text/plain", &[], &["ark:/99999/fk4a"])
        .await;

    let (status, body) = send(app(&fx), get("/alternate-ids/ark:/99999/fk4a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shape"], "resource");
    assert_eq!(body["id"], "file1");
}

#[tokio::test]
async fn batch_lookup_omits_missing_ids() {
    let fx = Fixture::new().await;
    fx.legacy_file("file1", "a.txt", "text/plain", &[]).await;
    fx.legacy_file("file2", "b.txt", "text/plain", &[]).await;

    let payload = json!({
        "ids": [
            { "scheme": "resource", "id": "file1" },
            { "scheme": "legacy", "id": "file2" },
            { "scheme": "resource", "id": "BOGUS" }
        ]
    });
    let request = Request::builder()
        .method("POST")
        .uri("/files")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let (status, body) = send(app(&fx), request).await;
    assert_eq!(status, StatusCode::OK);
    let mut ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["file1", "file2"]);
}

#[tokio::test]
async fn file_set_files_by_use() {
    let fx = Fixture::new().await;
    fx.three_file_set().await;

    let encoded = EXTRACTED.replace(':', "%3A").replace('/', "%2F").replace('#', "%23");
    let (status, body) = send(
        app(&fx),
        get(&format!("/file-sets/fileset_id/files?use={}", encoded)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let files = body.as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["id"], "txt1");
    assert_eq!(files[0]["uses"][0], EXTRACTED);
}

#[tokio::test]
async fn file_set_files_for_unknown_tag_is_empty() {
    let fx = Fixture::new().await;
    fx.three_file_set().await;

    let (status, body) = send(
        app(&fx),
        get("/file-sets/fileset_id/files?use=urn%3Anothing"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn file_set_files_for_missing_file_set_is_404() {
    let fx = Fixture::new().await;
    let (status, _) = send(app(&fx), get("/file-sets/nope/files?use=urn%3Ax")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
