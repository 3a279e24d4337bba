#![cfg(not(windows))]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use fs_action_server::ServiceConfig;
use fs_action_server::server::router;

// Helper to build the service under test
fn app() -> Router {
    router(Arc::new(ServiceConfig::default()))
}

// Helper to send a request and collect the whole response
async fn send(request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

async fn post_action(body: Value) -> (StatusCode, Value) {
    let request = Request::post("/api/fs/action")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, body) = send(request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_file(path: &str, download: Option<&str>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let mut uri = format!("/api/fs/file?path={}", encode(path));
    if let Some(download) = download {
        uri.push_str(&format!("&download={}", download));
    }
    send(Request::get(uri).body(Body::empty()).unwrap()).await
}

// Percent-encodes everything outside the unreserved set
fn encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn copy_body(source: &Path, dest: &Path) -> Value {
    json!({
        "action": "COPY",
        "sourcePath": path_str(source),
        "destPath": path_str(dest),
    })
}

#[tokio::test]
async fn test_copy_file_to_new_destination() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("1.txt");
    let dest = dir.path().join("2.txt");
    fs::write(&source, "Hello Test").unwrap();

    let (status, body) = post_action(copy_body(&source, &dest)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "file");
    assert_eq!(body["filesCopied"], 1);
    assert_eq!(fs::read_to_string(&dest).unwrap(), "Hello Test");
    assert_eq!(fs::read_to_string(&source).unwrap(), "Hello Test");
}

#[tokio::test]
async fn test_copy_missing_source_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("1.txt");
    let dest = dir.path().join("2.txt");

    let (status, _) = post_action(copy_body(&source, &dest)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!source.exists());
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_copy_onto_existing_file_without_overwrite_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("1.txt");
    let dest = dir.path().join("2.txt");
    fs::write(&source, "Hello Test").unwrap();
    fs::write(&dest, "Original").unwrap();

    let (status, body) = post_action(copy_body(&source, &dest)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "Conflict");
    assert!(body["message"].as_str().unwrap().contains("2.txt"));
    assert_eq!(fs::read_to_string(&dest).unwrap(), "Original");
}

#[tokio::test]
async fn test_copy_onto_existing_file_with_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("1.txt");
    let dest = dir.path().join("2.txt");
    fs::write(&source, "Hello Test").unwrap();
    fs::write(&dest, "Original").unwrap();

    let mut body = copy_body(&source, &dest);
    body["overwrite"] = json!(true);
    let (status, _) = post_action(body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fs::read_to_string(&dest).unwrap(), "Hello Test");
}

#[tokio::test]
async fn test_missing_action() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = copy_body(&dir.path().join("1.txt"), &dir.path().join("2.txt"));
    body.as_object_mut().unwrap().remove("action");

    let (status, body) = post_action(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "A value for action is not provided.");
}

#[tokio::test]
async fn test_unknown_action() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = copy_body(&dir.path().join("1.txt"), &dir.path().join("2.txt"));
    body["action"] = json!("unknown");

    let (status, body) = post_action(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown action command - 'unknown'.");
}

#[tokio::test]
async fn test_invalid_paths_are_reported_per_field() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("<2>.txt");

    let (status, body) = post_action(json!({
        "action": "COPY",
        "sourcePath": "relative/1.txt",
        "destPath": path_str(&dest),
    }))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["SourcePath"].is_array());
    assert!(body["errors"]["DestPath"].is_array());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_copy_directory_tree() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    let dest = dir.path().join("dest");
    fs::create_dir_all(source.join("a/b/c")).unwrap();
    fs::create_dir_all(source.join("empty")).unwrap();
    fs::write(source.join("root.txt"), "root").unwrap();
    fs::write(source.join("a/b/c/leaf.txt"), "leaf").unwrap();

    let (status, body) = post_action(copy_body(&source, &dest)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "directory");
    assert_eq!(fs::read_to_string(dest.join("root.txt")).unwrap(), "root");
    assert_eq!(fs::read_to_string(dest.join("a/b/c/leaf.txt")).unwrap(), "leaf");
    assert!(dest.join("empty").is_dir());
}

#[tokio::test]
async fn test_copy_directory_onto_existing_without_overwrite_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    let dest = dir.path().join("dest");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("1.txt"), "new").unwrap();
    fs::write(source.join("3.txt"), "only in source").unwrap();
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("1.txt"), "old").unwrap();

    let (status, body) = post_action(copy_body(&source, &dest)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "Conflict");
    assert_eq!(fs::read_to_string(dest.join("1.txt")).unwrap(), "old");
    assert!(!dest.join("3.txt").exists());
}

#[tokio::test]
async fn test_copy_directory_with_overwrite_merges() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    let dest = dir.path().join("dest");
    fs::create_dir_all(source.join("sub")).unwrap();
    fs::write(source.join("sub/1.txt"), "new").unwrap();
    fs::create_dir_all(dest.join("sub")).unwrap();
    fs::create_dir_all(dest.join("unrelated")).unwrap();
    fs::write(dest.join("sub/1.txt"), "old").unwrap();

    let mut body = copy_body(&source, &dest);
    body["overwrite"] = json!("true");
    let (status, _) = post_action(body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fs::read_to_string(dest.join("sub/1.txt")).unwrap(), "new");
    assert!(dest.join("unrelated").is_dir());
}

#[tokio::test]
async fn test_copy_through_loopback_share_path() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("1.txt");
    let dest = dir.path().join("2.txt");
    fs::write(&source, "Hello Test").unwrap();
    let unc_source = format!(r"\\localhost{}", path_str(&source).replace('/', "\\"));

    let (status, body) = post_action(json!({
        "action": "copy",
        "sourcePath": unc_source,
        "destPath": path_str(&dest),
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sourcePath"], unc_source.as_str());
    assert_eq!(fs::read_to_string(&dest).unwrap(), "Hello Test");
}

#[tokio::test]
async fn test_malformed_action_body() {
    let request = Request::post("/api/fs/action")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _, _) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_retrieve_file_inline() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("1.txt");
    fs::write(&file, "Hello Test").unwrap();

    let (status, headers, body) = get_file(path_str(&file), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(headers[header::CONTENT_DISPOSITION], "inline; filename=\"1.txt\"");
    assert_eq!(headers[header::CONTENT_LENGTH], "10");
    assert_eq!(body, b"Hello Test");
}

#[tokio::test]
async fn test_retrieve_xml_inline() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("1.xml");
    fs::write(&file, "<root/>").unwrap();

    let (status, headers, _) = get_file(path_str(&file), Some("false")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/xml");
    assert!(headers[header::CONTENT_DISPOSITION].to_str().unwrap().starts_with("inline"));
}

#[tokio::test]
async fn test_retrieve_file_as_download() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("1.txt");
    fs::write(&file, "Hello Test").unwrap();

    let (status, headers, body) = get_file(path_str(&file), Some("true")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
    assert!(headers[header::CONTENT_DISPOSITION].to_str().unwrap().starts_with("attachment"));
    assert_eq!(body, b"Hello Test");
}

#[tokio::test]
async fn test_retrieve_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let (status, _, _) = get_file(path_str(&dir.path().join("missing.txt")), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = get_file(path_str(dir.path()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_retrieve_invalid_path() {
    for raw in ["/tmp/<file>.txt", "relative.txt", ""] {
        let (status, _, body) = get_file(raw, None).await;
        let body: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
        assert!(body["errors"]["Path"].is_array(), "{raw}");
    }
}

#[tokio::test]
async fn test_list_drives() {
    let (status, _, body) = send(Request::get("/api/fs/drives").body(Body::empty()).unwrap()).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
    for drive in body.as_array().unwrap() {
        assert!(drive["name"].is_string());
        assert_eq!(drive["isReady"], true);
    }
}
