//! `ZiplineClient` against an in-process mock Zipline server

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use zipline_launcher::zipline::{
    FileFilter, FileId, NamingFormat, UploadOptions, UploadedFile, ZiplineApi, ZiplineClient,
    ZiplineError,
};

const TOKEN: &str = "secret-token";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<HashMap<(Method, String), (u16, String)>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockState {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });

    let (status, body) = state
        .routes
        .get(&(method, path))
        .cloned()
        .unwrap_or((404, "{}".to_string()));
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

/// Serve canned `(method, path) -> (status, body)` responses on a random port
async fn start(routes: &[(Method, &str, u16, &str)]) -> (ZiplineClient, MockState) {
    let state = MockState {
        routes: Arc::new(
            routes
                .iter()
                .map(|(m, p, s, b)| ((m.clone(), p.to_string()), (*s, b.to_string())))
                .collect(),
        ),
        requests: Arc::default(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(handler).with_state(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ZiplineClient::new(
        &format!("http://{}/", addr),
        SecretString::from(TOKEN.to_string()),
    )
    .unwrap();
    (client, state)
}

const PAGE_BODY: &str = r#"{
    "files": [
        {"id": 7, "filename": "cat.png", "mimetype": "image/png", "size": 2048,
         "url": "https://zip.example.com/u/cat.png", "upload_date": "2024-03-01T10:00:00Z",
         "views": 3, "favorite": true, "embedded": false}
    ],
    "count": 45,
    "pages": 5,
    "page": 1
}"#;

#[tokio::test]
async fn test_list_files_sends_only_set_filters_and_raw_token() {
    let (client, mock) = start(&[(Method::GET, "/api/user/files", 200, PAGE_BODY)]).await;

    let filter = FileFilter {
        search: Some("cat".to_string()),
        favorite: Some(true),
        ..Default::default()
    };
    let page = client.list_files(&filter).await.unwrap();
    assert_eq!(page.count, 45);
    assert_eq!(page.pages, 5);
    assert_eq!(page.files[0].id, FileId::Numeric(7));
    assert!(page.files[0].favorite);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("filter=cat&favorite=true&page=1"));
    assert_eq!(requests[0].header("authorization"), Some(TOKEN));
}

#[tokio::test]
async fn test_unstructured_error_uses_status_line() {
    let (client, _mock) =
        start(&[(Method::GET, "/api/user/files", 502, "<html>bad gateway</html>")]).await;

    let err = client.list_files(&FileFilter::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_upload_sends_multipart_and_option_headers() {
    let (client, mock) = start(&[(
        Method::POST,
        "/api/upload",
        200,
        r#"{"files": ["https://zip.example.com/u/abc.txt"]}"#,
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("local.txt");
    std::fs::write(&source, "hello zipline").unwrap();

    let options = UploadOptions {
        format: Some(NamingFormat::Uuid),
        original_name: true,
        max_views: Some(3),
        ..Default::default()
    };
    let response = client.upload_file(&source, "notes.txt", &options).await.unwrap();
    assert_eq!(response.first_url(), Some("https://zip.example.com/u/abc.txt"));

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.header("authorization"), Some(TOKEN));
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    assert_eq!(request.header("x-zipline-format"), Some("UUID"));
    assert_eq!(request.header("x-zipline-original-name"), Some("true"));
    assert_eq!(request.header("x-zipline-max-views"), Some("3"));
    assert_eq!(request.header("x-zipline-password"), None);
    assert_eq!(request.header("x-zipline-domain"), None);

    let body = request.body_text();
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="notes.txt""#));
    assert!(body.contains("text/plain"));
    assert!(body.contains("hello zipline"));
}

#[tokio::test]
async fn test_upload_accepts_descriptor_response() {
    let (client, _mock) = start(&[(
        Method::POST,
        "/api/upload",
        200,
        r#"{"files": [{"id": "clx1", "type": "text/plain", "url": "https://zip.example.com/u/x.txt"}]}"#,
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("x.txt");
    std::fs::write(&source, "x").unwrap();

    let response = client.upload_file(&source, "x.txt", &UploadOptions::default()).await.unwrap();
    assert!(matches!(
        response.files[0],
        UploadedFile::Descriptor { id: Some(FileId::Text(ref id)), .. } if id == "clx1"
    ));
    assert_eq!(response.first_url(), Some("https://zip.example.com/u/x.txt"));
}

#[tokio::test]
async fn test_upload_failure_keeps_raw_body() {
    let (client, _mock) =
        start(&[(Method::POST, "/api/upload", 413, "Payload Too Large")]).await;
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("big.bin");
    std::fs::write(&source, [0u8; 64]).unwrap();

    match client.upload_file(&source, "big.bin", &UploadOptions::default()).await {
        Err(ZiplineError::Upload { status, body }) => {
            assert_eq!(status, 413);
            assert_eq!(body, "Payload Too Large");
        }
        other => panic!("expected upload error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_upload_source_makes_no_request() {
    let (client, mock) = start(&[]).await;
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.txt");
    assert!(client
        .upload_file(&missing, "missing.txt", &UploadOptions::default())
        .await
        .is_err());

    let empty = dir.path().join("empty.txt");
    std::fs::write(&empty, b"").unwrap();
    assert!(client
        .upload_file(&empty, "empty.txt", &UploadOptions::default())
        .await
        .is_err());

    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_delete_sends_id_and_surfaces_server_message() {
    let (client, mock) = start(&[(
        Method::DELETE,
        "/api/user/files/42",
        404,
        r#"{"error": "Not Found", "message": "File not found", "statusCode": 404}"#,
    )])
    .await;

    let err = client.delete_file(&FileId::Numeric(42)).await.unwrap_err();
    assert_eq!(err.to_string(), "File not found");
    assert_eq!(err.status(), Some(404));

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body, serde_json::json!({ "id": 42, "all": false }));
}

#[tokio::test]
async fn test_ids_stay_inside_one_path_segment() {
    let (client, mock) = start(&[]).await;

    for raw in ["a/b?c#d..", "%2e%2e", "7?all=true", "1#x"] {
        let id: FileId = raw.parse().unwrap();
        let _ = client.delete_file(&id).await;
    }
    let _ = client
        .toggle_favorite(&FileId::Text("x/../y".to_string()))
        .await;

    let seen: Vec<(String, Option<String>)> = mock
        .requests()
        .into_iter()
        .map(|r| (r.path, r.query))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("/api/user/files/a%2Fb%3Fc%23d..".to_string(), None),
            ("/api/user/files/%252e%252e".to_string(), None),
            ("/api/user/files/7%3Fall=true".to_string(), None),
            ("/api/user/files/1%23x".to_string(), None),
            ("/api/user/files/x%2F..%2Fy/favorite".to_string(), None),
        ]
    );
}

#[tokio::test]
async fn test_dot_ids_are_rejected_without_request() {
    let (client, mock) = start(&[]).await;

    let err = client
        .get_file(&FileId::Text("..".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ZiplineError::InvalidId(_)));
    assert!("..".parse::<FileId>().is_err());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_delete_success_ignores_body() {
    let (client, _mock) = start(&[(Method::DELETE, "/api/user/files/42", 200, "")]).await;
    assert!(client.delete_file(&FileId::Numeric(42)).await.is_ok());
}

#[tokio::test]
async fn test_toggle_favorite_is_bodyless_patch() {
    let (client, mock) = start(&[(
        Method::PATCH,
        "/api/user/files/abc123/favorite",
        200,
        r#"{"favorite": true}"#,
    )])
    .await;

    client
        .toggle_favorite(&FileId::Text("abc123".to_string()))
        .await
        .unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::PATCH);
    assert!(request.body.is_empty());
    assert_eq!(request.header("content-type"), None);
}

#[tokio::test]
async fn test_get_file_stats_and_user() {
    let (client, _mock) = start(&[
        (
            Method::GET,
            "/api/user/files/7",
            200,
            r#"{"id": 7, "name": "cat.png", "type": "image/png", "size": 2048,
                "url": "https://zip.example.com/u/cat.png", "createdAt": "2024-03-01T10:00:00Z",
                "views": 3, "favorite": false, "maxViews": 10}"#,
        ),
        (
            Method::GET,
            "/api/user/stats",
            200,
            r#"{"size": 1048576, "count": 12, "views_count": 99, "users_count": 2, "avg_size": 87381.3}"#,
        ),
        (
            Method::GET,
            "/api/user",
            200,
            r#"{"id": 1, "username": "admin", "administrator": true, "superAdmin": false,
                "token": "must-not-leak", "domains": ["zip.example.com"]}"#,
        ),
    ])
    .await;

    let file = client.get_file(&FileId::Numeric(7)).await.unwrap();
    assert_eq!(file.filename, "cat.png");
    assert_eq!(file.mimetype, "image/png");
    assert_eq!(file.upload_date, "2024-03-01T10:00:00Z");
    assert_eq!(file.max_views, Some(10));

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.count, 12);
    assert_eq!(stats.size, 1_048_576);

    let user = client.get_current_user().await.unwrap();
    assert_eq!(user.username, "admin");
    assert!(user.administrator);
    assert_eq!(user.domains, vec!["zip.example.com".to_string()]);
}

#[tokio::test]
async fn test_connection_check() {
    let (ok, _mock) = start(&[(Method::GET, "/api/user", 200, r#"{"id": 1, "username": "me"}"#)]).await;
    assert!(ok.test_connection().await);

    let (denied, _mock) = start(&[(
        Method::GET,
        "/api/user",
        401,
        r#"{"error": "Unauthorized", "message": "not logged in", "statusCode": 401}"#,
    )])
    .await;
    assert!(!denied.test_connection().await);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ZiplineClient::new(
        &format!("http://{}", addr),
        SecretString::from(TOKEN.to_string()),
    )
    .unwrap();
    let err = client.list_files(&FileFilter::default()).await.unwrap_err();
    assert!(matches!(err, ZiplineError::Network(_)));
}
