//! Zipline REST client
//!
//! Implements `ZiplineApi` over HTTP with reqwest.
//! Authentication: the raw API token in the `Authorization` header (no scheme).
//!
//! JSON calls: non-2xx bodies are parsed as `{error, message, statusCode}` and
//! the message is surfaced; anything unparseable degrades to the status line.
//! Upload: multipart field `file`, options as `x-zipline-*` headers, failures
//! reported with the raw body since upload errors are not always JSON.
//!
//! No retries and no client-side timeouts.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{multipart, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;
use url::Url;

use super::{
    CurrentUser, FileFilter, FileId, FilePage, UploadOptions, UploadResponse, UserStats,
    ZiplineApi, ZiplineError, ZiplineFile,
};

/// Maximum characters of a response body quoted in parse errors
const BODY_PREVIEW_CHARS: usize = 200;

fn zipline_log(msg: &str) {
    debug!("[ZIPLINE] {}", msg);
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

pub struct ZiplineClient {
    /// Base URL without trailing slash
    base_url: String,
    api_token: SecretString,
    client: reqwest::Client,
}

impl ZiplineClient {
    /// Build a client for `base_url`. Fails on an unparseable URL or a token that
    /// cannot travel in a header.
    pub fn new(base_url: &str, api_token: SecretString) -> Result<Self, ZiplineError> {
        let trimmed = base_url.trim();
        let parsed = Url::parse(trimmed)
            .map_err(|e| ZiplineError::InvalidConfig(format!("Invalid server URL '{}': {}", trimmed, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ZiplineError::InvalidConfig(format!(
                "Server URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if api_token.expose_secret().trim().is_empty() {
            return Err(ZiplineError::InvalidConfig("API token is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("zipline-launcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let this = Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
            api_token,
            client,
        };
        this.auth_header()?;
        Ok(this)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    /// Invalid characters in the token are a configuration error, never an empty header.
    fn auth_header(&self) -> Result<HeaderValue, ZiplineError> {
        let mut value = HeaderValue::from_str(self.api_token.expose_secret().trim()).map_err(|e| {
            ZiplineError::InvalidConfig(format!("Invalid characters in API token: {}", e))
        })?;
        value.set_sensitive(true);
        Ok(value)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/user/files` with the filter's query string
    pub fn files_url(&self, filter: &FileFilter) -> Result<Url, ZiplineError> {
        let mut url = Url::parse(&self.endpoint("/api/user/files"))
            .map_err(|e| ZiplineError::InvalidConfig(format!("Invalid files URL: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in filter.query_pairs() {
                query.append_pair(key, &value);
            }
        }
        Ok(url)
    }

    /// `/api/user/files/{id}[/suffix]`, the id percent-encoded as a single segment
    fn file_url(&self, id: &FileId, suffix: Option<&str>) -> Result<Url, ZiplineError> {
        if !id.is_path_safe() {
            return Err(ZiplineError::InvalidId(id.to_string()));
        }
        let mut url = Url::parse(&self.endpoint("/api/user/files"))
            .map_err(|e| ZiplineError::InvalidConfig(format!("Invalid files URL: {}", e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ZiplineError::InvalidConfig(format!("Server URL cannot take a path: {}", self.base_url))
            })?;
            segments.push(&id.to_string());
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ZiplineError> {
        let request = builder
            .header(AUTHORIZATION, self.auth_header()?)
            .build()
            .map_err(|e| ZiplineError::InvalidConfig(format!("Build request failed: {}", e)))?;
        zipline_log(&format!("{} {}", request.method(), request.url().path()));
        self.client
            .execute(request)
            .await
            .map_err(|e| ZiplineError::Network(e.to_string()))
    }

    /// Read the body; non-2xx becomes a structured or status-line error
    async fn checked_body(resp: Response) -> Result<String, ZiplineError> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ZiplineError::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            zipline_log(&format!("HTTP {} body: {}", status, preview(&text)));
            return Err(ZiplineError::from_response_body(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status"),
                &text,
            ));
        }
        Ok(text)
    }

    fn parse<T: DeserializeOwned>(text: &str) -> Result<T, ZiplineError> {
        serde_json::from_str(text).map_err(|e| {
            ZiplineError::Parse(format!("{}. Body: {}", e, preview(text)))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ZiplineError> {
        let resp = self.execute(self.client.get(url)).await?;
        let text = Self::checked_body(resp).await?;
        Self::parse(&text)
    }

    async fn get_path<T: DeserializeOwned>(&self, path: &str) -> Result<T, ZiplineError> {
        let url = Url::parse(&self.endpoint(path))
            .map_err(|e| ZiplineError::InvalidConfig(format!("Invalid URL for {}: {}", path, e)))?;
        self.get_json(url).await
    }

    /// Calls whose success body is ignored (may be empty or non-JSON)
    async fn send_void(&self, builder: RequestBuilder) -> Result<(), ZiplineError> {
        let resp = self.execute(builder).await?;
        Self::checked_body(resp).await.map(|_| ())
    }

    async fn validate_source(source: &Path) -> Result<u64, ZiplineError> {
        let metadata = tokio::fs::metadata(source).await.map_err(|_| {
            ZiplineError::InvalidUpload(format!("File not found: {}", source.display()))
        })?;
        if !metadata.is_file() {
            return Err(ZiplineError::InvalidUpload(format!(
                "Not a regular file: {}",
                source.display()
            )));
        }
        if metadata.len() == 0 {
            return Err(ZiplineError::InvalidUpload(format!(
                "File is empty: {}",
                source.display()
            )));
        }
        Ok(metadata.len())
    }
}

// ─── ZiplineApi Implementation ───────────────────────────────────────────

#[async_trait]
impl ZiplineApi for ZiplineClient {
    async fn list_files(&self, filter: &FileFilter) -> Result<FilePage, ZiplineError> {
        let url = self.files_url(filter)?;
        self.get_json(url).await
    }

    async fn upload_file(
        &self,
        source: &Path,
        display_name: &str,
        options: &UploadOptions,
    ) -> Result<UploadResponse, ZiplineError> {
        let size = Self::validate_source(source).await?;
        let data = tokio::fs::read(source).await?;

        let mime = mime_guess::from_path(display_name).first_or_octet_stream();
        let part = multipart::Part::bytes(data)
            .file_name(display_name.to_string())
            .mime_str(mime.essence_str())
            .map_err(|e| ZiplineError::InvalidUpload(format!("Invalid MIME type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let mut builder = self.client.post(self.endpoint("/api/upload")).multipart(form);
        for (name, value) in options.headers() {
            builder = builder.header(name, value);
        }

        zipline_log(&format!("Uploading {} as '{}' ({} bytes)", source.display(), display_name, size));
        let resp = self.execute(builder).await?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ZiplineError::Network(format!("Failed to read response: {}", e)))?;
        if !status.is_success() {
            return Err(ZiplineError::Upload {
                status: status.as_u16(),
                body: text,
            });
        }

        Self::parse(&text)
    }

    async fn delete_file(&self, id: &FileId) -> Result<(), ZiplineError> {
        let url = self.file_url(id, None)?;
        let body = serde_json::json!({ "id": id, "all": false });
        let builder = self.client.request(Method::DELETE, url).json(&body);
        self.send_void(builder).await
    }

    async fn toggle_favorite(&self, id: &FileId) -> Result<(), ZiplineError> {
        let url = self.file_url(id, Some("favorite"))?;
        let builder = self.client.request(Method::PATCH, url);
        self.send_void(builder).await
    }

    async fn get_file(&self, id: &FileId) -> Result<ZiplineFile, ZiplineError> {
        let url = self.file_url(id, None)?;
        self.get_json(url).await
    }

    async fn get_stats(&self) -> Result<UserStats, ZiplineError> {
        self.get_path("/api/user/stats").await
    }

    async fn get_current_user(&self) -> Result<CurrentUser, ZiplineError> {
        self.get_path("/api/user").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ZiplineClient {
        ZiplineClient::new(base, SecretString::from("tok".to_string())).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client("https://zip.example.com/").base_url(), "https://zip.example.com");
        assert_eq!(client("https://zip.example.com/z/").base_url(), "https://zip.example.com/z");
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(matches!(
            ZiplineClient::new("not a url", SecretString::from("tok".to_string())),
            Err(ZiplineError::InvalidConfig(_))
        ));
        assert!(matches!(
            ZiplineClient::new("ftp://zip.example.com", SecretString::from("tok".to_string())),
            Err(ZiplineError::InvalidConfig(_))
        ));
        assert!(matches!(
            ZiplineClient::new("https://zip.example.com", SecretString::from("  ".to_string())),
            Err(ZiplineError::InvalidConfig(_))
        ));
        assert!(matches!(
            ZiplineClient::new("https://zip.example.com", SecretString::from("a\nb".to_string())),
            Err(ZiplineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_files_url_query() {
        let c = client("https://zip.example.com");
        let url = c
            .files_url(&FileFilter {
                search: Some("q1 report".to_string()),
                page: Some(2),
                limit: Some(10),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(url.path(), "/api/user/files");
        assert_eq!(url.query(), Some("filter=q1+report&page=2&limit=10"));

        let bare = c.files_url(&FileFilter::default()).unwrap();
        assert_eq!(bare.query(), Some("page=1"));
    }

    #[test]
    fn test_file_url_encodes_id_as_one_segment() {
        let c = client("https://zip.example.com/z/");
        let path = |id: &str, suffix| {
            c.file_url(&FileId::Text(id.to_string()), suffix).unwrap().to_string()
        };

        assert_eq!(path("clx1", None), "https://zip.example.com/z/api/user/files/clx1");
        assert_eq!(
            path("a/b?c#d..", Some("favorite")),
            "https://zip.example.com/z/api/user/files/a%2Fb%3Fc%23d../favorite"
        );
        assert_eq!(path("%2e%2e", None), "https://zip.example.com/z/api/user/files/%252e%252e");
        assert_eq!(
            c.file_url(&FileId::Numeric(7), None).unwrap().path(),
            "/z/api/user/files/7"
        );

        for unsafe_id in ["", ".", ".."] {
            assert!(matches!(
                c.file_url(&FileId::Text(unsafe_id.to_string()), None),
                Err(ZiplineError::InvalidId(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_missing_and_empty_sources() {
        // Port 9 (discard) is never contacted: validation fails first
        let c = client("http://127.0.0.1:9");
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("nope.txt");
        let err = c.upload_file(&missing, "nope.txt", &UploadOptions::default()).await.unwrap_err();
        assert!(matches!(err, ZiplineError::InvalidUpload(_)));
        assert!(err.to_string().contains("File not found"));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, b"").unwrap();
        let err = c.upload_file(&empty, "empty.txt", &UploadOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("File is empty"));

        let err = c.upload_file(dir.path(), "dir", &UploadOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("Not a regular file"));
    }
}
