//! Shared types for the Zipline client
//!
//! Records mirrored from the remote API, the request option structs and the
//! client error type. Field names follow the server's JSON; aliases cover the
//! renamed fields of newer Zipline releases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Record identifier. Older servers use integers, newer ones opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Numeric(u64),
    Text(String),
}

/// Id of an uploaded file
pub type FileId = RecordId;

/// Id of a Zipline account
pub type UserId = RecordId;

impl RecordId {
    /// `.` and `..` cannot stand as a single path segment
    pub fn is_path_safe(&self) -> bool {
        match self {
            RecordId::Numeric(_) => true,
            RecordId::Text(id) => !matches!(id.as_str(), "" | "." | ".."),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Numeric(id) => write!(f, "{}", id),
            RecordId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("id must not be empty".to_string());
        }
        let id = trimmed
            .parse::<u64>()
            .map(RecordId::Numeric)
            .unwrap_or_else(|_| RecordId::Text(trimmed.to_string()));
        if !id.is_path_safe() {
            return Err(format!("invalid id: {}", trimmed));
        }
        Ok(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId::Numeric(id)
    }
}

/// One uploaded file as reported by `/api/user/files`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZiplineFile {
    pub id: FileId,
    #[serde(alias = "name")]
    pub filename: String,
    #[serde(alias = "type", default)]
    pub mimetype: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub url: String,
    /// Upload timestamp (ISO 8601 string)
    #[serde(alias = "createdAt", default)]
    pub upload_date: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub embedded: bool,
    #[serde(rename = "originalName", default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "maxViews", default, skip_serializing_if = "Option::is_none")]
    pub max_views: Option<u64>,
    #[serde(rename = "expiresAt", alias = "deletesAt", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl ZiplineFile {
    /// Parsed upload timestamp, `None` when the server sent something unparseable
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.upload_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// One page of files plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePage {
    #[serde(default)]
    pub files: Vec<ZiplineFile>,
    /// Total number of records across all pages
    #[serde(default)]
    pub count: u64,
    /// Total number of pages
    #[serde(default = "one")]
    pub pages: u32,
    /// Current page (1-based)
    #[serde(default = "one")]
    pub page: u32,
}

fn one() -> u32 {
    1
}

/// A file created by an upload. Older servers return bare URLs, newer ones objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadedFile {
    Url(String),
    Descriptor {
        #[serde(default)]
        id: Option<FileId>,
        url: String,
        #[serde(rename = "type", default)]
        mimetype: Option<String>,
    },
}

impl UploadedFile {
    pub fn url(&self) -> &str {
        match self {
            UploadedFile::Url(url) => url,
            UploadedFile::Descriptor { url, .. } => url,
        }
    }
}

/// Response of `POST /api/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub files: Vec<UploadedFile>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
}

impl UploadResponse {
    /// URL of the first created file, if any
    pub fn first_url(&self) -> Option<&str> {
        self.files.first().map(UploadedFile::url)
    }
}

/// Aggregate statistics from `/api/user/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub users_count: u64,
    #[serde(default)]
    pub avg_size: f64,
}

/// Identity returned by `/api/user`. The account token is deliberately not mapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub administrator: bool,
    #[serde(rename = "superAdmin", default)]
    pub super_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(rename = "embedColor", default, skip_serializing_if = "Option::is_none")]
    pub embed_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratelimit: Option<u64>,
    #[serde(default)]
    pub domains: Vec<String>,
}

/// Structured error body sent by the server on failure
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    /// Number or numeric string depending on the server version
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<serde_json::Value>,
}

/// Server-side naming policy for uploaded files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NamingFormat {
    #[default]
    Random,
    Date,
    Uuid,
    Gfycat,
    Original,
}

impl NamingFormat {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            NamingFormat::Random => "RANDOM",
            NamingFormat::Date => "DATE",
            NamingFormat::Uuid => "UUID",
            NamingFormat::Gfycat => "GFYCAT",
            NamingFormat::Original => "ORIGINAL",
        }
    }
}

impl fmt::Display for NamingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_header_value())
    }
}

impl FromStr for NamingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RANDOM" => Ok(NamingFormat::Random),
            "DATE" => Ok(NamingFormat::Date),
            "UUID" => Ok(NamingFormat::Uuid),
            "GFYCAT" => Ok(NamingFormat::Gfycat),
            "ORIGINAL" => Ok(NamingFormat::Original),
            other => Err(format!(
                "unknown naming format '{}' (expected RANDOM, DATE, UUID, GFYCAT or ORIGINAL)",
                other
            )),
        }
    }
}

/// Options for `upload_file`. Every set field becomes one `x-zipline-*` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadOptions {
    /// Target filename on the server
    pub filename: Option<String>,
    pub format: Option<NamingFormat>,
    /// Domain override for the returned URL
    pub domain: Option<String>,
    /// Keep the original filename when downloading
    pub original_name: bool,
    pub password: Option<String>,
    pub max_views: Option<u64>,
    /// Expiry, passed through to the server untouched
    pub expires_at: Option<String>,
}

impl UploadOptions {
    /// Header name/value pairs for the set options, in a stable order
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();
        if let Some(format) = self.format {
            headers.push(("x-zipline-format", format.as_header_value().to_string()));
        }
        if let Some(domain) = non_empty(&self.domain) {
            headers.push(("x-zipline-domain", domain.to_string()));
        }
        if self.original_name {
            headers.push(("x-zipline-original-name", "true".to_string()));
        }
        if let Some(password) = non_empty(&self.password) {
            headers.push(("x-zipline-password", password.to_string()));
        }
        if let Some(max_views) = self.max_views {
            headers.push(("x-zipline-max-views", max_views.to_string()));
        }
        if let Some(expires_at) = non_empty(&self.expires_at) {
            headers.push(("x-zipline-deletes-at", expires_at.to_string()));
        }
        if let Some(filename) = non_empty(&self.filename) {
            headers.push(("x-zipline-filename", filename.to_string()));
        }
        headers
    }
}

/// Filter for `list_files`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileFilter {
    /// Free-text search (`filter` query parameter)
    pub search: Option<String>,
    pub mimetype: Option<String>,
    pub favorite: Option<bool>,
    /// 1-based page, defaults to 1
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

impl FileFilter {
    /// Query parameters for the set fields. `page` is always present.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = non_empty(&self.search) {
            pairs.push(("filter", search.to_string()));
        }
        if let Some(mimetype) = non_empty(&self.mimetype) {
            pairs.push(("mimetype", mimetype.to_string()));
        }
        if let Some(favorite) = self.favorite {
            pairs.push(("favorite", favorite.to_string()));
        }
        pairs.push(("page", self.page.filter(|p| *p > 0).unwrap_or(1).to_string()));
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Zipline client error type
#[derive(Error, Debug)]
pub enum ZiplineError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx with a structured payload; displays the server message verbatim
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Upload failed ({status}): {body}")]
    Upload { status: u16, body: String },

    #[error("{0}")]
    InvalidUpload(String),

    #[error("No text found in clipboard")]
    EmptyClipboard,

    #[error("Upload failed - no files returned")]
    NoFilesReturned,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid id: '{0}'")]
    InvalidId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Host(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZiplineError {
    /// HTTP status carried by the error, if it came from the server
    pub fn status(&self) -> Option<u16> {
        match self {
            ZiplineError::Api { status, .. }
            | ZiplineError::Http { status, .. }
            | ZiplineError::Upload { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build the error for a failed JSON call: structured message when the body
    /// carries one, status line otherwise.
    pub fn from_response_body(status: u16, reason: &str, body: &str) -> Self {
        match serde_json::from_str::<ErrorPayload>(body) {
            Ok(ErrorPayload { message: Some(message), .. }) if !message.trim().is_empty() => {
                ZiplineError::Api { status, message }
            }
            _ => ZiplineError::Http {
                status,
                reason: reason.to_string(),
            },
        }
    }
}
