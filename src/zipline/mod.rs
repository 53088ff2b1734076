//! Zipline API Module
//!
//! Typed access to the REST API of a self-hosted Zipline server. Commands talk
//! to the server through the `ZiplineApi` trait so the HTTP client can be swapped
//! for any other implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              ZiplineApi Trait                │
//! │  list, upload, delete, favorite, stats, ...  │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//!              ┌────────────────┐        ┌──────────────┐
//!              │ ZiplineClient  │ ─────▶ │ /api/...     │
//!              └────────────────┘  HTTP  └──────────────┘
//! ```

pub mod client;
pub mod types;

pub use client::ZiplineClient;
pub use types::*;

use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Operations offered by a Zipline server
///
/// Implementations hold no authoritative state: every call goes to the server.
#[async_trait]
pub trait ZiplineApi: Send + Sync {
    /// List the current user's files. Only the set filter fields are sent.
    async fn list_files(&self, filter: &FileFilter) -> Result<FilePage, ZiplineError>;

    /// Upload a local file as multipart field `file` named `display_name`
    async fn upload_file(
        &self,
        source: &Path,
        display_name: &str,
        options: &UploadOptions,
    ) -> Result<UploadResponse, ZiplineError>;

    /// Delete one file by id
    async fn delete_file(&self, id: &FileId) -> Result<(), ZiplineError>;

    /// Flip the favorite flag server-side
    async fn toggle_favorite(&self, id: &FileId) -> Result<(), ZiplineError>;

    async fn get_file(&self, id: &FileId) -> Result<ZiplineFile, ZiplineError>;

    async fn get_stats(&self) -> Result<UserStats, ZiplineError>;

    async fn get_current_user(&self) -> Result<CurrentUser, ZiplineError>;

    /// Liveness check: `true` when the current user can be fetched.
    /// Errors are swallowed.
    async fn test_connection(&self) -> bool {
        match self.get_current_user().await {
            Ok(_) => true,
            Err(e) => {
                debug!("[ZIPLINE] connection test failed: {}", e);
                false
            }
        }
    }
}
