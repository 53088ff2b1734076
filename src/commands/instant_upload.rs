//! Instant Clipboard Upload: clipboard text → temp file → Zipline → URL on clipboard
//!
//! No UI beyond HUD messages. The temp file is removed on every path once it
//! may exist; removal errors are ignored.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::host::Host;
use crate::zipline::{NamingFormat, UploadOptions, UploadResponse, ZiplineApi, ZiplineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstantUploadOutcome {
    /// Uploaded; the URL is on the clipboard
    Uploaded(String),
    /// Nothing to upload, no request was made
    EmptyClipboard,
    Failed(String),
}

pub struct InstantUpload<'a> {
    api: &'a dyn ZiplineApi,
    host: &'a dyn Host,
    temp_dir: PathBuf,
}

impl<'a> InstantUpload<'a> {
    /// Uses the system temp directory
    pub fn new(api: &'a dyn ZiplineApi, host: &'a dyn Host) -> Self {
        Self::with_temp_dir(api, host, std::env::temp_dir())
    }

    pub fn with_temp_dir(api: &'a dyn ZiplineApi, host: &'a dyn Host, temp_dir: PathBuf) -> Self {
        Self { api, host, temp_dir }
    }

    pub async fn run(&self) -> InstantUploadOutcome {
        let text = match self.host.read_clipboard() {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => {
                self.host.show_hud(&ZiplineError::EmptyClipboard.to_string());
                return InstantUploadOutcome::EmptyClipboard;
            }
            Err(e) => return self.fail(e),
        };

        self.host.show_hud("Uploading clipboard text...");

        let url = match self.upload_text(&text).await {
            Ok(url) => url,
            Err(e) => return self.fail(e),
        };

        if let Err(e) = self.host.copy_to_clipboard(&url) {
            return self.fail(e);
        }
        info!("Clipboard text uploaded to {}", url);
        self.host.show_hud("Text uploaded! URL copied to clipboard");
        InstantUploadOutcome::Uploaded(url)
    }

    fn fail(&self, error: ZiplineError) -> InstantUploadOutcome {
        warn!("Instant upload failed: {}", error);
        let message = if matches!(error, ZiplineError::NoFilesReturned) {
            error.to_string()
        } else {
            format!("Upload failed: {}", error)
        };
        self.host.show_hud(&message);
        InstantUploadOutcome::Failed(message)
    }

    /// Write `text` to a timestamped temp file, upload it, always clean up
    async fn upload_text(&self, text: &str) -> Result<String, ZiplineError> {
        let filename = format!("clipboard-{}.txt", Utc::now().timestamp_millis());
        let temp_path = self.temp_dir.join(&filename);

        let result = self.write_and_upload(&temp_path, &filename, text).await;
        let _ = tokio::fs::remove_file(&temp_path).await;

        let response = result?;
        response
            .first_url()
            .map(str::to_string)
            .ok_or(ZiplineError::NoFilesReturned)
    }

    async fn write_and_upload(
        &self,
        temp_path: &Path,
        filename: &str,
        text: &str,
    ) -> Result<UploadResponse, ZiplineError> {
        tokio::fs::write(temp_path, text).await?;
        let options = UploadOptions {
            format: Some(NamingFormat::Random),
            ..Default::default()
        };
        self.api.upload_file(temp_path, filename, &options).await
    }
}
