//! Fakes for command tests: a scripted `ZiplineApi` and a recording `Host`

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::host::Host;
use crate::view::{Confirmation, Toast};
use crate::zipline::{
    CurrentUser, FileFilter, FileId, FilePage, UploadOptions, UploadResponse, UploadedFile,
    UserStats, ZiplineApi, ZiplineError, ZiplineFile,
};

pub fn file(id: u64, name: &str, uploaded: &str) -> ZiplineFile {
    ZiplineFile {
        id: FileId::Numeric(id),
        filename: name.to_string(),
        mimetype: "text/plain".to_string(),
        size: 1024,
        url: format!("https://zip.example.com/u/{}", name),
        upload_date: uploaded.to_string(),
        views: 3,
        favorite: false,
        embedded: false,
        original_name: None,
        password: None,
        max_views: None,
        expires_at: None,
    }
}

pub fn page(files: Vec<ZiplineFile>, count: u64, pages: u32, page: u32) -> FilePage {
    FilePage { files, count, pages, page }
}

pub fn api_error(message: &str) -> ZiplineError {
    ZiplineError::Api {
        status: 500,
        message: message.to_string(),
    }
}

/// What the fake saw for one upload call
#[derive(Debug, Clone)]
pub struct UploadCall {
    pub source: PathBuf,
    pub display_name: String,
    pub options: UploadOptions,
    /// Whether the source existed while the upload ran
    pub source_existed: bool,
    pub content: Option<String>,
}

/// Scripted API. Queued results are consumed in order; list calls with an
/// empty queue fail.
#[derive(Default)]
pub struct FakeApi {
    pub list_results: Mutex<VecDeque<Result<FilePage, ZiplineError>>>,
    pub list_calls: Mutex<Vec<FileFilter>>,
    pub mutation_results: Mutex<VecDeque<Result<(), ZiplineError>>>,
    pub deleted: Mutex<Vec<FileId>>,
    pub toggled: Mutex<Vec<FileId>>,
    pub upload_result: Mutex<Option<Result<UploadResponse, ZiplineError>>>,
    pub upload_calls: Mutex<Vec<UploadCall>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_list(&self, result: Result<FilePage, ZiplineError>) {
        self.list_results.lock().unwrap().push_back(result);
    }

    pub fn push_mutation(&self, result: Result<(), ZiplineError>) {
        self.mutation_results.lock().unwrap().push_back(result);
    }

    pub fn set_upload(&self, result: Result<UploadResponse, ZiplineError>) {
        *self.upload_result.lock().unwrap() = Some(result);
    }

    pub fn list_calls(&self) -> Vec<FileFilter> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn network_calls(&self) -> usize {
        self.list_calls.lock().unwrap().len()
            + self.deleted.lock().unwrap().len()
            + self.toggled.lock().unwrap().len()
            + self.upload_calls.lock().unwrap().len()
    }

    fn next_mutation(&self) -> Result<(), ZiplineError> {
        self.mutation_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

pub fn uploaded(url: &str) -> UploadResponse {
    UploadResponse {
        files: vec![UploadedFile::Url(url.to_string())],
        url: None,
        upload_date: None,
    }
}

#[async_trait]
impl ZiplineApi for FakeApi {
    async fn list_files(&self, filter: &FileFilter) -> Result<FilePage, ZiplineError> {
        self.list_calls.lock().unwrap().push(filter.clone());
        self.list_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(api_error("no scripted listing")))
    }

    async fn upload_file(
        &self,
        source: &Path,
        display_name: &str,
        options: &UploadOptions,
    ) -> Result<UploadResponse, ZiplineError> {
        self.upload_calls.lock().unwrap().push(UploadCall {
            source: source.to_path_buf(),
            display_name: display_name.to_string(),
            options: options.clone(),
            source_existed: source.exists(),
            content: std::fs::read_to_string(source).ok(),
        });
        self.upload_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(api_error("no scripted upload")))
    }

    async fn delete_file(&self, id: &FileId) -> Result<(), ZiplineError> {
        self.deleted.lock().unwrap().push(id.clone());
        self.next_mutation()
    }

    async fn toggle_favorite(&self, id: &FileId) -> Result<(), ZiplineError> {
        self.toggled.lock().unwrap().push(id.clone());
        self.next_mutation()
    }

    async fn get_file(&self, id: &FileId) -> Result<ZiplineFile, ZiplineError> {
        Err(api_error(&format!("no file {}", id)))
    }

    async fn get_stats(&self) -> Result<UserStats, ZiplineError> {
        Err(api_error("no stats"))
    }

    async fn get_current_user(&self) -> Result<CurrentUser, ZiplineError> {
        Err(api_error("no user"))
    }
}

/// Host that records everything and answers confirmations from a flag
#[derive(Default)]
pub struct RecordingHost {
    pub confirm_answer: bool,
    pub clipboard_in: Mutex<Option<String>>,
    pub clipboard_out: Mutex<Vec<String>>,
    pub toasts: Mutex<Vec<Toast>>,
    pub huds: Mutex<Vec<String>>,
    pub confirmations: Mutex<Vec<Confirmation>>,
    pub opened: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirming(answer: bool) -> Self {
        Self {
            confirm_answer: answer,
            ..Default::default()
        }
    }

    pub fn with_clipboard(text: &str) -> Self {
        let host = Self::default();
        *host.clipboard_in.lock().unwrap() = Some(text.to_string());
        host
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn huds(&self) -> Vec<String> {
        self.huds.lock().unwrap().clone()
    }
}

impl Host for RecordingHost {
    fn show_toast(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }

    fn show_hud(&self, message: &str) {
        self.huds.lock().unwrap().push(message.to_string());
    }

    fn confirm(&self, confirmation: &Confirmation) -> bool {
        self.confirmations.lock().unwrap().push(confirmation.clone());
        self.confirm_answer
    }

    fn read_clipboard(&self) -> Result<Option<String>, ZiplineError> {
        Ok(self.clipboard_in.lock().unwrap().clone())
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<(), ZiplineError> {
        self.clipboard_out.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), ZiplineError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
