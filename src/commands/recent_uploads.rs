//! Recent Uploads: the latest files, newest first

use chrono::Utc;
use std::cmp::Reverse;
use tracing::info;

use super::{copy_url, favorite_toast_title, open_in_browser, ActionOutcome};
use crate::format::{format_file_size, mime_type_icon, relative_time};
use crate::host::Host;
use crate::view::{Accessory, EmptyView, Icon, ListAction, ListItem, Toast};
use crate::zipline::{FileFilter, ZiplineApi, ZiplineFile};

/// Number of files shown
pub const RECENT_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RecentState {
    pub files: Vec<ZiplineFile>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for RecentState {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

/// Newest first. The server gives no ordering guarantee; unparseable dates go last.
pub fn sort_newest_first(files: &mut [ZiplineFile]) {
    files.sort_by_key(|file| Reverse(file.uploaded_at()));
}

pub struct RecentUploads<'a> {
    api: &'a dyn ZiplineApi,
    host: &'a dyn Host,
    state: RecentState,
}

impl<'a> RecentUploads<'a> {
    pub fn new(api: &'a dyn ZiplineApi, host: &'a dyn Host) -> Self {
        Self {
            api,
            host,
            state: RecentState::default(),
        }
    }

    pub fn state(&self) -> &RecentState {
        &self.state
    }

    pub async fn mount(&mut self) {
        self.load().await;
    }

    /// Fetch and sort. Also the Refresh and Retry action.
    pub async fn load(&mut self) {
        self.state.loading = true;
        self.state.error = None;

        let filter = FileFilter {
            limit: Some(RECENT_LIMIT),
            ..Default::default()
        };

        match self.api.list_files(&filter).await {
            Ok(response) => {
                let mut files = response.files;
                sort_newest_first(&mut files);
                info!("Loaded {} recent uploads", files.len());
                self.state.files = files;
                self.state.loading = false;
            }
            Err(e) => {
                let message = e.to_string();
                self.state.loading = false;
                self.state.error = Some(message.clone());
                self.host.show_toast(Toast::failure("Failed to load recent uploads", message));
            }
        }
    }

    pub async fn toggle_favorite(&mut self, file: &ZiplineFile) -> ActionOutcome {
        match self.api.toggle_favorite(&file.id).await {
            Ok(()) => {
                self.host.show_toast(Toast::success(favorite_toast_title(file.favorite)));
                self.load().await;
                ActionOutcome::Done
            }
            Err(e) => {
                self.host.show_toast(Toast::failure("Failed to toggle favorite", e.to_string()));
                ActionOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn copy_url(&self, file: &ZiplineFile) -> ActionOutcome {
        copy_url(self.host, file)
    }

    pub fn open(&self, file: &ZiplineFile) -> ActionOutcome {
        open_in_browser(self.host, file)
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn navigation_title(&self) -> &'static str {
        "Recent Uploads"
    }

    pub fn items(&self) -> Vec<ListItem> {
        let now = Utc::now();
        self.state
            .files
            .iter()
            .map(|file| {
                let mut accessories = vec![
                    Accessory::Text(relative_time(&file.upload_date, now)),
                    Accessory::Text(format!("{} views", file.views)),
                ];
                if file.favorite {
                    accessories.push(Accessory::Icon(Icon::Star));
                }
                ListItem {
                    title: file.filename.clone(),
                    subtitle: Some(format_file_size(file.size)),
                    icon: mime_type_icon(&file.mimetype),
                    highlighted: file.favorite,
                    accessories,
                }
            })
            .collect()
    }

    pub fn empty_view(&self) -> Option<EmptyView> {
        if let Some(ref error) = self.state.error {
            return Some(EmptyView {
                icon: Icon::ExclamationMark,
                title: "Error Loading Recent Files".to_string(),
                description: error.clone(),
            });
        }
        if self.state.files.is_empty() && !self.state.loading {
            return Some(EmptyView {
                icon: Icon::Document,
                title: "No Recent Uploads".to_string(),
                description: "Upload your first file to see it here".to_string(),
            });
        }
        None
    }

    /// Read-only list: no delete, no paging
    pub fn actions(&self) -> Vec<ListAction> {
        vec![
            ListAction::CopyUrl,
            ListAction::OpenInBrowser,
            ListAction::ToggleFavorite,
            ListAction::Refresh,
        ]
    }
}
