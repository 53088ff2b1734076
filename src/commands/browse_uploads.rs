//! Browse Uploads: searchable, paginated list of the user's files

use tracing::info;

use super::{copy_url, delete_confirmation, favorite_toast_title, open_in_browser, ActionOutcome};
use crate::format::{format_date, format_file_size, mime_type_icon};
use crate::host::Host;
use crate::view::{Accessory, EmptyView, Icon, ListAction, ListItem, Toast};
use crate::zipline::{FileFilter, ZiplineApi, ZiplineFile};

/// View state of the browse list
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseState {
    pub files: Vec<ZiplineFile>,
    pub loading: bool,
    pub error: Option<String>,
    pub search_text: String,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            loading: true,
            error: None,
            search_text: String::new(),
            page: 1,
            total_pages: 1,
            total_count: 0,
        }
    }
}

pub struct BrowseUploads<'a> {
    api: &'a dyn ZiplineApi,
    host: &'a dyn Host,
    page_size: u32,
    state: BrowseState,
}

impl<'a> BrowseUploads<'a> {
    pub fn new(api: &'a dyn ZiplineApi, host: &'a dyn Host, page_size: u32) -> Self {
        Self {
            api,
            host,
            page_size,
            state: BrowseState::default(),
        }
    }

    pub fn state(&self) -> &BrowseState {
        &self.state
    }

    pub async fn mount(&mut self) {
        self.load_files(1, "").await;
    }

    /// Fetch one page. On failure the previous rows stay and the error is shown.
    pub async fn load_files(&mut self, page: u32, search: &str) {
        self.state.loading = true;
        self.state.error = None;

        let filter = FileFilter {
            search: Some(search.to_string()).filter(|s| !s.is_empty()),
            page: Some(page),
            limit: Some(self.page_size),
            ..Default::default()
        };

        match self.api.list_files(&filter).await {
            Ok(response) => {
                info!(
                    "Loaded page {}/{} ({} files, {} total)",
                    page,
                    response.pages,
                    response.files.len(),
                    response.count
                );
                self.state.files = response.files;
                self.state.loading = false;
                self.state.page = page;
                self.state.total_pages = response.pages;
                self.state.total_count = response.count;
            }
            Err(e) => {
                let message = e.to_string();
                self.state.loading = false;
                self.state.error = Some(message.clone());
                self.host.show_toast(Toast::failure("Failed to load files", message));
            }
        }
    }

    /// Re-issue the listing last in effect (also the Retry action)
    pub async fn refresh(&mut self) {
        let (page, search) = (self.state.page, self.state.search_text.clone());
        self.load_files(page, &search).await;
    }

    /// New search text always restarts at page 1
    pub async fn search(&mut self, text: &str) {
        self.state.search_text = text.to_string();
        self.load_files(1, text).await;
    }

    pub fn can_go_previous(&self) -> bool {
        self.state.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.state.page < self.state.total_pages
    }

    /// Returns `false` without a request when already on the last page
    pub async fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        let search = self.state.search_text.clone();
        self.load_files(self.state.page + 1, &search).await;
        true
    }

    /// Returns `false` without a request when already on the first page
    pub async fn previous_page(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        let search = self.state.search_text.clone();
        self.load_files(self.state.page - 1, &search).await;
        true
    }

    pub async fn toggle_favorite(&mut self, file: &ZiplineFile) -> ActionOutcome {
        match self.api.toggle_favorite(&file.id).await {
            Ok(()) => {
                self.host.show_toast(Toast::success(favorite_toast_title(file.favorite)));
                self.refresh().await;
                ActionOutcome::Done
            }
            Err(e) => {
                self.host.show_toast(Toast::failure("Failed to toggle favorite", e.to_string()));
                ActionOutcome::Failed(e.to_string())
            }
        }
    }

    pub async fn delete(&mut self, file: &ZiplineFile) -> ActionOutcome {
        if !self.host.confirm(&delete_confirmation(file)) {
            return ActionOutcome::Cancelled;
        }

        match self.api.delete_file(&file.id).await {
            Ok(()) => {
                info!("Deleted file {} ({})", file.filename, file.id);
                self.host.show_toast(Toast::success("File deleted successfully"));
                self.refresh().await;
                ActionOutcome::Done
            }
            Err(e) => {
                self.host.show_toast(Toast::failure("Failed to delete file", e.to_string()));
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

    pub fn navigation_title(&self) -> String {
        format!("Uploads ({} total)", self.state.total_count)
    }

    pub fn items(&self) -> Vec<ListItem> {
        self.state
            .files
            .iter()
            .map(|file| {
                let mut accessories = vec![Accessory::Text(format!("{} views", file.views))];
                if file.favorite {
                    accessories.push(Accessory::Icon(Icon::Star));
                }
                ListItem {
                    title: file.filename.clone(),
                    subtitle: Some(format!(
                        "{} • {}",
                        format_file_size(file.size),
                        format_date(&file.upload_date)
                    )),
                    icon: mime_type_icon(&file.mimetype),
                    highlighted: file.favorite,
                    accessories,
                }
            })
            .collect()
    }

    /// Placeholder replacing the rows, if any
    pub fn empty_view(&self) -> Option<EmptyView> {
        if let Some(ref error) = self.state.error {
            return Some(EmptyView {
                icon: Icon::ExclamationMark,
                title: "Error Loading Files".to_string(),
                description: error.clone(),
            });
        }
        if self.state.files.is_empty() && !self.state.loading {
            let description = if self.state.search_text.is_empty() {
                "Upload your first file to get started"
            } else {
                "Try adjusting your search query"
            };
            return Some(EmptyView {
                icon: Icon::Document,
                title: "No Files Found".to_string(),
                description: description.to_string(),
            });
        }
        None
    }

    /// "Page X of Y" row, only when there is more than one page
    pub fn page_indicator(&self) -> Option<ListItem> {
        (self.state.total_pages > 1).then(|| ListItem {
            title: format!("Page {} of {}", self.state.page, self.state.total_pages),
            subtitle: None,
            icon: Icon::Dot,
            highlighted: false,
            accessories: Vec::new(),
        })
    }

    /// Actions offered on a file row
    pub fn actions(&self) -> Vec<ListAction> {
        let mut actions = vec![
            ListAction::CopyUrl,
            ListAction::OpenInBrowser,
            ListAction::ToggleFavorite,
            ListAction::Delete,
        ];
        if self.can_go_previous() {
            actions.push(ListAction::PreviousPage);
        }
        if self.can_go_next() {
            actions.push(ListAction::NextPage);
        }
        actions.push(ListAction::Refresh);
        actions
    }
}
