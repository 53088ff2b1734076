//! Host-facing view model
//!
//! What the commands hand to the launcher host: list rows, empty views,
//! notifications and confirmation prompts. Rendering is the host's business.

/// Icons the host knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Image,
    Video,
    Audio,
    Text,
    Code,
    Pdf,
    Archive,
    Document,
    Star,
    ExclamationMark,
    Dot,
}

impl Icon {
    /// Short glyph for text hosts
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Image => "[img]",
            Icon::Video => "[vid]",
            Icon::Audio => "[aud]",
            Icon::Text => "[txt]",
            Icon::Code => "[src]",
            Icon::Pdf => "[pdf]",
            Icon::Archive => "[zip]",
            Icon::Document => "[doc]",
            Icon::Star => "*",
            Icon::ExclamationMark => "!",
            Icon::Dot => "·",
        }
    }
}

/// Trailing decoration on a list row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessory {
    Text(String),
    Icon(Icon),
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub title: String,
    pub subtitle: Option<String>,
    pub icon: Icon,
    /// Icon drawn with the highlight tint (favorites)
    pub highlighted: bool,
    pub accessories: Vec<Accessory>,
}

/// Placeholder shown instead of rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyView {
    pub icon: Icon,
    pub title: String,
    pub description: String,
}

/// Actions a row offers, in panel order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    CopyUrl,
    OpenInBrowser,
    ToggleFavorite,
    Delete,
    PreviousPage,
    NextPage,
    Refresh,
}

impl ListAction {
    pub fn title(&self, favorite: bool) -> &'static str {
        match self {
            ListAction::CopyUrl => "Copy URL",
            ListAction::OpenInBrowser => "Open in Browser",
            ListAction::ToggleFavorite if favorite => "Remove from Favorites",
            ListAction::ToggleFavorite => "Add to Favorites",
            ListAction::Delete => "Delete File",
            ListAction::PreviousPage => "Previous Page",
            ListAction::NextPage => "Next Page",
            ListAction::Refresh => "Refresh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Success,
    Failure,
}

/// Transient notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub style: ToastStyle,
    pub title: String,
    pub message: Option<String>,
}

impl Toast {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            style: ToastStyle::Success,
            title: title.into(),
            message: None,
        }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            style: ToastStyle::Failure,
            title: title.into(),
            message: Some(message.into()),
        }
    }
}

/// Destructive-action prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub title: String,
    pub message: String,
    pub primary_action: String,
}
