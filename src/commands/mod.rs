//! Launcher commands
//!
//! Each command is a small controller: it owns its view state, calls the
//! `ZiplineApi` and reports through the `Host`. Mutations are never patched
//! into local state; a successful one is followed by a re-fetch of the listing
//! that was last in effect.

pub mod browse_uploads;
pub mod instant_upload;
pub mod recent_uploads;

pub use browse_uploads::{BrowseState, BrowseUploads};
pub use instant_upload::{InstantUpload, InstantUploadOutcome};
pub use recent_uploads::{RecentState, RecentUploads, RECENT_LIMIT};

use crate::host::Host;
use crate::view::{Confirmation, Toast};
use crate::zipline::ZiplineFile;

/// Result of a user action on a list row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action ran (and the list was re-fetched where applicable)
    Done,
    /// The user declined the confirmation; nothing was sent
    Cancelled,
    /// The action failed; state was left as it was
    Failed(String),
}

pub(crate) fn copy_url(host: &dyn Host, file: &ZiplineFile) -> ActionOutcome {
    match host.copy_to_clipboard(&file.url) {
        Ok(()) => {
            host.show_toast(Toast::success("URL copied to clipboard"));
            ActionOutcome::Done
        }
        Err(e) => {
            host.show_toast(Toast::failure("Failed to copy URL", e.to_string()));
            ActionOutcome::Failed(e.to_string())
        }
    }
}

pub(crate) fn open_in_browser(host: &dyn Host, file: &ZiplineFile) -> ActionOutcome {
    match host.open_url(&file.url) {
        Ok(()) => ActionOutcome::Done,
        Err(e) => {
            host.show_toast(Toast::failure("Failed to open URL", e.to_string()));
            ActionOutcome::Failed(e.to_string())
        }
    }
}

/// Toast title after a successful toggle, from the flag before the toggle
pub(crate) fn favorite_toast_title(was_favorite: bool) -> &'static str {
    if was_favorite {
        "Removed from favorites"
    } else {
        "Added to favorites"
    }
}

pub(crate) fn delete_confirmation(file: &ZiplineFile) -> Confirmation {
    Confirmation {
        title: "Delete File".to_string(),
        message: format!(
            "Are you sure you want to delete \"{}\"? This action cannot be undone.",
            file.filename
        ),
        primary_action: "Delete".to_string(),
    }
}
