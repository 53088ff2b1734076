// Zipline Launcher - quick access to a self-hosted Zipline server
// REST client, launcher commands and the preference/formatting helpers they share

pub mod commands;
pub mod format;
pub mod host;
pub mod preferences;
pub mod view;
pub mod zipline;

#[cfg(test)]
mod test_support;

pub use commands::{ActionOutcome, BrowseUploads, InstantUpload, InstantUploadOutcome, RecentUploads};
pub use host::{Host, TerminalHost};
pub use preferences::{Preferences, StoredPreferences};
pub use zipline::{ZiplineApi, ZiplineClient, ZiplineError};

use tracing::Level;

/// Install the stderr log subscriber. 0 = warnings, 1 = info, 2+ = debug.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
