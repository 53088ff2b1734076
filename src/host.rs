//! Launcher host capabilities
//!
//! Commands never touch the clipboard, the browser or the screen directly; they
//! go through `Host`. `TerminalHost` is the implementation used by the CLI.

use std::io::{self, BufRead, Write};
use tracing::{info, warn};

use crate::view::{Confirmation, Toast, ToastStyle};
use crate::zipline::ZiplineError;

/// Capabilities provided by the launcher runtime
pub trait Host: Send + Sync {
    fn show_toast(&self, toast: Toast);

    /// Heads-up message shown after the main window is gone
    fn show_hud(&self, message: &str);

    /// Ask before a destructive action. `false` means cancelled.
    fn confirm(&self, confirmation: &Confirmation) -> bool;

    /// Current clipboard text, `None` when the clipboard holds no text
    fn read_clipboard(&self) -> Result<Option<String>, ZiplineError>;

    fn copy_to_clipboard(&self, text: &str) -> Result<(), ZiplineError>;

    fn open_url(&self, url: &str) -> Result<(), ZiplineError>;
}

/// Host backed by the terminal, the system clipboard and the default browser
#[derive(Debug, Default)]
pub struct TerminalHost {
    /// Answer every confirmation with yes (`--yes`)
    pub assume_yes: bool,
}

impl TerminalHost {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Host for TerminalHost {
    fn show_toast(&self, toast: Toast) {
        let line = match toast.message {
            Some(ref message) => format!("{}: {}", toast.title, message),
            None => toast.title.clone(),
        };
        match toast.style {
            ToastStyle::Success => println!("✓ {}", line),
            ToastStyle::Failure => eprintln!("✗ {}", line),
        }
    }

    fn show_hud(&self, message: &str) {
        println!("{}", message);
    }

    fn confirm(&self, confirmation: &Confirmation) -> bool {
        if self.assume_yes {
            return true;
        }
        print!(
            "{}\n{} [{}? y/N] ",
            confirmation.title, confirmation.message, confirmation.primary_action
        );
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn read_clipboard(&self) -> Result<Option<String>, ZiplineError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ZiplineError::Host(format!("Clipboard init failed: {}", e)))?;
        match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(ZiplineError::Host(format!("Clipboard read failed: {}", e))),
        }
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<(), ZiplineError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ZiplineError::Host(format!("Clipboard init failed: {}", e)))?;
        #[cfg(target_os = "linux")]
        {
            // X11/Wayland drop the selection with its owner; keep it long enough
            // for a clipboard manager to take over.
            use arboard::SetExtLinux;
            let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
            clipboard.set().wait_until(deadline).text(text.to_string())
                .map_err(|e| ZiplineError::Host(format!("Clipboard write failed: {}", e)))?;
        }
        #[cfg(not(target_os = "linux"))]
        {
            clipboard.set_text(text.to_string())
                .map_err(|e| ZiplineError::Host(format!("Clipboard write failed: {}", e)))?;
        }
        info!("Copied {} characters to clipboard", text.len());
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), ZiplineError> {
        open::that(url).map_err(|e| {
            warn!("Failed to open {}: {}", url, e);
            ZiplineError::Host(format!("Failed to open browser: {}", e))
        })
    }
}
