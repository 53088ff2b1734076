//! Zipline CLI - launcher commands for a self-hosted Zipline server
//!
//! Usage:
//!   zipline-cli browse [--search <text>]   Interactive, paginated list of uploads
//!   zipline-cli recent                     Interactive list of the 10 latest uploads
//!   zipline-cli clip                       Upload clipboard text, copy the URL back
//!   zipline-cli ls [filters]               Print one page of files
//!   zipline-cli upload <path> [options]    Upload a file
//!   zipline-cli info|rm|fav <id>           Single-file operations
//!   zipline-cli stats | whoami | ping      Account information and liveness
//!   zipline-cli configure --url --token    Save preferences

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use zipline_launcher::format::{format_date, format_file_size};
use zipline_launcher::preferences::{self, Preferences, StoredPreferences};
use zipline_launcher::view::{Accessory, Confirmation, EmptyView, ListAction, ListItem};
use zipline_launcher::zipline::{
    FileFilter, FileId, NamingFormat, UploadOptions, ZiplineApi, ZiplineFile,
};
use zipline_launcher::{
    init_logging, BrowseUploads, Host, InstantUpload, InstantUploadOutcome, RecentUploads,
    TerminalHost, ZiplineClient, ZiplineError,
};

#[derive(Parser)]
#[command(
    name = "zipline-cli",
    about = "Zipline CLI - browse, search and upload files on a Zipline server",
    version,
    long_about = "Launcher commands for a self-hosted Zipline server.\nServer URL, API token and page size come from the preferences file; the global flags override them for one run."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Zipline server URL (overrides the saved preference)
    #[arg(long, global = true)]
    url: Option<String>,

    /// API token (overrides the saved preference)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Files per page in `browse` (overrides the saved preference)
    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Save --url, --token and --page-size as preferences
    Configure,
    #[command(flatten)]
    Server(ServerCommand),
}

/// Subcommands that talk to the configured server
#[derive(Subcommand)]
enum ServerCommand {
    /// Browse, search and manage uploads interactively
    Browse {
        /// Initial search text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the most recent uploads
    Recent,
    /// Upload clipboard text and copy the resulting URL
    Clip,
    /// List one page of files
    Ls {
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
        /// Only files of this MIME type
        #[arg(long)]
        mimetype: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        /// Page number (default: 1)
        #[arg(long)]
        page: Option<u32>,
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload a local file
    Upload {
        /// Local file path
        path: PathBuf,
        /// Name sent with the file (default: local filename)
        #[arg(long)]
        name: Option<String>,
        /// Target filename on the server
        #[arg(long)]
        filename: Option<String>,
        /// Naming format: RANDOM, DATE, UUID, GFYCAT or ORIGINAL
        #[arg(long)]
        format: Option<NamingFormat>,
        /// Domain override for the returned URL
        #[arg(long)]
        domain: Option<String>,
        /// Preserve the original filename
        #[arg(long)]
        original_name: bool,
        /// Password-protect the file
        #[arg(long)]
        password: Option<String>,
        /// Delete after this many views
        #[arg(long)]
        max_views: Option<u64>,
        /// Expiry passed to the server (e.g., 1d or an ISO date)
        #[arg(long)]
        expires: Option<String>,
        /// Copy the first URL to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Show one file
    Info {
        id: FileId,
    },
    /// Delete one file
    Rm {
        id: FileId,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Toggle the favorite flag of one file
    Fav {
        id: FileId,
    },
    /// Show account statistics
    Stats,
    /// Show the current user
    Whoami,
    /// Check that the server and token work
    Ping,
}

impl Cli {
    fn overrides(&self) -> StoredPreferences {
        StoredPreferences {
            zipline_url: self.url.clone(),
            api_token: self.token.clone(),
            page_size: self.page_size,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = cli.overrides();
    let stored = preferences::load_preferences();

    match cli.command {
        Commands::Configure => configure(stored, overrides),
        Commands::Server(command) => {
            let prefs = Preferences::from_stored(stored.merged(overrides)).context("Cannot start")?;
            let client = prefs.create_client()?;
            execute(command, &client, prefs.page_size).await
        }
    }
}

async fn execute(command: ServerCommand, client: &ZiplineClient, page_size: u32) -> Result<()> {
    match command {
        ServerCommand::Browse { search } => browse(client, page_size, search).await,
        ServerCommand::Recent => recent(client).await,
        ServerCommand::Clip => clip(client).await,
        ServerCommand::Ls { search, mimetype, favorites, page, limit, json } => {
            let filter = FileFilter {
                search,
                mimetype,
                favorite: favorites.then_some(true),
                page,
                limit,
            };
            ls(client, filter, json).await
        }
        ServerCommand::Upload {
            path,
            name,
            filename,
            format,
            domain,
            original_name,
            password,
            max_views,
            expires,
            copy,
        } => {
            let options = UploadOptions {
                filename,
                format,
                domain,
                original_name,
                password,
                max_views,
                expires_at: expires,
            };
            upload(client, path, name, options, copy).await
        }
        ServerCommand::Info { id } => info(client, &id).await,
        ServerCommand::Rm { id, yes } => remove(client, &id, yes).await,
        ServerCommand::Fav { id } => {
            with_spinner("Toggling favorite...", client.toggle_favorite(&id)).await?;
            println!("Toggled favorite on file {}", id);
            Ok(())
        }
        ServerCommand::Stats => stats(client).await,
        ServerCommand::Whoami => whoami(client).await,
        ServerCommand::Ping => {
            if with_spinner("Connecting...", client.test_connection()).await {
                println!("Connected to {}", client.base_url());
                Ok(())
            } else {
                bail!("Could not reach {} with the configured token", client.base_url())
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

fn configure(stored: StoredPreferences, overrides: StoredPreferences) -> Result<()> {
    let path = preferences::preferences_path();

    if overrides == StoredPreferences::default() {
        println!("Preferences ({})", path.display());
        println!("  url:       {}", stored.zipline_url.as_deref().unwrap_or("(not set)"));
        println!(
            "  token:     {}",
            stored.api_token.as_deref().map(mask_token).unwrap_or_else(|| "(not set)".to_string())
        );
        println!("  page size: {}", preferences::effective_page_size(stored.page_size));
        return Ok(());
    }

    let merged = stored.merged(overrides);
    preferences::save_preferences(&merged).context("Failed to save preferences")?;
    println!("Preferences saved to {}", path.display());
    Ok(())
}

// ─── Rendering ───────────────────────────────────────────────────────────

fn render_item(index: usize, item: &ListItem) -> String {
    let mut line = format!("{:>3}. {} {}", index + 1, item.icon.glyph(), item.title);
    if item.highlighted {
        line.push_str(" *");
    }
    if let Some(ref subtitle) = item.subtitle {
        line.push_str("  ");
        line.push_str(subtitle);
    }
    let texts: Vec<&str> = item
        .accessories
        .iter()
        .filter_map(|a| match a {
            Accessory::Text(text) => Some(text.as_str()),
            Accessory::Icon(_) => None,
        })
        .collect();
    if !texts.is_empty() {
        line.push_str("  (");
        line.push_str(&texts.join(", "));
        line.push(')');
    }
    line
}

fn action_key(action: ListAction) -> &'static str {
    match action {
        ListAction::CopyUrl => "c",
        ListAction::OpenInBrowser => "o",
        ListAction::ToggleFavorite => "f",
        ListAction::Delete => "d",
        ListAction::PreviousPage => "p",
        ListAction::NextPage => "n",
        ListAction::Refresh => "r",
    }
}

fn is_row_action(action: ListAction) -> bool {
    matches!(
        action,
        ListAction::CopyUrl | ListAction::OpenInBrowser | ListAction::ToggleFavorite | ListAction::Delete
    )
}

/// Footer entry; the favorite action lists both titles since it depends on the row
fn action_hint(action: ListAction) -> String {
    let key = action_key(action);
    match action {
        ListAction::ToggleFavorite => format!(
            "{} N {}/{}",
            key,
            action.title(false),
            action.title(true)
        ),
        _ if is_row_action(action) => format!("{} N {}", key, action.title(false)),
        _ => format!("{} {}", key, action.title(false)),
    }
}

/// Action panel for one row (`h N`)
fn row_panel(index: usize, file: &ZiplineFile, actions: &[ListAction]) -> Vec<String> {
    actions
        .iter()
        .filter(|a| is_row_action(**a))
        .map(|a| format!("  {} {}  {}", action_key(*a), index + 1, a.title(file.favorite)))
        .collect()
}

fn render_list(
    title: &str,
    items: &[ListItem],
    empty: Option<EmptyView>,
    page: Option<ListItem>,
    actions: &[ListAction],
    searchable: bool,
) {
    println!();
    println!("── {} ──", title);
    // Rows kept from before a failed reload win over the placeholder
    match empty {
        Some(view) if items.is_empty() => {
            println!("{} {}", view.icon.glyph(), view.title);
            println!("  {}", view.description);
        }
        _ => {
            for (index, item) in items.iter().enumerate() {
                println!("{}", render_item(index, item));
            }
        }
    }
    if let Some(page) = page {
        println!("     {} {}", page.icon.glyph(), page.title);
    }
    let mut hints: Vec<String> = actions.iter().map(|a| action_hint(*a)).collect();
    if searchable {
        hints.push("/text Search".to_string());
    }
    hints.push("h N Actions".to_string());
    hints.push("q Quit".to_string());
    println!("[{}]", hints.join(" · "));
}

// ─── Interactive lists ───────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Quit,
    Next,
    Previous,
    Refresh,
    Search(String),
    Copy(usize),
    Open(usize),
    Favorite(usize),
    Delete(usize),
    Help(Option<usize>),
}

impl ReplCommand {
    /// Row the command acts on, if any
    fn row(&self) -> Option<usize> {
        match self {
            ReplCommand::Copy(i)
            | ReplCommand::Open(i)
            | ReplCommand::Favorite(i)
            | ReplCommand::Delete(i)
            | ReplCommand::Help(Some(i)) => Some(*i),
            _ => None,
        }
    }
}

/// Parse one prompt line. Row numbers are 1-based on screen, 0-based here.
fn parse_repl_command(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if let Some(search) = line.strip_prefix('/') {
        return Some(ReplCommand::Search(search.trim().to_string()));
    }

    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    let row = parts
        .next()
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map(|n| n - 1);

    match (verb, row) {
        ("q" | "quit" | "exit", _) => Some(ReplCommand::Quit),
        ("n" | "next", _) => Some(ReplCommand::Next),
        ("p" | "prev" | "previous", _) => Some(ReplCommand::Previous),
        ("r" | "refresh" | "retry", _) => Some(ReplCommand::Refresh),
        ("h" | "help" | "?", row) => Some(ReplCommand::Help(row)),
        ("c" | "copy", Some(i)) => Some(ReplCommand::Copy(i)),
        ("o" | "open", Some(i)) => Some(ReplCommand::Open(i)),
        ("f" | "fav", Some(i)) => Some(ReplCommand::Favorite(i)),
        ("d" | "rm" | "delete", Some(i)) => Some(ReplCommand::Delete(i)),
        _ => None,
    }
}

/// Next non-empty command from stdin; `None` on EOF
fn prompt() -> Option<String> {
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => return None,
            Ok(_) if line.trim().is_empty() => continue,
            Ok(_) => return Some(line),
        }
    }
}

async fn browse(client: &ZiplineClient, page_size: u32, search: Option<String>) -> Result<()> {
    let host = TerminalHost::default();
    let mut list = BrowseUploads::new(client, &host, page_size);

    match search {
        Some(text) => with_spinner("Searching...", list.search(&text)).await,
        None => with_spinner("Loading uploads...", list.mount()).await,
    }

    let mut redraw = true;
    loop {
        if redraw {
            render_list(
                &list.navigation_title(),
                &list.items(),
                list.empty_view(),
                list.page_indicator(),
                &list.actions(),
                true,
            );
        }
        redraw = true;

        let Some(line) = prompt() else { break };
        let Some(command) = parse_repl_command(&line) else {
            eprintln!("Unknown command. Type h for help.");
            continue;
        };

        let target = command.row().map(|i| (i, list.state().files.get(i).cloned()));
        if let Some((i, None)) = target {
            eprintln!("No row {}.", i + 1);
            continue;
        }
        let file = target.and_then(|(_, file)| file);

        match (command, file) {
            (ReplCommand::Quit, _) => break,
            (ReplCommand::Help(Some(index)), Some(file)) => {
                for line in row_panel(index, &file, &list.actions()) {
                    println!("{}", line);
                }
                redraw = false;
            }
            (ReplCommand::Help(_), _) => continue,
            (ReplCommand::Next, _) => {
                if !with_spinner("Loading...", list.next_page()).await {
                    eprintln!("Already on the last page.");
                }
            }
            (ReplCommand::Previous, _) => {
                if !with_spinner("Loading...", list.previous_page()).await {
                    eprintln!("Already on the first page.");
                }
            }
            (ReplCommand::Refresh, _) => with_spinner("Refreshing...", list.refresh()).await,
            (ReplCommand::Search(text), _) => with_spinner("Searching...", list.search(&text)).await,
            (ReplCommand::Copy(_), Some(file)) => {
                list.copy_url(&file);
            }
            (ReplCommand::Open(_), Some(file)) => {
                list.open(&file);
            }
            (ReplCommand::Favorite(_), Some(file)) => {
                with_spinner("Updating...", list.toggle_favorite(&file)).await;
            }
            (ReplCommand::Delete(_), Some(file)) => {
                list.delete(&file).await;
            }
            (_, None) => {}
        }
    }
    Ok(())
}

async fn recent(client: &ZiplineClient) -> Result<()> {
    let host = TerminalHost::default();
    let mut list = RecentUploads::new(client, &host);
    with_spinner("Loading recent uploads...", list.mount()).await;

    let mut redraw = true;
    loop {
        if redraw {
            render_list(
                list.navigation_title(),
                &list.items(),
                list.empty_view(),
                None,
                &list.actions(),
                false,
            );
        }
        redraw = true;

        let Some(line) = prompt() else { break };
        let Some(command) = parse_repl_command(&line) else {
            eprintln!("Unknown command. Type h for help.");
            continue;
        };
        let target = command.row().map(|i| (i, list.state().files.get(i).cloned()));
        if let Some((i, None)) = target {
            eprintln!("No row {}.", i + 1);
            continue;
        }
        let file = target.and_then(|(_, file)| file);

        match (command, file) {
            (ReplCommand::Quit, _) => break,
            (ReplCommand::Refresh, _) => with_spinner("Refreshing...", list.load()).await,
            (ReplCommand::Copy(_), Some(file)) => {
                list.copy_url(&file);
            }
            (ReplCommand::Open(_), Some(file)) => {
                list.open(&file);
            }
            (ReplCommand::Favorite(_), Some(file)) => {
                with_spinner("Updating...", list.toggle_favorite(&file)).await;
            }
            (ReplCommand::Help(Some(index)), Some(file)) => {
                for line in row_panel(index, &file, &list.actions()) {
                    println!("{}", line);
                }
                redraw = false;
            }
            (ReplCommand::Help(_), _) => {}
            _ => eprintln!("Not available here. Type h for help."),
        }
    }
    Ok(())
}

async fn clip(client: &ZiplineClient) -> Result<()> {
    let host = TerminalHost::default();
    match InstantUpload::new(client, &host).run().await {
        InstantUploadOutcome::Uploaded(url) => {
            println!("{}", url);
            Ok(())
        }
        // The HUD already reported it
        InstantUploadOutcome::EmptyClipboard | InstantUploadOutcome::Failed(_) => {
            std::process::exit(1)
        }
    }
}

// ─── Direct subcommands ──────────────────────────────────────────────────

async fn ls(client: &ZiplineClient, filter: FileFilter, json: bool) -> Result<()> {
    let page = with_spinner("Loading files...", client.list_files(&filter)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.files.is_empty() {
        println!("No files found.");
    }
    for file in &page.files {
        println!(
            "{:>10}  {:<40}  {:>10}  {}  {:>5} views{}",
            file.id.to_string(),
            file.filename,
            format_file_size(file.size),
            format_date(&file.upload_date),
            file.views,
            if file.favorite { "  *" } else { "" }
        );
    }
    println!("Page {} of {} ({} total)", page.page, page.pages, page.count);
    Ok(())
}

async fn upload(
    client: &ZiplineClient,
    path: PathBuf,
    name: Option<String>,
    options: UploadOptions,
    copy: bool,
) -> Result<()> {
    let display_name = match name {
        Some(name) => name,
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("Cannot derive a name from {}", path.display()))?,
    };

    let response = with_spinner(
        &format!("Uploading {}...", display_name),
        client.upload_file(&path, &display_name, &options),
    )
    .await?;

    let first = response.first_url().map(str::to_string).ok_or(ZiplineError::NoFilesReturned)?;
    for file in &response.files {
        println!("{}", file.url());
    }

    if copy {
        TerminalHost::default().copy_to_clipboard(&first)?;
        eprintln!("URL copied to clipboard");
    }
    Ok(())
}

async fn info(client: &ZiplineClient, id: &FileId) -> Result<()> {
    let file = with_spinner("Loading file...", client.get_file(id)).await?;
    println!("{}", file.filename);
    println!("  id:        {}", file.id);
    println!("  url:       {}", file.url);
    println!("  type:      {}", file.mimetype);
    println!("  size:      {}", format_file_size(file.size));
    println!("  uploaded:  {}", format_date(&file.upload_date));
    println!("  views:     {}", file.views);
    println!("  favorite:  {}", file.favorite);
    if let Some(ref original) = file.original_name {
        println!("  original:  {}", original);
    }
    if let Some(max_views) = file.max_views {
        println!("  max views: {}", max_views);
    }
    if let Some(ref expires) = file.expires_at {
        println!("  expires:   {}", format_date(expires));
    }
    if file.password.is_some() {
        println!("  password protected");
    }
    Ok(())
}

async fn remove(client: &ZiplineClient, id: &FileId, yes: bool) -> Result<()> {
    let host = TerminalHost::new(yes);
    let confirmation = Confirmation {
        title: "Delete File".to_string(),
        message: format!("Are you sure you want to delete file {}? This action cannot be undone.", id),
        primary_action: "Delete".to_string(),
    };
    if !host.confirm(&confirmation) {
        println!("Cancelled.");
        return Ok(());
    }
    with_spinner("Deleting...", client.delete_file(id)).await?;
    println!("File deleted successfully");
    Ok(())
}

async fn stats(client: &ZiplineClient) -> Result<()> {
    let stats = with_spinner("Loading stats...", client.get_stats()).await?;
    println!("Files:        {}", stats.count);
    println!("Storage used: {}", format_file_size(stats.size));
    println!("Average size: {}", format_file_size(stats.avg_size.max(0.0) as u64));
    println!("Total views:  {}", stats.views_count);
    println!("Users:        {}", stats.users_count);
    Ok(())
}

async fn whoami(client: &ZiplineClient) -> Result<()> {
    let user = with_spinner("Loading user...", client.get_current_user()).await?;
    let role = if user.super_admin {
        "super admin"
    } else if user.administrator {
        "administrator"
    } else {
        "user"
    };
    println!("{} (id {}, {})", user.username, user.id, role);
    if !user.domains.is_empty() {
        println!("Domains: {}", user.domains.join(", "));
    }
    Ok(())
}
