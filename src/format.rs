//! Display helpers: sizes, dates, relative times and MIME icons

use chrono::{DateTime, Local, Utc};

use crate::view::Icon;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size with 1024-based units, at most two decimals
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Local date/time for an ISO 8601 timestamp; unparseable input is returned as-is
pub fn format_date(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => value.to_string(),
    }
}

/// "Just now", "N minutes ago", ... up to a week, then the full date
pub fn relative_time(value: &str, now: DateTime<Utc>) -> String {
    let Some(uploaded) = parse_timestamp(value) else {
        return value.to_string();
    };
    let secs = (now - uploaded).num_seconds().max(0);

    match secs {
        0..=59 => "Just now".to_string(),
        60..=3_599 => format!("{} minutes ago", secs / 60),
        3_600..=86_399 => format!("{} hours ago", secs / 3_600),
        86_400..=604_799 => format!("{} days ago", secs / 86_400),
        _ => format_date(value),
    }
}

/// Icon for a MIME type
pub fn mime_type_icon(mimetype: &str) -> Icon {
    let mime = mimetype.trim().to_ascii_lowercase();
    let (top, sub) = mime.split_once('/').unwrap_or((mime.as_str(), ""));

    match top {
        "image" => Icon::Image,
        "video" => Icon::Video,
        "audio" => Icon::Audio,
        _ if sub == "pdf" => Icon::Pdf,
        _ if matches!(
            sub,
            "zip" | "x-zip-compressed" | "gzip" | "x-gzip" | "x-tar" | "x-7z-compressed"
                | "x-rar-compressed" | "vnd.rar" | "x-bzip2" | "x-xz"
        ) => Icon::Archive,
        _ if matches!(
            sub,
            "json" | "javascript" | "x-javascript" | "typescript" | "xml" | "x-sh"
                | "x-python" | "x-rust" | "css" | "html" | "x-yaml" | "yaml" | "toml"
        ) => Icon::Code,
        "text" => Icon::Text,
        _ => Icon::Document,
    }
}
