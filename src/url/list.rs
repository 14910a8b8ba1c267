use crate::ConfigError;
use std::path::Path;

/// Maximum number of URL characters shown in a status line
pub const DISPLAY_URL_CHARS: usize = 50;

/// Parses a line-oriented URL list
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
/// Order and duplicates are preserved.
///
/// # Example
///
/// ```
/// use redirect_mapper::url::parse_url_list;
///
/// let urls = parse_url_list("# old site\nhttps://old.example/a\n\n  https://old.example/b  \n");
/// assert_eq!(urls, vec!["https://old.example/a", "https://old.example/b"]);
/// ```
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads and parses a URL list file
///
/// A missing file or a file with no usable lines is a configuration error,
/// raised before any network activity.
pub fn load_url_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingInput {
            path: path.display().to_string(),
        });
    }

    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    let content = content.trim_start_matches('\u{feff}');
    let urls = parse_url_list(content);

    if urls.is_empty() {
        return Err(ConfigError::EmptyInput {
            path: path.display().to_string(),
        });
    }

    tracing::debug!("Loaded {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

/// Shortens a URL for a status line
pub fn truncate_for_display(url: &str) -> String {
    if url.chars().count() <= DISPLAY_URL_CHARS {
        return url.to_string();
    }
    let head: String = url.chars().take(DISPLAY_URL_CHARS).collect();
    format!("{}...", head)
}
