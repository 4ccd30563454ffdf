//! One-line titles pulled from documentation text.
//!
//! Titles become `; comment` lines when a config is saved. Both block
//! comments and line-comment style are accepted:
//!
//! ```text
//! /**
//!  * Database settings      -> "Database settings"
//!  */
//!
//! /// @var Connection pool  -> "Connection pool"
//! ```
//!
//! Plain text without any comment markers is taken as-is.

const TYPE_MARKER: &str = "@var";

/// Return the first non-empty content line of `doc`, without comment markers
/// and without a leading `@var` annotation. `None` means no title.
pub fn fetch_title(doc: &str) -> Option<String> {
    let body = doc.trim_start();
    let body = body.strip_prefix("/**").unwrap_or(body);

    body.lines()
        .map(clean_line)
        .find(|line| !line.is_empty())
        .map(strip_type_marker)
        .filter(|title| !title.is_empty())
}

fn clean_line(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_suffix("*/").unwrap_or(line);
    let line = line
        .strip_prefix("//!")
        .or_else(|| line.strip_prefix("///"))
        .unwrap_or(line);
    line.trim_start_matches('*').trim()
}

fn strip_type_marker(line: &str) -> String {
    match line.strip_prefix(TYPE_MARKER) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
            rest.trim().to_string()
        }
        _ => line.to_string(),
    }
}
