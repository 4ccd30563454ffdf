//! Field-name ↔ document-key conversion.
//!
//! Rust fields are conventionally snake_case already, but descriptors carry the
//! word-capitalized declared name (`appName`, `restV1`) so that documents stay
//! stable no matter how the backing struct spells its members.

/// `appName` → `app_name`, `restV1` → `rest_v1`.
///
/// A new word starts at every uppercase letter unless the current word is
/// still empty, so a leading capital never produces an empty segment.
pub fn to_document_key(name: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut part = String::new();

    for ch in name.chars() {
        if ch.is_uppercase() && !part.is_empty() {
            parts.push(std::mem::take(&mut part));
        }
        part.push(ch);
    }
    if !part.is_empty() {
        parts.push(part);
    }

    parts
        .iter()
        .map(|p| p.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `app_name` → `AppName`, or `appName` when `first_upper` is false.
pub fn to_field_name(key: &str, first_upper: bool) -> String {
    let joined: String = key.split('_').map(capitalize).collect();
    if first_upper {
        joined
    } else {
        lowercase_first(&joined)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lowercase_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
