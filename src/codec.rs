//! Raw INI text ↔ [`Document`].
//!
//! Parsing is a raw scan: values are taken verbatim (surrounding whitespace
//! trimmed, one pair of matching outer quotes removed), with no escape
//! processing, no inline comments, and no multi-line continuation.
//!
//! - `key = value` before any header lands at the top level; after a
//!   `[name]` header it lands in that section. A repeated header reopens the
//!   same section.
//! - `key[] = value` appends to an ordered list, `key[sub] = value` adds a
//!   keyed entry.
//! - Lines starting with `;` and blank lines are ignored.
//!
//! Serialization is line-oriented: the gateway emits lines through the
//! formatting helpers below and [`serialize`] joins them. Values that begin
//! or end with a quote or whitespace are written inside double quotes.

use std::borrow::Cow;

use crate::document::{ConfigValue, Document, OrderedMap, Scalar};
use crate::error::InimapError;

/// Parse INI text into a [`Document`].
///
/// `origin` names the source in error messages (a file path or `"string"`).
pub fn parse(text: &str, origin: &str) -> Result<Document, InimapError> {
    let mut doc = Document::new();
    let mut current_section: Option<String> = None;

    for (i, raw_line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim();
        let fail = |reason: &str| InimapError::ParseError {
            origin: origin.to_string(),
            line: line_no,
            reason: reason.to_string(),
        };

        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or_else(|| fail("unterminated section header"))?
                .trim();
            if name.is_empty() {
                return Err(fail("empty section name"));
            }
            doc.section_mut(name);
            current_section = Some(name.to_string());
            continue;
        }

        let (raw_key, raw_value) = line
            .split_once('=')
            .ok_or_else(|| fail("expected 'key = value'"))?;
        let (name, subkey) = split_key(raw_key.trim()).map_err(|reason| fail(reason))?;
        let value = unquote(raw_value.trim()).map_err(|reason| fail(reason))?;

        match &current_section {
            None => {
                if let Some(fresh) = merge_cell(doc.get_mut(name), subkey, value) {
                    doc.insert(name, fresh);
                }
            }
            Some(section_name) => {
                let section = doc.section_mut(section_name);
                if let Some(fresh) = merge_cell(section.get_mut(name), subkey, value) {
                    section.insert(name, fresh)?;
                }
            }
        }
    }

    Ok(doc)
}

/// Join emitted lines into file text, with a trailing newline.
pub fn serialize(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Leading comment block for a whole file.
pub fn header_comment(title: &str) -> String {
    format!(";\n; {title}")
}

/// Comment preceding a key or section, separated by a blank line.
pub fn comment(title: &str) -> String {
    format!("\n; {title}")
}

pub fn section_header(name: &str) -> String {
    format!("[{name}]")
}

/// A `key = value` line. An empty value renders as `key =`.
pub fn entry(key: &str, value: &str) -> String {
    format!("{key} = {}", quote(value)).trim().to_string()
}

/// A `key[sub] = value` line for keyed lists.
pub fn keyed_entry(key: &str, subkey: &str, value: &str) -> String {
    format!("{key}[{subkey}] = {}", quote(value))
}

/// Wrap values the parser would otherwise trim or unquote. Only the first
/// and last character of a quoted value are stripped, so inner quotes need
/// no escaping.
fn quote(value: &str) -> Cow<'_, str> {
    let needs_quotes = value.trim() != value
        || value.starts_with(['"', '\''])
        || value.ends_with(['"', '\'']);
    if needs_quotes {
        Cow::Owned(format!("\"{value}\""))
    } else {
        Cow::Borrowed(value)
    }
}

#[derive(Debug, PartialEq)]
enum Subkey<'a> {
    Append,
    Named(&'a str),
}

fn split_key(key: &str) -> Result<(&str, Option<Subkey<'_>>), &'static str> {
    let (name, subkey) = match key.strip_suffix(']').and_then(|k| k.split_once('[')) {
        Some((name, "")) => (name.trim_end(), Some(Subkey::Append)),
        Some((name, sub)) => (name.trim_end(), Some(Subkey::Named(sub.trim()))),
        None => (key, None),
    };
    if name.is_empty() {
        return Err("missing key name");
    }
    Ok((name, subkey))
}

fn unquote(value: &str) -> Result<String, &'static str> {
    for quote in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(quote) {
            return rest
                .strip_suffix(quote)
                .map(str::to_string)
                .ok_or("unterminated quoted value");
        }
    }
    Ok(value.to_string())
}

/// Fold one parsed line into an existing cell. Returns a fresh cell when the
/// key is not present yet.
fn merge_cell(
    existing: Option<&mut ConfigValue>,
    subkey: Option<Subkey<'_>>,
    value: String,
) -> Option<ConfigValue> {
    let scalar = Scalar::Str(value);
    match (existing, subkey) {
        (Some(ConfigValue::Seq(items)), Some(Subkey::Append)) => {
            items.push(scalar);
            None
        }
        (Some(ConfigValue::Map(map)), Some(Subkey::Named(sub))) => {
            map.insert(sub, scalar);
            None
        }
        (existing, subkey) => {
            let fresh = match subkey {
                None => ConfigValue::Scalar(scalar),
                Some(Subkey::Append) => ConfigValue::Seq(vec![scalar]),
                Some(Subkey::Named(sub)) => {
                    let mut map = OrderedMap::new();
                    map.insert(sub, scalar);
                    ConfigValue::Map(map)
                }
            };
            match existing {
                Some(slot) => {
                    *slot = fresh;
                    None
                }
                None => Some(fresh),
            }
        }
    }
}
