//! Config operations: template generation, key lookup, listing, setting, and
//! result types.
//!
//! Provides the logic behind `config list`, `config gen`, `config get`,
//! `config set`, and the `ConfigResult` enum that callers use to display
//! results. Every operation works on the saved form of a config, so what
//! `list` and `get` show is exactly what a file would contain.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::document::{ConfigValue, Document, OrderedMap, Scalar};
use crate::error::InimapError;
use crate::file;
use crate::gateway::Gateway;
use crate::structure::IniObject;

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// The documented default config.
    Template(String),
    /// Confirmation that a template was written to a file.
    TemplateWritten { path: PathBuf },
    /// A key's saved value and its field title.
    KeyValue {
        key: String,
        value: String,
        title: Option<String>,
    },
    /// Confirmation that a value was persisted.
    ValueSet { key: String, value: String },
    /// Flattened key-value pairs: the whole config, or one section of it.
    Listing { entries: Vec<(String, String)> },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Template(t) => write!(f, "{t}"),
            ConfigResult::TemplateWritten { path } => {
                write!(f, "Config template written to {}", path.display())
            }
            ConfigResult::KeyValue { key, value, title } => {
                if let Some(title) = title {
                    writeln!(f, "; {title}")?;
                }
                write!(f, "{key} = {value}")
            }
            ConfigResult::ValueSet { key, value } => write!(f, "Set {key} = {value}"),
            ConfigResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
        }
    }
}

fn default_instance<C: IniObject>() -> Result<C, InimapError> {
    C::instantiate().ok_or(InimapError::NotInstantiable(C::structure().name()))
}

/// The saved text of `C`'s default instance, comments included.
pub fn generate_template<C: IniObject>() -> Result<String, InimapError> {
    Ok(Gateway::save_to_string(&default_instance::<C>()?))
}

/// List every saved value as flattened key-value pairs: `key`, `section.key`,
/// and `key[sub]` for keyed arrays.
pub fn list_values<C: IniObject>(config: &C) -> Result<ConfigResult, InimapError> {
    let doc = Gateway::save_to_document(config)?;
    let mut entries = Vec::new();
    for (key, value) in doc.iter() {
        match value {
            ConfigValue::Section(section) => {
                for (sub_key, sub_value) in section.iter() {
                    push_leaf(&mut entries, format!("{key}.{sub_key}"), sub_value);
                }
            }
            other => push_leaf(&mut entries, key.to_string(), other),
        }
    }
    Ok(ConfigResult::Listing { entries })
}

fn push_leaf(entries: &mut Vec<(String, String)>, key: String, value: &ConfigValue) {
    match value {
        ConfigValue::Map(map) => {
            for (sub, item) in map.iter() {
                entries.push((format!("{key}[{sub}]"), item.to_string()));
            }
        }
        other => entries.push((key, other.to_string())),
    }
}

/// Get a saved value by dotted key, including its field title.
///
/// A key naming a whole section lists that section's entries.
pub fn get_value<C: IniObject>(config: &C, key: &str) -> Result<ConfigResult, InimapError> {
    let title = C::structure()
        .describe(key)
        .ok_or_else(|| InimapError::KeyNotFound(key.into()))?;
    let doc = Gateway::save_to_document(config)?;

    let value = match lookup(&doc, key) {
        Some(Found::Cell(ConfigValue::Section(section))) => {
            let mut entries = Vec::new();
            for (sub_key, sub_value) in section.iter() {
                push_leaf(&mut entries, format!("{key}.{sub_key}"), sub_value);
            }
            return Ok(ConfigResult::Listing { entries });
        }
        Some(Found::Cell(cell)) => cell.to_string(),
        Some(Found::Item(item)) => item.to_string(),
        None => return Err(InimapError::KeyNotFound(key.into())),
    };

    Ok(ConfigResult::KeyValue {
        key: key.into(),
        value,
        title,
    })
}

/// Split `name[sub]` into its parts.
fn split_subkey(key: &str) -> (&str, Option<&str>) {
    match key.strip_suffix(']').and_then(|k| k.split_once('[')) {
        Some((name, sub)) => (name, Some(sub)),
        None => (key, None),
    }
}

enum Found<'a> {
    Cell(&'a ConfigValue),
    Item(&'a Scalar),
}

fn lookup<'a>(doc: &'a Document, dotted_key: &str) -> Option<Found<'a>> {
    let (cell, sub) = match dotted_key.split_once('.') {
        Some((section, leaf)) => {
            let (name, sub) = split_subkey(leaf);
            (doc.section(section)?.get(name)?, sub)
        }
        None => {
            let (name, sub) = split_subkey(dotted_key);
            (doc.get(name)?, sub)
        }
    };

    match (cell, sub) {
        (cell, None) => Some(Found::Cell(cell)),
        (ConfigValue::Map(map), Some(sub)) => map.get(sub).map(Found::Item),
        _ => None,
    }
}

fn leaf_value(existing: Option<&ConfigValue>, sub: Option<&str>, value: &str) -> ConfigValue {
    match sub {
        None => ConfigValue::from(value),
        Some(sub) => {
            let mut map = match existing {
                Some(ConfigValue::Map(map)) => map.clone(),
                _ => OrderedMap::new(),
            };
            map.insert(sub, Scalar::from(value));
            ConfigValue::Map(map)
        }
    }
}

fn assign(doc: &mut Document, dotted_key: &str, value: &str) -> Result<(), InimapError> {
    match dotted_key.split_once('.') {
        Some((section_name, leaf)) => {
            let (name, sub) = split_subkey(leaf);
            let section = doc.section_mut(section_name);
            let cell = leaf_value(section.get(name), sub, value);
            section.insert(name, cell)?;
        }
        None => {
            let (name, sub) = split_subkey(dotted_key);
            let cell = leaf_value(doc.get(name), sub, value);
            doc.insert(name, cell);
        }
    }
    Ok(())
}

/// Set one dotted key in the config file at `path` and write it back.
///
/// The file is read if it exists, otherwise the default instance is the
/// starting point. The new value goes through the same coercion as a load,
/// so an unknown key, a read-only key, or an unconvertible value fails
/// before anything is written.
pub fn set_value<C: IniObject>(path: &Path, key: &str, value: &str) -> Result<ConfigResult, InimapError> {
    let structure = C::structure();
    if structure.describe(key).is_none() {
        return Err(InimapError::KeyNotFound(key.into()));
    }
    if !structure.is_settable(key) {
        return Err(InimapError::InvalidValue {
            key: key.into(),
            reason: "key is read-only".into(),
        });
    }

    let current: C = if path.exists() {
        Gateway::load_from_file(path)?.ok_or(InimapError::NotInstantiable(C::structure().name()))?
    } else {
        default_instance()?
    };

    let mut doc = Gateway::save_to_document(&current)?;
    assign(&mut doc, key, value)?;
    let updated: C =
        Gateway::load_from_document(&doc)?.ok_or(InimapError::NotInstantiable(C::structure().name()))?;

    file::write_creating_dirs(path, &Gateway::save_to_string(&updated))?;
    debug!(path = %path.display(), key, "persisted config value");

    Ok(ConfigResult::ValueSet {
        key: key.into(),
        value: value.into(),
    })
}
