//! The parsed, two-level shape of an INI source.
//!
//! A [`Document`] holds top-level keys and named [`Section`]s; a section holds
//! only flat keys. Every cell is a [`ConfigValue`], the closed set of shapes a
//! value can take on either side of the mapping:
//!
//! ```text
//! name = demo                ConfigValue::Scalar(Scalar::Str("demo"))
//! hosts[] = a                ConfigValue::Seq([Str("a"), ...])
//! point[x] = 1.5             ConfigValue::Map({x: Str("1.5"), ...})
//! [database]                 ConfigValue::Section(Section { ... })
//! ```
//!
//! The "no section inside a section" rule is enforced when values are
//! inserted, so every [`Document`] that exists is well formed.

use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::error::InimapError;

/// A single leaf value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Insertion-ordered string-keyed map.
///
/// Configuration files are small, so lookups scan linearly; what matters is
/// that iteration order matches the order keys were first seen.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    items: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.items.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.items.push((key, value));
                None
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.items.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (k, v) in &self.items {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// The closed union of shapes a document cell can hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Scalar(Scalar),
    Null,
    /// `key[] = value` lines, or a pre-built ordered list.
    Seq(Vec<Scalar>),
    /// `key[sub] = value` lines, or a pre-built keyed list.
    Map(OrderedMap<Scalar>),
    Section(Section),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ConfigValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, ConfigValue::Section(_))
    }
}

/// Stringification used for untyped exports: sequences and keyed lists are
/// joined with `", "`, null and sections render empty.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Scalar(s) => write!(f, "{s}"),
            ConfigValue::Null | ConfigValue::Section(_) => Ok(()),
            ConfigValue::Seq(items) => write_joined(f, items.iter()),
            ConfigValue::Map(map) => write_joined(f, map.values()),
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Scalar>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

macro_rules! scalar_into_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ConfigValue {
                fn from(value: $ty) -> Self {
                    ConfigValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_into_value!(&str, String, i64, f64, bool);

impl From<Scalar> for ConfigValue {
    fn from(value: Scalar) -> Self {
        ConfigValue::Scalar(value)
    }
}

impl From<Section> for ConfigValue {
    fn from(value: Section) -> Self {
        ConfigValue::Section(value)
    }
}

impl From<Vec<Scalar>> for ConfigValue {
    fn from(value: Vec<Scalar>) -> Self {
        ConfigValue::Seq(value)
    }
}

impl From<OrderedMap<Scalar>> for ConfigValue {
    fn from(value: OrderedMap<Scalar>) -> Self {
        ConfigValue::Map(value)
    }
}

/// One named block of flat keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Section {
    entries: OrderedMap<ConfigValue>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key. Sections cannot hold sections, so a
    /// [`ConfigValue::Section`] is rejected with [`InimapError::NestedSection`].
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Result<Option<ConfigValue>, InimapError> {
        let key = key.into();
        let value = value.into();
        if value.is_section() {
            return Err(InimapError::NestedSection { key });
        }
        Ok(self.entries.insert(key, value))
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> &OrderedMap<ConfigValue> {
        &self.entries
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<OrderedMap<Scalar>> for Section {
    fn from(map: OrderedMap<Scalar>) -> Self {
        let entries = map
            .iter()
            .map(|(k, v)| (k, ConfigValue::Scalar(v.clone())))
            .collect();
        Section { entries }
    }
}

/// Top-level keys plus one level of named sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Document {
    entries: OrderedMap<ConfigValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text. See [`crate::codec::parse`].
    pub fn parse(text: &str) -> Result<Self, InimapError> {
        crate::codec::parse(text, "string")
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Insert a top-level key or a whole section.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.entries.insert(key, value.into())
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        match self.entries.get(name) {
            Some(ConfigValue::Section(section)) => Some(section),
            _ => None,
        }
    }

    /// Get the named section, creating it (or replacing a non-section value
    /// under the same name) if needed.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        if !matches!(self.entries.get(name), Some(ConfigValue::Section(_))) {
            self.entries
                .insert(name, ConfigValue::Section(Section::new()));
        }
        match self.entries.get_mut(name) {
            Some(ConfigValue::Section(section)) => section,
            _ => unreachable!("section inserted above"),
        }
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries.get_mut(key)
    }

    pub fn entries(&self) -> &OrderedMap<ConfigValue> {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shape a JSON object into a document: top-level objects become sections,
/// objects inside sections become keyed lists of scalars.
impl TryFrom<serde_json::Value> for Document {
    type Error = InimapError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(object) = value else {
            return Err(InimapError::InvalidDocument(
                "top level must be an object".into(),
            ));
        };

        let mut doc = Document::new();
        for (key, value) in object {
            let converted = match value {
                serde_json::Value::Object(inner) => {
                    let mut section = Section::new();
                    for (sub_key, sub_value) in inner {
                        let leaf = json_leaf(&format!("{key}.{sub_key}"), sub_value)?;
                        section.insert(sub_key, leaf)?;
                    }
                    ConfigValue::Section(section)
                }
                other => json_leaf(&key, other)?,
            };
            doc.insert(key, converted);
        }
        Ok(doc)
    }
}

fn json_leaf(path: &str, value: serde_json::Value) -> Result<ConfigValue, InimapError> {
    use serde_json::Value;

    match value {
        Value::Null => Ok(ConfigValue::Null),
        Value::Array(items) => items
            .into_iter()
            .map(|item| json_scalar(path, item))
            .collect::<Result<Vec<_>, _>>()
            .map(ConfigValue::Seq),
        Value::Object(object) => object
            .into_iter()
            .map(|(k, v)| json_scalar(path, v).map(|s| (k, s)))
            .collect::<Result<OrderedMap<_>, _>>()
            .map(ConfigValue::Map),
        scalar => json_scalar(path, scalar).map(ConfigValue::Scalar),
    }
}

fn json_scalar(path: &str, value: serde_json::Value) -> Result<Scalar, InimapError> {
    use serde_json::Value;

    match value {
        Value::String(s) => Ok(Scalar::Str(s)),
        Value::Bool(b) => Ok(Scalar::Bool(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Scalar::Int(i)),
            None => n
                .as_f64()
                .map(Scalar::Float)
                .ok_or_else(|| InimapError::InvalidDocument(format!("'{path}': number out of range"))),
        },
        other => Err(InimapError::InvalidDocument(format!(
            "'{path}': expected a scalar, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ordered_map_keeps_first_seen_order() {
        let mut map = OrderedMap::new();
        map.insert("b", 1);
        map.insert("a", 2);
        map.insert("b", 3);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&3));
    }

    #[test]
    fn section_rejects_nested_section() {
        let mut section = Section::new();
        let err = section.insert("inner", Section::new()).unwrap_err();
        assert!(matches!(err, InimapError::NestedSection { key } if key == "inner"));
        assert!(section.is_empty());
    }

    #[test]
    fn section_mut_replaces_plain_key() {
        let mut doc = Document::new();
        doc.insert("db", "flat");
        doc.section_mut("db").insert("host", "localhost").unwrap();
        let section = doc.section("db").unwrap();
        assert_eq!(section.get("host").and_then(ConfigValue::as_str), Some("localhost"));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn display_joins_lists() {
        let seq = ConfigValue::Seq(vec!["a".into(), Scalar::Int(2)]);
        assert_eq!(seq.to_string(), "a, 2");
        assert_eq!(ConfigValue::Null.to_string(), "");
        assert_eq!(ConfigValue::from(0.5).to_string(), "0.5");
    }

    #[test]
    fn json_object_becomes_document() {
        let doc = Document::try_from(json!({
            "app_name": "x",
            "index": 5,
            "tags": ["a", "b"],
            "db": { "host": "localhost", "port": 5432, "opts": { "ssl": true } }
        }))
        .unwrap();

        assert_eq!(doc.get("app_name").and_then(ConfigValue::as_str), Some("x"));
        assert_eq!(doc.get("index"), Some(&ConfigValue::Scalar(Scalar::Int(5))));
        assert_eq!(
            doc.get("tags"),
            Some(&ConfigValue::Seq(vec!["a".into(), "b".into()]))
        );
        let db = doc.section("db").unwrap();
        assert_eq!(db.get("port"), Some(&ConfigValue::Scalar(Scalar::Int(5432))));
        match db.get("opts") {
            Some(ConfigValue::Map(map)) => assert_eq!(map.get("ssl"), Some(&Scalar::Bool(true))),
            other => panic!("Expected Map, got {other:?}"),
        }
    }

    #[test]
    fn json_rejects_third_level() {
        let result = Document::try_from(json!({ "a": { "b": { "c": { "d": 1 } } } }));
        assert!(matches!(result, Err(InimapError::InvalidDocument(_))));
    }

    #[test]
    fn json_rejects_non_object_root() {
        let result = Document::try_from(json!([1, 2]));
        assert!(matches!(result, Err(InimapError::InvalidDocument(_))));
    }

    #[test]
    fn serializes_as_nested_json() {
        let mut doc = Document::new();
        doc.insert("name", "demo");
        doc.section_mut("db").insert("port", 5432i64).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({ "name": "demo", "db": { "port": 5432 } }));
    }
}
