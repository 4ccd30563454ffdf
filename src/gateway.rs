//! Load and save entry points.
//!
//! The [`Gateway`] walks a type's field table in declaration order and moves
//! values between a [`Document`] and an instance. Several situations are
//! skipped quietly rather than reported, and each is logged at `trace` level:
//!
//! - document keys that no field maps to
//! - non-public fields without custom accessors
//! - nested objects deeper than two levels when saving
//!
//! Non-instantiable targets load as `Ok(None)`.

use std::path::Path;

use tracing::{debug, trace};

use crate::codec;
use crate::coerce::{self, Exported, NULL_TOKEN};
use crate::document::{ConfigValue, Document, OrderedMap};
use crate::error::InimapError;
use crate::file;
use crate::structure::{FieldDescriptor, IniObject, Slot};

/// Deepest structural level written on save. The root is level 1.
pub const MAX_DEPTH: usize = 2;

/// Maps documents to typed objects and back.
pub struct Gateway;

impl Gateway {
    /// Load a config file into a new `C`.
    ///
    /// The path must name an existing regular file.
    pub fn load_from_file<C: IniObject>(path: impl AsRef<Path>) -> Result<Option<C>, InimapError> {
        let path = path.as_ref();
        let text = file::read_regular_file(path)?;
        let doc = codec::parse(&text, &path.display().to_string())?;
        debug!(path = %path.display(), keys = doc.len(), "loaded config file");
        Self::load_from_document(&doc)
    }

    pub fn load_from_str<C: IniObject>(text: &str) -> Result<Option<C>, InimapError> {
        let doc = codec::parse(text, "string")?;
        Self::load_from_document(&doc)
    }

    /// Load from an already-built document.
    ///
    /// Document shape is never an error by itself; only values that cannot
    /// be coerced into their fields are.
    pub fn load_from_document<C: IniObject>(doc: &Document) -> Result<Option<C>, InimapError> {
        Self::map_document_to_object(doc.entries())
    }

    /// Write `config` over an existing regular file.
    pub fn save_to_file<C: IniObject>(path: impl AsRef<Path>, config: &C) -> Result<(), InimapError> {
        let path = path.as_ref();
        file::overwrite_regular_file(path, &Self::save_to_string(config))?;
        debug!(path = %path.display(), "saved config file");
        Ok(())
    }

    pub fn save_to_string<C: IniObject>(config: &C) -> String {
        codec::serialize(&Self::save_to_lines(config))
    }

    /// The saved text of `config`, parsed back into a document.
    pub fn save_to_document<C: IniObject>(config: &C) -> Result<Document, InimapError> {
        codec::parse(&Self::save_to_string(config), C::structure().name())
    }

    fn save_to_lines<C: IniObject>(config: &C) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(title) = C::structure().title() {
            lines.push(codec::header_comment(title));
        }
        lines.extend(Self::export_object_to_lines(config, 1));
        lines
    }

    /// Build a `C` from one level of document entries: the top level of a
    /// document, or the entries of a section.
    pub fn map_document_to_object<C: IniObject>(
        values: &OrderedMap<ConfigValue>,
    ) -> Result<Option<C>, InimapError> {
        let structure = C::structure();
        let Some(mut target) = C::instantiate() else {
            debug!(target_type = structure.name(), "type is not instantiable, skipping");
            return Ok(None);
        };

        for field in structure.fields() {
            if let Some(raw) = values.get(field.key()) {
                Self::import_value(&mut target, field, raw)?;
            }
        }

        for key in values.keys() {
            if structure.field_by_key(key).is_none() {
                trace!(key, target_type = structure.name(), "ignoring unmapped key");
            }
        }

        Ok(Some(target))
    }

    fn import_value<C: IniObject>(
        target: &mut C,
        field: &FieldDescriptor<C>,
        raw: &ConfigValue,
    ) -> Result<(), InimapError> {
        if let Some(setter) = field.custom_setter() {
            return setter(target, raw);
        }
        if !field.is_public() {
            trace!(key = field.key(), "skipping non-public field on load");
            return Ok(());
        }

        match field.slot() {
            Slot::Value(slot) => {
                let coercion = |source| InimapError::Coercion {
                    key: field.key().to_string(),
                    source,
                };
                let value = coerce::import(field.kind(), field.is_nullable(), raw).map_err(coercion)?;
                slot.write(target, value).map_err(coercion)
            }
            Slot::Nested(nested) => nested.load(target, field.key(), raw, field.is_nullable()),
            Slot::Detached => Ok(()),
        }
    }

    /// Lines for one object at `level`. Plain lines come first, then the
    /// section blocks of nested fields, so the text parses back to the same
    /// shape.
    pub(crate) fn export_object_to_lines<C: IniObject>(config: &C, level: usize) -> Vec<String> {
        if level > MAX_DEPTH {
            return Vec::new();
        }

        let mut lines = Vec::new();
        let mut sections = Vec::new();

        for field in C::structure().fields() {
            match Self::export_value(config, field, level, &mut sections) {
                Exported::Omit => {}
                Exported::Text(value) => {
                    if let Some(title) = field.title() {
                        lines.push(codec::comment(title));
                    }
                    lines.push(codec::entry(field.key(), &value));
                }
                Exported::Entries(entries) => {
                    if let Some(title) = field.title() {
                        lines.push(codec::comment(title));
                    }
                    for (subkey, value) in entries {
                        lines.push(codec::keyed_entry(field.key(), &subkey, &value));
                    }
                }
            }
        }

        lines.extend(sections);
        lines
    }

    /// Export one field. Nested fields write their section block into
    /// `sections` and report [`Exported::Omit`].
    fn export_value<C: IniObject>(
        config: &C,
        field: &FieldDescriptor<C>,
        level: usize,
        sections: &mut Vec<String>,
    ) -> Exported {
        if let Some(getter) = field.custom_getter() {
            return Exported::Text(getter(config));
        }
        if !field.is_public() {
            trace!(key = field.key(), "skipping non-public field on save");
            return Exported::Omit;
        }

        match field.slot() {
            Slot::Value(slot) => coerce::export(field.kind(), field.is_nullable(), slot.read(config)),
            Slot::Nested(nested) => {
                if field.is_nullable() && nested.is_null(config) {
                    return Exported::Text(NULL_TOKEN.to_string());
                }
                if level >= MAX_DEPTH {
                    trace!(key = field.key(), level, "nested object beyond depth limit, not saved");
                    return Exported::Omit;
                }
                if let Some(body) = nested.export(config, level + 1) {
                    let title = field.title().or_else(|| nested.type_title());
                    sections.push(title.map(codec::comment).unwrap_or_default());
                    sections.push(codec::section_header(field.key()));
                    sections.extend(body);
                }
                Exported::Omit
            }
            Slot::Detached => Exported::Omit,
        }
    }
}
