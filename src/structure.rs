//! Field-descriptor tables: how a Rust struct is seen by the gateway.
//!
//! There is no runtime reflection. Each mappable type implements [`IniObject`]
//! and hands out a [`StructuralType`] built once from a table of
//! [`FieldDescriptor`]s. A descriptor binds a declared name to a pair of
//! non-capturing accessor closures, so no per-field mapping code is written:
//!
//! ```ignore
//! impl IniObject for ServerConfig {
//!     fn structure() -> &'static StructuralType<Self> {
//!         static STRUCTURE: OnceLock<StructuralType<ServerConfig>> = OnceLock::new();
//!         STRUCTURE.get_or_init(|| {
//!             type Field = FieldDescriptor<ServerConfig>;
//!             StructuralType::new("ServerConfig")
//!                 .doc("Server settings")
//!                 .field(Field::value("bindHost", |c| &c.bind_host, |c| &mut c.bind_host)
//!                     .doc("Address to bind"))
//!                 .field(Field::nested("tls", |c| &c.tls, |c| &mut c.tls))
//!         })
//!     }
//!
//!     fn instantiate() -> Option<Self> {
//!         Some(Self::default())
//!     }
//! }
//! ```
//!
//! The value kind and nullability of a plain field come from its Rust type
//! through [`FieldType`]; `Option<T>` is the nullable form of `T`.

use std::marker::PhantomData;

use crate::coerce::{self, CoerceError};
use crate::document::{ConfigValue, OrderedMap, Section};
use crate::error::InimapError;
use crate::gateway::Gateway;
use crate::naming;
use crate::title;

/// A type the gateway can load into and save from.
pub trait IniObject: Sized + 'static {
    /// The descriptor table for this type. Built once per type, never per
    /// instance.
    fn structure() -> &'static StructuralType<Self>;

    /// A default instance, or `None` for types that cannot be created from
    /// nothing. Loading into such a type yields `Ok(None)`.
    fn instantiate() -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Scalar(ScalarKind),
    Array,
    /// A nested object, rendered as a section. Carries the Rust type name.
    Nested(&'static str),
    Untyped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Ordered list, or keyed list, of text values.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Seq(Vec<String>),
    Map(OrderedMap<String>),
}

impl Default for Array {
    fn default() -> Self {
        Array::Seq(Vec::new())
    }
}

impl Array {
    /// Build a keyed list from `(key, value)` pairs, keeping their order.
    pub fn keyed<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Array::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Array::Seq(items) => items.len(),
            Array::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Array::Seq(items) => items.iter().map(String::as_str).collect(),
            Array::Map(map) => map.values().map(String::as_str).collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Array {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Array::Seq(iter.into_iter().map(Into::into).collect())
    }
}

/// A field's value as the coercer sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Str(String),
    Int(i128),
    Float(f64),
    Bool(bool),
    Array(Array),
    /// Untyped fields hold whatever the document held.
    Raw(ConfigValue),
}

impl FieldValue {
    fn shape(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Str(_) => "a string",
            FieldValue::Int(_) => "an integer",
            FieldValue::Float(_) => "a float",
            FieldValue::Bool(_) => "a boolean",
            FieldValue::Array(_) => "an array",
            FieldValue::Raw(_) => "an untyped value",
        }
    }
}

/// Rust types that can back a plain (non-nested) field.
pub trait FieldType: Sized {
    const KIND: ValueKind;
    const NULLABLE: bool = false;

    fn to_field_value(&self) -> FieldValue;

    fn from_field_value(value: FieldValue) -> Result<Self, CoerceError>;
}

fn mismatch(expected: &'static str, value: &FieldValue) -> CoerceError {
    CoerceError::Shape {
        expected,
        found: value.shape(),
    }
}

impl FieldType for String {
    const KIND: ValueKind = ValueKind::Scalar(ScalarKind::String);

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Str(self.clone())
    }

    fn from_field_value(value: FieldValue) -> Result<Self, CoerceError> {
        match value {
            FieldValue::Str(s) => Ok(s),
            other => Err(mismatch("a string", &other)),
        }
    }
}

macro_rules! int_field_type {
    ($($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                const KIND: ValueKind = ValueKind::Scalar(ScalarKind::Int);

                fn to_field_value(&self) -> FieldValue {
                    FieldValue::Int(*self as i128)
                }

                fn from_field_value(value: FieldValue) -> Result<Self, CoerceError> {
                    match value {
                        FieldValue::Int(i) => <$ty>::try_from(i).map_err(|_| CoerceError::OutOfRange {
                            value: i.to_string(),
                            target: stringify!($ty),
                        }),
                        other => Err(mismatch("an integer", &other)),
                    }
                }
            }
        )*
    };
}

int_field_type!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FieldType for f64 {
    const KIND: ValueKind = ValueKind::Scalar(ScalarKind::Float);

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }

    fn from_field_value(value: FieldValue) -> Result<Self, CoerceError> {
        match value {
            FieldValue::Float(x) => Ok(x),
            other => Err(mismatch("a float", &other)),
        }
    }
}

impl FieldType for f32 {
    const KIND: ValueKind = ValueKind::Scalar(ScalarKind::Float);

    /// Widened through the shortest `f32` text, so `0.1f32` exports as `0.1`.
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(self.to_string().parse().unwrap_or(f64::from(*self)))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_field_value(value: FieldValue) -> Result<Self, CoerceError> {
        match value {
            FieldValue::Float(x) => Ok(x as f32),
            other => Err(mismatch("a float", &other)),
        }
    }
}

impl FieldType for bool {
    const KIND: ValueKind = ValueKind::Scalar(ScalarKind::Bool);

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }

    fn from_field_value(value: FieldValue) -> Result<Self, CoerceError> {
        match value {
            FieldValue::Bool(b) => Ok(b),
            other => Err(mismatch("a boolean", &other)),
        }
    }
}

impl FieldType for Array {
    const KIND: ValueKind = ValueKind::Array;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Array(self.clone())
    }

    fn from_field_value(value: FieldValue) -> Result<Self, CoerceError> {
        match value {
            FieldValue::Array(array) => Ok(array),
            other => Err(mismatch("an array", &other)),
        }
    }
}

/// Keyed input keeps only its values.
impl FieldType for Vec<String> {
    const KIND: ValueKind = ValueKind::Array;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Array(Array::Seq(self.clone()))
    }

    fn from_field_value(value: FieldValue) -> Result<Self, CoerceError> {
        match value {
            FieldValue::Array(Array::Seq(items)) => Ok(items),
            FieldValue::Array(Array::Map(map)) => Ok(map.values().cloned().collect()),
            other => Err(mismatch("an array", &other)),
        }
    }
}

impl FieldType for ConfigValue {
    const KIND: ValueKind = ValueKind::Untyped;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Raw(self.clone())
    }

    fn from_field_value(value: FieldValue) -> Result<Self, CoerceError> {
        match value {
            FieldValue::Raw(raw) => Ok(raw),
            other => Err(mismatch("an untyped value", &other)),
        }
    }
}

impl<X: FieldType> FieldType for Option<X> {
    const KIND: ValueKind = X::KIND;
    const NULLABLE: bool = true;

    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(value) => value.to_field_value(),
            None => FieldValue::Null,
        }
    }

    fn from_field_value(value: FieldValue) -> Result<Self, CoerceError> {
        match value {
            FieldValue::Null => Ok(None),
            other => X::from_field_value(other).map(Some),
        }
    }
}

/// Custom import hook: receives the raw document value, bypassing coercion.
pub type Setter<T> = fn(&mut T, &ConfigValue) -> Result<(), InimapError>;

/// Custom export hook: the returned text is written verbatim.
pub type Getter<T> = fn(&T) -> String;

pub(crate) trait ValueSlot<T>: Send + Sync {
    fn read(&self, target: &T) -> FieldValue;
    fn write(&self, target: &mut T, value: FieldValue) -> Result<(), CoerceError>;
}

struct Accessor<T, F> {
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
}

impl<T, F: FieldType> ValueSlot<T> for Accessor<T, F> {
    fn read(&self, target: &T) -> FieldValue {
        (self.get)(target).to_field_value()
    }

    fn write(&self, target: &mut T, value: FieldValue) -> Result<(), CoerceError> {
        *(self.get_mut)(target) = F::from_field_value(value)?;
        Ok(())
    }
}

pub(crate) trait NestedSlot<T>: Send + Sync {
    /// Title of the nested type itself.
    fn type_title(&self) -> Option<&'static str>;

    /// `true` when the slot currently holds no object.
    fn is_null(&self, target: &T) -> bool;

    fn load(
        &self,
        target: &mut T,
        key: &str,
        raw: &ConfigValue,
        nullable: bool,
    ) -> Result<(), InimapError>;

    /// Lines of the nested object at `level`, or `None` if it holds no object.
    fn export(&self, target: &T, level: usize) -> Option<Vec<String>>;

    /// Title lookup for a key inside the nested type. Outer `None` means the
    /// key does not exist.
    fn describe(&self, key: &str) -> Option<Option<String>>;

    /// Whether a key inside the nested type accepts a loaded value.
    fn is_settable(&self, key: &str) -> bool;
}

enum NestedAccessor<T, U> {
    Required {
        get: fn(&T) -> &U,
        get_mut: fn(&mut T) -> &mut U,
    },
    Optional {
        get: fn(&T) -> &Option<U>,
        get_mut: fn(&mut T) -> &mut Option<U>,
    },
}

impl<T, U: IniObject> NestedAccessor<T, U> {
    fn current<'a>(&self, target: &'a T) -> Option<&'a U> {
        match self {
            NestedAccessor::Required { get, .. } => Some(get(target)),
            NestedAccessor::Optional { get, .. } => get(target).as_ref(),
        }
    }

    fn assign(&self, target: &mut T, value: Option<U>) {
        match self {
            NestedAccessor::Required { get_mut, .. } => {
                if let Some(value) = value {
                    *get_mut(target) = value;
                }
            }
            NestedAccessor::Optional { get_mut, .. } => *get_mut(target) = value,
        }
    }
}

impl<T, U: IniObject> NestedSlot<T> for NestedAccessor<T, U> {
    fn type_title(&self) -> Option<&'static str> {
        U::structure().title()
    }

    fn is_null(&self, target: &T) -> bool {
        self.current(target).is_none()
    }

    fn load(
        &self,
        target: &mut T,
        key: &str,
        raw: &ConfigValue,
        nullable: bool,
    ) -> Result<(), InimapError> {
        if nullable && coerce::is_null(raw) {
            self.assign(target, None);
            return Ok(());
        }

        let loaded = match raw {
            ConfigValue::Section(section) => Gateway::map_document_to_object::<U>(section.entries())?,
            ConfigValue::Map(map) => {
                let section = Section::from(map.clone());
                Gateway::map_document_to_object::<U>(section.entries())?
            }
            other => {
                return Err(InimapError::Coercion {
                    key: key.to_string(),
                    source: CoerceError::Shape {
                        expected: "a section",
                        found: coerce::shape_name(other),
                    },
                });
            }
        };

        // A non-instantiable nested type leaves a non-nullable field as it was.
        if loaded.is_some() || nullable {
            self.assign(target, loaded);
        }
        Ok(())
    }

    fn export(&self, target: &T, level: usize) -> Option<Vec<String>> {
        self.current(target)
            .map(|object| Gateway::export_object_to_lines(object, level))
    }

    fn describe(&self, key: &str) -> Option<Option<String>> {
        U::structure().describe(key)
    }

    fn is_settable(&self, key: &str) -> bool {
        U::structure().is_settable(key)
    }
}

pub(crate) enum Slot<T> {
    Value(Box<dyn ValueSlot<T>>),
    Nested(Box<dyn NestedSlot<T>>),
    /// Reachable only through custom accessors.
    Detached,
}

/// Metadata for one field of a [`StructuralType`].
pub struct FieldDescriptor<T> {
    name: &'static str,
    key: String,
    kind: ValueKind,
    nullable: bool,
    visibility: Visibility,
    title: Option<String>,
    slot: Slot<T>,
    setter: Option<Setter<T>>,
    getter: Option<Getter<T>>,
}

impl<T: 'static> FieldDescriptor<T> {
    fn with_slot(name: &'static str, kind: ValueKind, nullable: bool, slot: Slot<T>) -> Self {
        Self {
            name,
            key: naming::to_document_key(name),
            kind,
            nullable,
            visibility: Visibility::Public,
            title: None,
            slot,
            setter: None,
            getter: None,
        }
    }

    /// A plain field. Kind and nullability follow `F`.
    pub fn value<F: FieldType + 'static>(
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        Self::with_slot(
            name,
            F::KIND,
            F::NULLABLE,
            Slot::Value(Box::new(Accessor { get, get_mut })),
        )
    }

    /// A nested object that is always present.
    pub fn nested<U: IniObject>(
        name: &'static str,
        get: fn(&T) -> &U,
        get_mut: fn(&mut T) -> &mut U,
    ) -> Self {
        Self::with_slot(
            name,
            ValueKind::Nested(std::any::type_name::<U>()),
            false,
            Slot::Nested(Box::new(NestedAccessor::Required { get, get_mut })),
        )
    }

    /// A nested object that may be null. Null is saved as the NULL token.
    pub fn nullable_nested<U: IniObject>(
        name: &'static str,
        get: fn(&T) -> &Option<U>,
        get_mut: fn(&mut T) -> &mut Option<U>,
    ) -> Self {
        Self::with_slot(
            name,
            ValueKind::Nested(std::any::type_name::<U>()),
            true,
            Slot::Nested(Box::new(NestedAccessor::Optional { get, get_mut })),
        )
    }

    /// A non-nullable nested object that may not be initialised yet. An
    /// uninitialised slot is skipped on save and never set to null on load.
    pub fn lazy_nested<U: IniObject>(
        name: &'static str,
        get: fn(&T) -> &Option<U>,
        get_mut: fn(&mut T) -> &mut Option<U>,
    ) -> Self {
        Self::with_slot(
            name,
            ValueKind::Nested(std::any::type_name::<U>()),
            false,
            Slot::Nested(Box::new(NestedAccessor::Optional { get, get_mut })),
        )
    }

    /// A non-public field with no direct accessor; attach a
    /// [`setter`](Self::setter) and/or [`getter`](Self::getter).
    pub fn custom(name: &'static str) -> Self {
        let mut field = Self::with_slot(name, ValueKind::Untyped, false, Slot::Detached);
        field.visibility = Visibility::Private;
        field
    }

    /// Attach documentation. Its first line becomes the saved comment.
    pub fn doc(mut self, doc: &str) -> Self {
        self.title = title::fetch_title(doc);
        self
    }

    /// Hide the field: it is neither imported nor exported unless a custom
    /// accessor is attached.
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn setter(mut self, setter: Setter<T>) -> Self {
        self.setter = Some(setter);
        self
    }

    pub fn getter(mut self, getter: Getter<T>) -> Self {
        self.getter = Some(getter);
        self
    }
}

impl<T> FieldDescriptor<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The key used in documents (`appName` → `app_name`).
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub(crate) fn slot(&self) -> &Slot<T> {
        &self.slot
    }

    pub(crate) fn custom_setter(&self) -> Option<Setter<T>> {
        self.setter
    }

    pub(crate) fn custom_getter(&self) -> Option<Getter<T>> {
        self.getter
    }
}

/// The ordered field table of one type.
pub struct StructuralType<T> {
    name: &'static str,
    title: Option<String>,
    fields: Vec<FieldDescriptor<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StructuralType<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            title: None,
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Attach documentation. Its first line becomes the file header comment,
    /// or the section comment when the type is nested.
    pub fn doc(mut self, doc: &str) -> Self {
        self.title = title::fetch_title(doc);
        self
    }

    pub fn field(mut self, field: FieldDescriptor<T>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    pub fn field_by_key(&self, key: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Resolve a dotted document key (`port`, `database.host`, `point[x]`) to
    /// its field title. Outer `None` means no reachable field answers to the
    /// key; non-public fields count only when they have custom accessors.
    pub fn describe(&self, dotted_key: &str) -> Option<Option<String>> {
        let (head, rest) = split_dotted(dotted_key);
        let field = self
            .field_by_key(head)
            .filter(|f| f.is_public() || f.setter.is_some() || f.getter.is_some())?;

        match (rest, &field.slot) {
            (None, _) => Some(field.title.clone()),
            (Some(rest), Slot::Nested(nested)) => nested.describe(rest),
            (Some(_), _) => None,
        }
    }

    /// Whether a dotted document key names a field that a load writes to:
    /// public, or private with a custom setter.
    pub fn is_settable(&self, dotted_key: &str) -> bool {
        let (head, rest) = split_dotted(dotted_key);
        let Some(field) = self
            .field_by_key(head)
            .filter(|f| f.is_public() || f.setter.is_some())
        else {
            return false;
        };

        match (rest, &field.slot) {
            (None, _) => true,
            (Some(rest), Slot::Nested(nested)) => nested.is_settable(rest),
            (Some(_), _) => false,
        }
    }
}

/// `section.key[sub]` into the field key of the first segment and the rest.
fn split_dotted(dotted_key: &str) -> (&str, Option<&str>) {
    let (head, rest) = match dotted_key.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (dotted_key, None),
    };
    (head.split_once('[').map_or(head, |(name, _)| name), rest)
}
