//! Map flat INI configuration files onto typed Rust structs and back.
//!
//! Declare which fields of a struct are configuration, point at a file, and
//! get a populated instance. Save the instance and get a commented INI file
//! that loads back into an equal value.
//!
//! ```ignore
//! let config: Option<AppConfig> = Gateway::load_from_file("app.ini")?;
//! if let Some(config) = config {
//!     Gateway::save_to_file("app.ini", &config)?;
//! }
//! ```
//!
//! # Design: the field table is the schema
//!
//! There is no runtime reflection in Rust, so each config type implements
//! [`IniObject`] and returns a [`StructuralType`]: an ordered table of
//! [`FieldDescriptor`]s built once per type. Everything derives from that
//! table:
//!
//! - **Document keys** come from field names through the [`naming`] rules:
//!   `trustedIps` is stored as `trusted_ips`.
//! - **Value kinds** come from the Rust field type through [`FieldType`].
//!   `Option<T>` fields are nullable and use the literal `null` token.
//! - **Comments** come from the first line of the attached doc text, through
//!   the [`title`] rules. Type docs head the file; field docs head each entry
//!   or section.
//! - **Nesting**: a field holding another [`IniObject`] becomes a section.
//!   Only two structural levels are written; deeper objects are left out of
//!   the file.
//!
//! # INI dialect
//!
//! ```text
//! ; comment
//! app_name = demo
//! trusted_ips = 127.0.0.1, 192.168.0.1
//! point[x] = 1.5
//! hosts[] = a
//!
//! [database]
//! host = localhost
//! ```
//!
//! Keys the table does not know are ignored on load. Values that cannot be
//! converted to their field type (`port = lots`) fail the load with
//! [`InimapError::Coercion`]; they never silently become zero.
//!
//! # Discovery and the `config` subcommands
//!
//! [`IniConfig::builder()`] finds the config file across a list of
//! [`SearchPath`]s (the last existing one wins) and implements the
//! `config list|gen|get|set` operations through [`ConfigAction`]. The core
//! has no dependency on any CLI framework.
//!
//! For [clap](https://docs.rs/clap) users, the `cli` module (behind the
//! `clap` Cargo feature, on by default) provides [`ConfigArgs`] to embed in
//! a `#[derive(Subcommand)]` enum. To use inimap without clap:
//!
//! ```toml
//! inimap = { version = "...", default-features = false }
//! ```
//!
//! # Logging
//!
//! File loads and saves are reported through [`tracing`] at `debug` level.
//! Entries skipped on purpose (unknown keys, private fields, objects nested
//! too deep) are reported at `trace` level. The library never installs a
//! subscriber.
//!
//! # Error handling
//!
//! All fallible operations return [`InimapError`]. Coercion failures carry
//! the document key and a [`CoerceError`] describing the bad value. See the
//! [`error`] module for the full set.

pub mod codec;
pub mod coerce;
pub mod document;
pub mod error;
pub mod gateway;
pub mod naming;
pub mod structure;
pub mod title;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod file;
mod ops;

#[cfg(test)]
mod fixtures;

pub use builder::{IniConfig, IniConfigBuilder};
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
pub use coerce::CoerceError;
pub use document::{ConfigValue, Document, OrderedMap, Scalar, Section};
pub use error::InimapError;
pub use gateway::Gateway;
pub use ops::ConfigResult;
pub use structure::{
    Array, FieldDescriptor, FieldType, FieldValue, IniObject, ScalarKind, StructuralType, ValueKind, Visibility,
};
pub use types::{ConfigAction, SearchPath};
