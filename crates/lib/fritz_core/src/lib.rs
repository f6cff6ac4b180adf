//! # fritz_core
//!
//! Core domain logic for Fritz: the schema-driven definition and form engine.
//!
//! - [`registry`]: fixed catalog of field types (input, integer, date, ...)
//! - [`settings`]: type-tagged component settings and their editors
//! - [`definition`]: entity definitions, layout mutations and the editing session
//! - [`form`]: default derivation, widget rendering and record validation
//! - [`adapter`]: the persistence boundary (trait + in-memory implementation)
//! - [`schema`]: SQL table DDL derived from definitions

pub mod adapter;
pub mod confirm;
pub mod definition;
pub mod entity;
pub mod form;
pub mod registry;
pub mod schema;
pub mod settings;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
