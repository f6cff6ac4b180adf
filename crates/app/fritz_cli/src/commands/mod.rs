//! Subcommand implementations.

pub mod local;
pub mod remote;

use std::path::Path;

use fritz_core::definition::Definition;

use crate::Result;

/// Read a definition JSON file.
pub(crate) fn read_definition(path: &Path) -> Result<Definition> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
