//! Column changes between two versions of a definition.

use super::{SchemaError, column_definition, column_name, column_type, default_literal};
use crate::definition::{FieldComponent, Layout};

/// Components of the new layout sorted by what happened to their column.
///
/// Matching is by component name. `added`, `modified` and `unchanged` follow
/// the new layout's order, `removed` the existing one's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    pub added: Vec<FieldComponent>,
    pub removed: Vec<FieldComponent>,
    pub modified: Vec<FieldComponent>,
    pub unchanged: Vec<FieldComponent>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

pub fn compare(existing: &Layout, new: &Layout) -> Changeset {
    let mut changeset = Changeset::default();
    for component in new.components() {
        match existing.get(component.name()) {
            None => changeset.added.push(component.clone()),
            Some(old) if old == component => changeset.unchanged.push(component.clone()),
            Some(_) => changeset.modified.push(component.clone()),
        }
    }
    changeset.removed = existing
        .components()
        .iter()
        .filter(|c| new.get(c.name()).is_none())
        .cloned()
        .collect();
    changeset
}

/// One `ALTER TABLE IF EXISTS` per non-empty group: additions, removals, modifications.
///
/// A modified column is retyped with a cast, then its default and nullability
/// are set from the new component.
pub fn alter_table_statements(
    changeset: &Changeset,
    table: &str,
) -> Result<Vec<String>, SchemaError> {
    let added = changeset
        .added
        .iter()
        .map(|c| Ok(format!("ADD COLUMN {}", column_definition(c)?)))
        .collect::<Result<Vec<_>, SchemaError>>()?;

    let removed = changeset
        .removed
        .iter()
        .map(|c| Ok(format!("DROP COLUMN {}", column_name(c)?)))
        .collect::<Result<Vec<_>, SchemaError>>()?;

    let mut modified = Vec::new();
    for component in &changeset.modified {
        let name = column_name(component)?;
        let db_type = column_type(component)?;
        modified.push(format!("ALTER COLUMN {name} TYPE {db_type} USING {name}::{db_type}"));
        modified.push(match default_literal(component.settings()) {
            Some(default) => format!("ALTER COLUMN {name} SET DEFAULT {default}"),
            None => format!("ALTER COLUMN {name} DROP DEFAULT"),
        });
        modified.push(if component.is_mandatory() {
            format!("ALTER COLUMN {name} SET NOT NULL")
        } else {
            format!("ALTER COLUMN {name} DROP NOT NULL")
        });
    }

    Ok([added, removed, modified]
        .into_iter()
        .filter(|actions| !actions.is_empty())
        .map(|actions| format!("ALTER TABLE IF EXISTS {table} {}", actions.join(", ")))
        .collect())
}
