//! Commands working on definition and record files.

use std::path::Path;

use fritz_core::definition::FieldChange;
use fritz_core::entity::RecordData;
use fritz_core::form::{derive_defaults, validate_record};
use fritz_core::registry::FieldTypeRegistry;
use fritz_core::schema::{alter_table_statements, compare, create_table_sql, table_name};

use super::read_definition;
use crate::{Error, Result};

pub fn types() -> Result<()> {
    for (category, descriptors) in FieldTypeRegistry::builtin().grouped() {
        println!("{}", category.label());
        for d in descriptors {
            println!(
                "  {:<10} {:<14} {} [{}]",
                d.id, d.label, d.tooltip, d.default_db_type
            );
        }
    }
    Ok(())
}

pub fn check(path: &Path) -> Result<()> {
    let definition = read_definition(path)?;
    definition.check()?;
    println!(
        "{}: ok ({} components)",
        definition.id(),
        definition.layout.len()
    );
    Ok(())
}

pub fn defaults(path: &Path) -> Result<()> {
    let definition = read_definition(path)?;
    let record = derive_defaults(&definition.layout);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub fn validate(definition: &Path, record: &Path) -> Result<()> {
    let definition = read_definition(definition)?;
    let text = std::fs::read_to_string(record)?;
    let data: RecordData = serde_json::from_str(&text)?;

    let errors = validate_record(&definition.layout, &data);
    if errors.is_empty() {
        println!("valid");
        return Ok(());
    }
    for (name, message) in &errors {
        println!("{name}: {message}");
    }
    Err(Error::InvalidRecord(errors.len()))
}

pub fn add(path: &Path, type_id: &str, title: Option<&str>, write: bool) -> Result<()> {
    let mut definition = read_definition(path)?;
    let name = definition.add_component(type_id)?.name().to_string();
    if let Some(title) = title {
        definition
            .layout
            .update_field(&name, FieldChange::Title(title.to_string()));
    }

    let json = serde_json::to_string_pretty(&definition)?;
    if write {
        std::fs::write(path, format!("{json}\n"))?;
        log::info!("added component {name} to {}", path.display());
    } else {
        println!("{json}");
    }
    Ok(())
}

pub fn ddl(path: &Path) -> Result<()> {
    let definition = read_definition(path)?;
    println!("{};", create_table_sql(&definition)?);
    Ok(())
}

pub fn diff(old: &Path, new: &Path) -> Result<()> {
    let old = read_definition(old)?;
    let new = read_definition(new)?;
    if old.id() != new.id() {
        return Err(Error::Custom(format!(
            "Cannot diff different definitions: {} and {}",
            old.id(),
            new.id()
        )));
    }
    new.check()?;

    let changeset = compare(&old.layout, &new.layout);
    let statements = alter_table_statements(&changeset, &table_name(&new))?;
    if statements.is_empty() {
        log::info!("no column changes");
    }
    for statement in statements {
        println!("{statement};");
    }
    Ok(())
}
