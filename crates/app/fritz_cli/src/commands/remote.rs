//! Commands talking to a Fritz server through [`HttpAdapter`].

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use fritz_api_client::{ClientConfig, HttpAdapter};
use fritz_core::adapter::{AdapterError, PersistenceAdapter};
use fritz_core::confirm::{AlwaysConfirm, Confirm, ConfirmRequest};
use fritz_core::definition::{Definition, DefinitionSession};

use super::read_definition;
use crate::cli::RemoteCommands;
use crate::{Error, Result};

/// Asks on stderr, reads the answer from stdin. Anything but y/yes declines.
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        let mut stderr = std::io::stderr();
        if write!(stderr, "{request} [y/N] ").and_then(|_| stderr.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

pub async fn run(config: &ClientConfig, command: &RemoteCommands) -> Result<()> {
    let adapter = HttpAdapter::new(config)?;
    log::debug!("using Fritz server at {}", adapter.base_url());

    match command {
        RemoteCommands::Types => {
            for d in adapter.list_field_types().await? {
                println!("{:<10} {:<10} {}", d.id, d.category.as_str(), d.label);
            }
        }
        RemoteCommands::List => {
            for definition in adapter.list_definitions().await? {
                println!(
                    "{:<24} {} ({} components)",
                    definition.id(),
                    definition.name,
                    definition.layout.len()
                );
            }
        }
        RemoteCommands::Get { id } => {
            let definition = adapter.get_definition(id).await?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        RemoteCommands::Delete { id, yes } => {
            let definition = adapter.get_definition(id).await?;
            let mut session = DefinitionSession::new();
            session.select_definition(definition, &mut AlwaysConfirm);

            let deleted = if *yes {
                session.delete(&adapter, &mut AlwaysConfirm).await?
            } else {
                session.delete(&adapter, &mut PromptConfirm).await?
            };
            if !deleted {
                log::info!("kept definition {id}");
            }
        }
        RemoteCommands::Load { paths } => load(&adapter, paths).await?,
    }
    Ok(())
}

/// `paths` with directories replaced by their `*.json` files in name order.
fn definition_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?.path();
            if entry.is_file() && entry.extension().is_some_and(|ext| ext == "json") {
                entries.push(entry);
            }
        }
        entries.sort();
        files.extend(entries);
    }
    Ok(files)
}

fn checked_definition(path: &Path, loaded: &[Definition]) -> Result<Definition> {
    let definition = read_definition(path)?;
    definition
        .check()
        .and_then(|_| definition.check_unique(loaded))
        .map_err(|e| Error::Custom(format!("{}: {e}", path.display())))?;
    Ok(definition)
}

/// Check every file first, then create or update each definition on the server.
async fn load(adapter: &HttpAdapter, paths: &[PathBuf]) -> Result<()> {
    let mut definitions = Vec::new();
    for file in definition_files(paths)? {
        let definition = checked_definition(&file, &definitions)?;
        log::debug!("{} holds definition {}", file.display(), definition.id());
        definitions.push(definition);
    }
    if definitions.is_empty() {
        return Err(Error::Custom("No definition files found".into()));
    }

    for definition in &definitions {
        let id = definition.id();
        match adapter.get_definition(id).await {
            Ok(_) => {
                adapter.update_definition(id, definition).await?;
                println!("updated {id}");
            }
            Err(AdapterError::NotFound(_)) => {
                adapter.create_definition(definition).await?;
                println!("created {id}");
            }
            Err(e) => return Err(e.into()),
        }
    }
    log::info!("loaded {} definition(s)", definitions.len());
    Ok(())
}
