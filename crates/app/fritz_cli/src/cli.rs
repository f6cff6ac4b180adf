use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use fritz_api_client::ClientConfig;

/// Work with Fritz entity definitions and records.
#[derive(Parser, Debug)]
#[command(name = "fritz", version, about)]
pub struct Cli {
    /// Fritz server root used by `remote` commands.
    #[arg(long, global = true, env = "FRITZ_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds for `remote` commands.
    #[arg(long, global = true, env = "FRITZ_API_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Environment configuration with the flags applied on top.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available field types by category.
    Types,

    /// Check a definition file for structural and settings errors.
    Check { definition: PathBuf },

    /// Print the default record of a definition as JSON.
    Defaults { definition: PathBuf },

    /// Validate a record file against a definition. Exits 1 when invalid.
    Validate { definition: PathBuf, record: PathBuf },

    /// Add a component of the given field type to a definition.
    Add {
        definition: PathBuf,

        #[arg(value_name = "TYPE")]
        type_id: String,

        /// Title of the new component. Defaults to the field type label.
        #[arg(long)]
        title: Option<String>,

        /// Write the result back to the definition file instead of stdout.
        #[arg(long, default_value_t = false)]
        write: bool,
    },

    /// Print the CREATE TABLE statement for a definition.
    Ddl { definition: PathBuf },

    /// Print the ALTER TABLE statements turning one definition version into another.
    Diff { old: PathBuf, new: PathBuf },

    /// Talk to a Fritz server.
    #[command(subcommand)]
    Remote(RemoteCommands),

    /// Print version information.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// List the field types served by the server.
    Types,

    /// List stored definitions.
    List,

    /// Print one definition as JSON.
    Get { id: String },

    /// Delete a definition and all its entities.
    Delete {
        id: String,

        /// Do not ask for confirmation.
        #[arg(long, short, default_value_t = false)]
        yes: bool,
    },

    /// Create or update definitions from JSON files. Directories are scanned for `*.json`.
    Load {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
}
