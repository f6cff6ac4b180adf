// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};

mod cli;
mod commands;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    match &args.command {
        Commands::Types => commands::local::types(),
        Commands::Check { definition } => commands::local::check(definition),
        Commands::Defaults { definition } => commands::local::defaults(definition),
        Commands::Validate { definition, record } => commands::local::validate(definition, record),
        Commands::Add {
            definition,
            type_id,
            title,
            write,
        } => commands::local::add(definition, type_id, title.as_deref(), *write),
        Commands::Ddl { definition } => commands::local::ddl(definition),
        Commands::Diff { old, new } => commands::local::diff(old, new),
        Commands::Remote(remote) => commands::remote::run(&args.client_config(), remote).await,
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
