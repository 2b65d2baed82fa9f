//! distsign - sign and verify distributable files
//!
//! Operators use `keygen`, `sign-keys` and `sign` to produce keys and
//! detached signatures; clients use `download` to fetch a file and check it
//! against the signing keys the server publishes.

mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use clap::Parser;
use distsign_client::TrustStore;
use distsign_config::Config;
use serde_json::json;
use std::process;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(output) => output.render(json_mode),
        Err(e) => {
            error!(error = %e, "command failed");
            if json_mode {
                let value = json!({
                    "error": e.to_string(),
                    "code": e.code(),
                });
                println!("{value}");
            } else {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<commands::Output, CliError> {
    debug!("starting distsign v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Keygen { private, public } => commands::keygen(&private, &public).await,
        Commands::SignKeys {
            root_key,
            bundle,
            out,
        } => commands::sign_keys(&root_key, &bundle, out).await,
        Commands::Sign { key, file, out } => commands::sign(&key, &file, out).await,
        Commands::Download { url, src, dst } => {
            // File config, then environment, then flags
            let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
            config.merge_env()?;
            if let Some(url) = url {
                config.server.url = Some(url);
            }

            let roots = TrustStore::embedded()?;
            commands::download(&config, roots, &src, &dst).await
        }
    }
}

/// Logs go to stderr so stdout carries only command output
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    let filter = if debug_enabled {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,distsign=debug,distsign_client=debug")
        })
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if json_mode {
        builder.json().init();
    } else {
        builder.init();
    }
}
