// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{bail, Context, Result};
use clap::Parser;

use bxfer::{
    cli::{Cli, Commands, Location},
    config::Config,
    utils::init_logging,
    CommandStatus, ConnectionManager, FileHandler, LocalFileHandler, OperationReport,
    RemoteFileHandler,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_with_priority(&cli.config).await?;

    if let Commands::Connections = cli.command {
        list_connections(&config);
        return Ok(());
    }

    let manager = ConnectionManager::new();
    let outcome = run(&cli.command, &config, &manager).await;
    manager.remove_all_connections().await;

    if !outcome? {
        std::process::exit(1);
    }
    Ok(())
}

fn list_connections(config: &Config) {
    let names = config.connection_names();
    if names.is_empty() {
        println!("No connections configured");
        return;
    }
    for name in names {
        match config.connections[&name].host.as_deref() {
            Some(host) => println!("{name}\t{host}"),
            None => println!("{name}"),
        }
    }
}

/// The single connection every remote location in the command refers to.
fn connection_name(locations: &[&Location]) -> Result<Option<String>> {
    let mut names = locations.iter().filter_map(|l| l.connection.as_deref());
    let Some(first) = names.next() else {
        return Ok(None);
    };
    if let Some(other) = names.find(|n| *n != first) {
        bail!("Transfers between two connections ('{first}' and '{other}') are not supported");
    }
    Ok(Some(first.to_string()))
}

/// Returns whether the operation succeeded.
async fn run(command: &Commands, config: &Config, manager: &ConnectionManager) -> Result<bool> {
    let handler: Box<dyn FileHandler> = match connection_name(&command.locations())? {
        Some(name) => {
            let connection_config = config
                .connection_configuration(&name)
                .with_context(|| format!("Invalid configuration for connection '{name}'"))?;
            let handler = RemoteFileHandler::connect(manager, connection_config)
                .await
                .with_context(|| format!("Failed to open connection '{name}'"))?;
            Box::new(handler)
        }
        None => Box::new(LocalFileHandler::new()),
    };

    match command {
        Commands::Exists { path } => {
            let exists = handler.exists(&path.to_path_ref()).await?;
            println!("{}", if exists { "yes" } else { "no" });
            Ok(exists)
        }
        Commands::Mv {
            source,
            destination,
        } => {
            let report = handler
                .move_path(&source.to_path_ref(), &destination.to_path_ref())
                .await?;
            Ok(print_report("mv", &report))
        }
        Commands::Cp {
            source,
            destination,
        } => {
            let report = handler
                .copy_path(&source.to_path_ref(), &destination.to_path_ref())
                .await?;
            Ok(print_report("cp", &report))
        }
        Commands::Ls { directory } => {
            for path in handler.list_files(&directory.to_path_ref()).await? {
                println!("{path}");
            }
            Ok(true)
        }
        Commands::Lsdir { directory } => {
            for path in handler.list_directories(&directory.to_path_ref()).await? {
                println!("{path}");
            }
            Ok(true)
        }
        Commands::Rm { path } => {
            let report = handler.delete(&path.to_path_ref()).await?;
            Ok(print_report("rm", &report))
        }
        Commands::Connections => Ok(true),
    }
}

fn print_report(operation: &str, report: &OperationReport) -> bool {
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    match (&report.status, &report.cause) {
        (CommandStatus::Success, _) => {
            println!("{operation}: {}", report.status);
            true
        }
        (status, Some(cause)) => {
            eprintln!("{operation}: {status}: {cause}");
            false
        }
        (status, None) => {
            eprintln!("{operation}: {status}");
            false
        }
    }
}
