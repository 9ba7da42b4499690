//! `ownerdash` - CLI for the owner dashboard
//!
//! This binary runs the dashboard server and offers a few offline commands
//! for exporting and managing saved edits.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs::File;
use std::io::{self, BufWriter};

use clap::Parser;
use tracing::info;

use ownerdash::cli::{Cli, Command, ConfigCommand, EditsCommand, ExportCommand, ServeCommand};
use ownerdash::{export, init_logging, load_dataset, server, Config, Dashboard, EditField, EditStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, serve_cmd),
        Command::Export(export_cmd) => handle_export(&config, &export_cmd),
        Command::Edits(edits_cmd) => handle_edits(&config, &edits_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_serve(config: Config, cmd: ServeCommand) -> Result<(), Box<dyn std::error::Error>> {
    let config = config.with_listen_overrides(cmd.host, cmd.port);
    config.validate()?;

    // One thread is plenty for a single local user.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(config))?;
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_dataset(config.dataset_path())?;
    let edits = EditStore::from_config(&config.data).load()?;
    let dashboard = Dashboard::join(&records, &edits);

    match &cmd.output {
        Some(path) => {
            let written = export::write_csv(&dashboard, BufWriter::new(File::create(path)?))?;
            info!("Exported {written} rows to {}", path.display());
        }
        None => {
            let written = export::write_csv(&dashboard, io::stdout().lock())?;
            info!("Exported {written} rows");
        }
    }
    Ok(())
}

fn handle_edits(config: &Config, cmd: &EditsCommand) -> Result<(), Box<dyn std::error::Error>> {
    let store = EditStore::from_config(&config.data);

    match cmd {
        EditsCommand::Show { json } => {
            let edits = store.load()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&edits)?);
            } else {
                for field in EditField::ALL {
                    println!(
                        "[{}] {} ({} entries)",
                        field.label(),
                        store.file(field).path().display(),
                        edits.count(field)
                    );
                    for (address, value) in edits.map(field) {
                        let address = if address.is_empty() {
                            "(no address)"
                        } else {
                            address.as_str()
                        };
                        println!("  {address}: {value}");
                    }
                    println!();
                }
            }
        }
        EditsCommand::Clear { yes } => {
            if *yes {
                store.clear()?;
                println!("Cleared all Rv_Owner and Packer edits.");
            } else {
                println!("This will remove every Rv_Owner and Packer edit.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!();
                println!("[Data]");
                println!("  Dataset:            {}", config.data.dataset_path.display());
                println!("  Rv_Owner edits:     {}", config.data.rv_edits_path.display());
                println!(
                    "  Packer edits:       {}",
                    config.data.packer_edits_path.display()
                );
                println!();
                println!("[Dashboard]");
                println!("  Title:              {}", config.dashboard.title);
                println!("  Export file name:   {}", config.dashboard.export_file_name);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
