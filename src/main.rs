//! layered-config CLI
//!
//! Inspects the configuration a process would see: resolves keys, dumps
//! subtrees, and follows a bound file as it changes.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use layered_config::observability::logging::init_logging;
use layered_config::settings::{load_settings, SourceMode};
use layered_config::{ConfigHandle, EngineSettings, HandleRegistry};

#[derive(Parser)]
#[command(name = "layered-config")]
#[command(about = "Resolve layered configuration values", long_about = None)]
struct Cli {
    /// Engine settings file (TOML).
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Bind to this file instead of searching the standard roots.
    #[arg(short, long)]
    external: Option<PathBuf>,

    /// Search for the property files instead of the JSON document.
    #[arg(short, long)]
    properties: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value at a key path
    Get {
        key: String,
        #[arg(short, long)]
        default: Option<String>,
    },
    /// Exit non-zero unless the key path resolves
    Contains { key: String },
    /// Print the document, or the subtree at a key path, as JSON
    Dump { key: Option<String> },
    /// Describe the sources behind the handle
    Describe,
    /// Print a key every time the bound file changes
    Watch { key: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => EngineSettings::default(),
    };
    if cli.properties {
        settings.sources.mode = SourceMode::Properties;
    }
    init_logging(settings.logging.format, &settings.logging.filter);

    let registry = HandleRegistry::from_settings(&settings);
    let handle = match &cli.external {
        Some(path) => registry.external(path)?,
        None => registry.classpath()?,
    };
    tracing::debug!(summary = %handle.describe(), "Handle ready");

    match cli.command {
        Commands::Get { key, default } => match handle.get_optional_string(&key)? {
            Some(value) => println!("{}", value),
            None => match default {
                Some(default) => println!("{}", default),
                None => {
                    eprintln!("{}: not found", key);
                    std::process::exit(1);
                }
            },
        },
        Commands::Contains { key } => {
            if !handle.contains_key(&key)? {
                std::process::exit(1);
            }
        }
        Commands::Dump { key } => {
            let value = match key {
                Some(key) => handle.node(&key)?.unwrap_or_default(),
                None => handle.document().root().clone(),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Describe => println!("{}", handle.describe()),
        Commands::Watch { key } => watch(&handle, &key)?,
    }

    Ok(())
}

fn watch(handle: &Arc<ConfigHandle>, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_watcher, updates) = handle.watch()?;
    println!("{} = {}", key, handle.get_string(key, "<absent>")?);

    for document in updates {
        tracing::info!(keys = document.len(), "Configuration changed");
        println!("{} = {}", key, handle.get_string(key, "<absent>")?);
    }
    Ok(())
}
