//! Homes CLI
//!
//! Command-line interface for Homes - real-estate listing records.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use homes_core::{Config, ListingStore, StoreError};

mod commands;
mod output;
mod prompt;

use commands::listing::{parse_type_arg, FieldArgs, ListOptions};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "homes")]
#[command(about = "Homes - Keep track of real-estate listings")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List listings
    #[command(alias = "ls")]
    List {
        /// Only listings in this county
        #[arg(long)]
        county: Option<String>,
        /// Only listings of this type (unknown, single, multi)
        #[arg(short = 't', long = "type", value_parser = parse_type_arg)]
        home_type: Option<i64>,
        /// Only listings with at least this income
        #[arg(long, allow_negative_numbers = true)]
        min_income: Option<i64>,
        /// Sort by column (id, address, county, type, income)
        #[arg(short, long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Show a listing
    Show {
        /// Listing ID or key (listings/<id>)
        id: String,
    },
    /// Add a listing
    #[command(alias = "create")]
    Add {
        #[command(flatten)]
        fields: Fields,
    },
    /// Edit a listing (prompts for each field when no flags are given)
    Edit {
        /// Listing ID or key (listings/<id>)
        id: String,
        #[command(flatten)]
        fields: Fields,
        /// Set the county to empty
        #[arg(long, conflicts_with = "county")]
        clear_county: bool,
    },
    /// Delete a listing
    #[command(alias = "rm")]
    Delete {
        /// Listing ID or key (listings/<id>)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete all listings
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Insert a sample listing
    Dummy,
    /// Show the media type for a key
    Type {
        /// Key such as `listings` or `listings/3`
        key: String,
    },
    /// Show database status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Args)]
struct Fields {
    /// Street address
    #[arg(short, long)]
    address: Option<String>,
    /// County
    #[arg(short, long)]
    county: Option<String>,
    /// Home type (unknown, single, multi or 0-2)
    #[arg(short = 't', long = "type", value_parser = parse_type_arg)]
    home_type: Option<i64>,
    /// Monthly income
    #[arg(short, long, allow_negative_numbers = true)]
    income: Option<i64>,
}

impl Fields {
    fn into_args(self, clear_county: bool) -> FieldArgs {
        FieldArgs {
            address: self.address,
            county: self.county,
            clear_county,
            home_type: self.home_type,
            income: self.income,
        }
    }
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, authority, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    if let Err(e) = run(cli, &output) {
        report_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config;

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => {
                commands::config::show(config_path.as_ref(), output)
            }
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key.clone(), value.clone(), config_path.as_ref(), output)
            }
        };
    }

    let config = Config::load_with_cli_override(config_path.as_ref())?;
    init_logging(&config);

    let mut store = ListingStore::open_with_config(&config)?;
    info!(database = ?config.database_path(), "Opened listing store");

    match cli.command {
        Commands::List {
            county,
            home_type,
            min_income,
            sort,
            desc,
        } => commands::listing::list(
            &store,
            ListOptions {
                county,
                home_type,
                min_income,
                sort,
                desc,
            },
            output,
        ),
        Commands::Show { id } => commands::listing::show(&store, id, output),
        Commands::Add { fields } => {
            commands::listing::add(&mut store, fields.into_args(false), output)
        }
        Commands::Edit {
            id,
            fields,
            clear_county,
        } => commands::listing::edit(&mut store, id, fields.into_args(clear_county), output),
        Commands::Delete { id, yes } => commands::listing::delete(&mut store, id, yes, output),
        Commands::Clear { yes } => commands::listing::clear(&mut store, yes, output),
        Commands::Dummy => commands::listing::dummy(&mut store, output),
        Commands::Type { key } => commands::listing::media_type(&store, key, output),
        Commands::Status => commands::status::show(&store, &config, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Print an error with its cause chain and, for storage faults, a hint
fn report_error(error: &anyhow::Error) {
    eprintln!("Error: {:#}", error);

    let hint = error.chain().find_map(|cause| {
        match cause.downcast_ref::<StoreError>() {
            Some(StoreError::Storage(storage)) => storage.recovery_suggestion(),
            _ => cause
                .downcast_ref::<homes_core::StorageError>()
                .and_then(|storage| storage.recovery_suggestion()),
        }
    });
    if let Some(hint) = hint {
        eprintln!("Hint: {}", hint);
    }
}

/// Initialize logging
///
/// Only initializes if HOMES_LOG environment variable is set.
/// Logs to config.log_file when set, otherwise stderr.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("HOMES_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("homes_core={},homes={}", log_level, log_level));

    match &config.log_file {
        Some(log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };

            // Ignore error if already initialized
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
