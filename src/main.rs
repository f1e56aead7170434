//! about-tools: validate, collect and generate ABOUT attribution files.

use about_tools::{
    cli::{self, exit_codes},
    config::{self, AppConfig, API_KEY_ENV},
};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "about-tools")]
#[command(version)]
#[command(about = "Validate, collect and generate ABOUT attribution files", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  No ERROR or CRITICAL diagnostic
    1  ERROR or CRITICAL diagnostics reported
    3  Fatal error

EXAMPLES:
    # Export every ABOUT file under a directory
    about-tools inventory ./project inventory.csv

    # Generate ABOUT files, reusing licenses from a previous run
    about-tools gen inventory.csv ./out --reference ./previous-out

    # Rename and filter inventory columns
    about-tools transform raw.csv inventory.csv --transform-config transform.yaml")]
struct Cli {
    /// Show INFO diagnostics and debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `inventory` subcommand
#[derive(Parser)]
struct InventoryArgs {
    /// ABOUT file or directory to collect
    location: PathBuf,

    /// Output inventory (.csv or .json)
    output: PathBuf,

    /// Report referenced files that do not exist
    #[arg(long)]
    check_files: bool,
}

/// Arguments for the `gen` subcommand
#[derive(Parser)]
struct GenArgs {
    /// Inventory to generate from (.csv or .json)
    inventory: PathBuf,

    /// Directory to write ABOUT files into
    target: PathBuf,

    /// Directory of previously generated license and notice files to reuse
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Fetch licenses missing from the reference directory from the license API
    #[arg(long)]
    fetch_licenses: bool,

    /// License API endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// License API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// License API request timeout in seconds
    #[arg(long)]
    api_timeout: Option<u64>,

    /// Keep full resource paths and directory-style about_file_path values
    #[arg(long)]
    legacy_placement: bool,
}

/// Arguments for the `transform` subcommand
#[derive(Parser)]
struct TransformArgs {
    /// Input CSV inventory
    input: PathBuf,

    /// Output CSV inventory
    output: PathBuf,

    /// Transform configuration (YAML); defaults to the config file's `transform` section
    #[arg(long = "transform-config", short = 'c')]
    transform_config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect ABOUT files into a CSV or JSON inventory
    Inventory(InventoryArgs),

    /// Generate ABOUT files from an inventory
    Gen(GenArgs),

    /// Rename, filter and check the columns of a CSV inventory
    Transform(TransformArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (defaults merged with the config file)
    Show,
    /// Write an example .about-tools.yaml in the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let verbose = cli.verbose;
    match cli.command {
        Commands::Inventory(args) => {
            cli::run_inventory(&args.location, &args.output, args.check_files, verbose)
        }

        Commands::Gen(args) => {
            let mut overrides = AppConfig::default();
            overrides.api.url = args.api_url;
            overrides.api.key = args.api_key;
            if let Some(timeout) = args.api_timeout {
                overrides.api.timeout_secs = timeout;
            }
            overrides.generation.reference_dir = args.reference;
            overrides.generation.legacy_placement = args.legacy_placement;
            overrides.generation.fetch_licenses = args.fetch_licenses;

            let (config, loaded_from) =
                AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides);
            if let Some(path) = loaded_from {
                tracing::debug!("Using config file {}", path.display());
            }
            cli::run_gen(&args.inventory, &args.target, &config, verbose)
        }

        Commands::Transform(args) => {
            let (config, _) = config::load_or_default(cli.config.as_deref());
            cli::run_transform(
                &args.input,
                &args.output,
                args.transform_config.as_deref(),
                &config,
                verbose,
            )
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "about-tools", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = config::generate_json_schema()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) = config::load_or_default(cli.config.as_deref());
                match &loaded_from {
                    Some(path) => eprintln!("# Loaded from: {}", path.display()),
                    None => eprintln!("# No config file found; showing defaults"),
                }
                let yaml =
                    serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".about-tools.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                std::fs::write(&target, config::generate_example_config())
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}
