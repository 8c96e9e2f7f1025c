use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};

mod config;
mod io;
mod runtime;
mod session;
mod split;
mod table;

use config::SplitConfig;

#[derive(Parser)]
#[command(name = "tabsplit")]
#[command(about = "Tabsplit - Interactive train/test splitter for tabular datasets", long_about = None)]
struct Cli {
    /// Log at info level instead of warnings only
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a dataset interactively: preview, configure, split, export
    Run {
        /// Dataset to load (.csv, .xlsx or .xls)
        file: PathBuf,
        /// Optional YAML file with the initial split parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory the artifacts are written to
        #[arg(short, long, default_value = "splits")]
        output: PathBuf,
    },
    /// Split a dataset non-interactively with the given parameters
    Split {
        /// Dataset to load (.csv, .xlsx or .xls)
        file: PathBuf,
        /// Optional YAML file with split parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory the artifacts are written to
        #[arg(short, long, default_value = "splits")]
        output: PathBuf,
        /// Test set size as a percentage (10-50)
        #[arg(long)]
        test_size: Option<u8>,
        /// Random seed (0-1000)
        #[arg(long)]
        seed: Option<u64>,
        /// Column to stratify on
        #[arg(long)]
        stratify: Option<String>,
        /// Skip the zip bundle
        #[arg(long)]
        no_bundle: bool,
    },
    /// Validate a split configuration file
    Validate {
        /// Path to the YAML configuration
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Run {
            file,
            config,
            output,
        } => {
            let initial = load_config(config.as_deref())?;
            runtime::run_interactive(&file, initial, &output)?;
        }
        Commands::Split {
            file,
            config,
            output,
            test_size,
            seed,
            stratify,
            no_bundle,
        } => {
            let mut split_config = load_config(config.as_deref())?;
            if let Some(v) = test_size {
                split_config.test_size = v;
            }
            if let Some(v) = seed {
                split_config.seed = v;
            }
            if let Some(v) = stratify {
                split_config.stratify = Some(v);
            }
            if no_bundle {
                split_config.bundle = false;
            }
            split_config.validate()?;
            runtime::run_once(&file, split_config, &output)?;
        }
        Commands::Validate { config } => {
            let _config = SplitConfig::from_yaml_file(&config)?;
            println!("✓ Split configuration is valid");
        }
        Commands::Version => {
            println!("tabsplit version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SplitConfig> {
    match path {
        Some(p) => SplitConfig::from_yaml_file(p),
        None => Ok(SplitConfig::default()),
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;
    Ok(())
}
