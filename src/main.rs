//! RCNN Config CLI
//!
//! Entry point for the `rcnn-config` command-line tool.

use clap::{Args, Parser, Subcommand, ValueEnum};
use rcnn_config::config::{ArtifactNamespace, ConfigTree, EffectiveConfig};
use std::path::PathBuf;
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "rcnn-config")]
#[command(about = "Inspect and override detection pipeline configuration", version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Show {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,

        /// Include source provenance
        #[arg(long)]
        provenance: bool,
    },

    /// Print a single value by dotted key
    Get {
        /// Dotted key, e.g. TRAIN.LEARNING_RATE
        key: String,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Resolve (and create) an experiment artifact directory
    OutputDir {
        /// Image database name, e.g. voc_2007_trainval
        #[arg(long)]
        imdb: String,

        /// Weights identifier (default: "default")
        #[arg(long)]
        weights: Option<String>,

        /// Resolve the tensorboard directory instead of the output directory
        #[arg(long)]
        tensorboard: bool,

        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

#[derive(Args)]
struct OverrideArgs {
    /// Override file merged on top of the defaults (repeatable)
    #[arg(long = "cfg", value_name = "FILE")]
    cfg_files: Vec<PathBuf>,

    /// Dotted-key overrides: KEY VALUE [KEY VALUE ...]
    #[arg(long = "set", num_args = 1.., allow_negative_numbers = true, value_name = "KEY VALUE")]
    set: Vec<String>,

    /// Project root used for ROOT_DIR and DATA_DIR
    #[arg(long)]
    root_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error installing logger: {}", e);
    }

    match cli.command {
        Commands::Show {
            overrides,
            format,
            provenance,
        } => run_show(&overrides, format, provenance),
        Commands::Get { key, overrides } => run_get(&key, &overrides),
        Commands::OutputDir {
            imdb,
            weights,
            tensorboard,
            overrides,
        } => run_output_dir(&imdb, weights.as_deref(), tensorboard, &overrides),
    }
}

fn load_effective(overrides: &OverrideArgs) -> EffectiveConfig {
    let base = match &overrides.root_dir {
        Some(root) => ConfigTree::with_root_dir(root),
        None => ConfigTree::new(),
    };

    match EffectiveConfig::build(base, overrides.cfg_files.as_slice(), overrides.set.as_slice()) {
        Ok(effective) => effective,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn run_show(overrides: &OverrideArgs, format: Format, provenance: bool) {
    let effective = load_effective(overrides);

    let rendered = match (format, provenance) {
        (Format::Json, true) => effective.to_json().map_err(|e| e.to_string()),
        (Format::Json, false) => effective.config.to_json().map_err(|e| e.to_string()),
        (Format::Yaml, true) => effective.to_yaml().map_err(|e| e.to_string()),
        (Format::Yaml, false) => effective.config.to_yaml().map_err(|e| e.to_string()),
    };

    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_get(key: &str, overrides: &OverrideArgs) {
    let config = load_effective(overrides).into_config();

    match config.require(key) {
        Ok(value) => println!("{}", value),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_output_dir(imdb: &str, weights: Option<&str>, tensorboard: bool, overrides: &OverrideArgs) {
    let config = load_effective(overrides).into_config();
    let namespace = if tensorboard {
        ArtifactNamespace::Tensorboard
    } else {
        ArtifactNamespace::Output
    };

    match config.artifact_dir(namespace, imdb, weights) {
        Ok(dir) => println!("{}", dir.display()),
        Err(e) => {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }
}
