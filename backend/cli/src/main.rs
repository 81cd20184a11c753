mod events_cmd;
mod flows_cmd;
mod key_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use geovision_config::{GeoVisionConfig, LogFormat, Profile};
use geovision_logging::init_logger;

use terminal_output::{note_error, note_info, note_warn, print_json};

#[derive(Parser)]
#[command(name = "geovision")]
#[command(about = "GeoVision operator tools: inspect keys and events, run flows by hand")]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a structured object key into its metadata
    ParseKey { key: String },
    /// Convert a heading in degrees to a compass label
    Compass {
        #[arg(allow_negative_numbers = true)]
        degrees: f64,
    },
    /// List the image references a saved notification event would caption
    Normalize { file: PathBuf },
    /// Caption one stored image and write the sibling .txt object
    Caption {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
    },
    /// Analyze every room photo under a folder
    Analyze {
        #[arg(long)]
        folder: String,
    },
    /// Print the effective configuration for a function profile
    Config {
        #[arg(long, value_enum, default_value_t = ProfileArg::Caption)]
        profile: ProfileArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Caption,
    Analyzer,
    Notifier,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Caption => Profile::Caption,
            ProfileArg::Analyzer => Profile::Analyzer,
            ProfileArg::Notifier => Profile::Notifier,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "warn" };

    match cli.command {
        Commands::ParseKey { key } => {
            init_logger(level, LogFormat::Pretty);
            print_json(&key_cmd::parse_key_json(&key)?)?;
        }
        Commands::Compass { degrees } => {
            print_json(&key_cmd::compass_json(degrees))?;
        }
        Commands::Normalize { file } => {
            init_logger(if cli.verbose { "debug" } else { "info" }, LogFormat::Pretty);
            let refs = events_cmd::run(&file).await?;
            if refs.is_empty() {
                note_warn("No image references in event");
            }
            for reference in &refs {
                println!("{reference}");
            }
        }
        Commands::Caption { bucket, key } => {
            let config = flows_cmd::load_config(Profile::Caption, cli.verbose)?;
            print_json(&flows_cmd::caption(&config, &bucket, &key).await?)?;
        }
        Commands::Analyze { folder } => {
            let config = flows_cmd::load_config(Profile::Analyzer, cli.verbose)?;
            note_info(&format!("Analyzing {folder} in bucket {}", config.bucket));
            print_json(&flows_cmd::analyze(&config, &folder).await?)?;
        }
        Commands::Config { profile } => {
            init_logger(level, LogFormat::Pretty);
            let config = GeoVisionConfig::from_env(profile.into())?;
            let report = geovision_config::validate(&config);
            for warning in &report.warnings {
                note_warn(&warning.to_string());
            }
            for error in &report.errors {
                note_error(&error.to_string());
            }
            print_json(&serde_json::to_value(&config)?)?;
        }
    }
    Ok(())
}
