use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookloom::compile::OutputFormat;

#[derive(Parser)]
#[command(name = "bookloom")]
#[command(
    version,
    about = "Project manager for scene-based book manuscripts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project configuration file
    #[arg(long, short, default_value = "config.yaml", global = true)]
    config: PathBuf,

    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a book project in the current directory
    Init {
        #[arg(long, short, help = "Overwrite an existing config.yaml")]
        force: bool,
    },

    /// Scan drafts, analyze scenes, write the outline, compile
    Build {
        #[arg(long, help = "Skip pandoc compilation")]
        no_compile: bool,
        #[arg(long, help = "Print the outline to stdout, write nothing")]
        report_only: bool,
        #[arg(long, help = "Reanalyze everything, bypassing the cache")]
        force: bool,
        #[arg(long, help = "Reanalyze everything but refresh the cache")]
        no_cache: bool,
        #[arg(
            long,
            value_delimiter = ',',
            help = "Formats to compile (docx, epub, pdf), overriding the config"
        )]
        formats: Option<Vec<OutputFormat>>,
    },

    /// Remove generated artifacts
    Clean {
        #[arg(long, help = "Only remove the analysis cache")]
        cache: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (defaults + file + environment)
    Show {
        #[arg(long, help = "Output as JSON instead of YAML")]
        json: bool,
    },
    /// Show which config file is in effect
    Path,
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Init { force } => {
            bookloom::cli::commands::init::run(force)?;
        }
        Commands::Build {
            no_compile,
            report_only,
            force,
            no_cache,
            formats,
        } => {
            bookloom::cli::commands::build::run(
                &cli.config,
                bookloom::cli::commands::build::BuildFlags {
                    no_compile,
                    report_only,
                    force,
                    no_cache,
                    formats,
                },
            )?;
        }
        Commands::Clean { cache } => {
            bookloom::cli::commands::clean::run(&cli.config, cache)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                bookloom::cli::commands::config::show(&cli.config, json)?;
            }
            ConfigAction::Path => {
                bookloom::cli::commands::config::path(&cli.config)?;
            }
        },
    }

    Ok(())
}
