#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "inlay")]
#[command(author, version, about = "An npm-style @import inliner for CSS", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted logs (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Flatten a stylesheet by inlining its imports
    Build {
        /// Entry stylesheet
        entry: PathBuf,

        /// Output file (if not specified, prints to stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write a source-mapping sidecar next to the output (requires --output)
        #[arg(long, requires = "output")]
        map: bool,

        /// Resolution root (defaults to the working directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Logical name aliases (e.g., --alias util=styles/util)
        #[arg(long = "alias", value_delimiter = ',')]
        aliases: Vec<String>,

        /// Package entry overrides (e.g., --shim pkg=alt.css)
        #[arg(long = "shim", value_delimiter = ',')]
        shims: Vec<String>,

        /// Import targets injected before the entry's own content
        #[arg(long, value_delimiter = ',')]
        prepend: Vec<String>,

        /// Path to a JSON options file (flags override its fields)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Logs go to stderr so stdout stays clean for flattened CSS. `RUST_LOG`
/// takes precedence over the `-v` count when set.
fn init_logging(verbose: u8, json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level(verbose)).into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    init_logging(cli.verbose, cli.json);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Build {
            entry,
            output,
            map,
            root,
            aliases,
            shims,
            prepend,
            config,
        }) => {
            let action = commands::build::BuildAction {
                entry,
                cwd,
                output,
                map,
                root,
                aliases,
                shims,
                prepend,
                config,
            };
            commands::build::run(action)
        }
    }
}
