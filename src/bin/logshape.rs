//! Command-line interface for logshape
//! This binary discovers the key/value structure of log lines and prints it in different formats.
//!
//! Usage:
//!   logshape parse `<path>` [--format `<spec>`]   - Process every line of a file
//!   logshape line `<text>` [--format `<spec>`]    - Process a single line given on the command line
//!   logshape list-formats                       - List all available formats
//!
//! Global options:
//!   --config `<file>`       Layer a TOML file over the built-in defaults
//!   --set `<key>=<value>`   Override a single setting (repeatable)
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `logshape=warn`).

use clap::{Arg, ArgAction, ArgMatches, Command};
use logshape::shape::config::{Loader, ShapeConfig};
use logshape::shape::processor::{
    available_formats, process_file, process_line, ProcessingError, ProcessingSpec,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    init_tracing();

    let matches = Command::new("logshape")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Discover key/value structure in unstructured log lines")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults")
                .global(true),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .help("Override a setting, e.g. --set limits.max_tokens=256")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (e.g., shape-simple, shape-json, token-simple)")
                .global(true),
        )
        .subcommand(
            Command::new("parse")
                .about("Process every line of a log file")
                .arg(
                    Arg::new("path")
                        .help("Path to the log file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("line")
                .about("Process a single line")
                .arg(
                    Arg::new("text")
                        .help("The log line to analyze")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("list-formats").about("List all available output formats"))
        .get_matches();

    let result = match matches.subcommand() {
        Some(("parse", sub)) => handle_parse_command(sub),
        Some(("line", sub)) => handle_line_command(sub),
        Some(("list-formats", _)) => {
            handle_formats_command();
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if matches!(
            e,
            ProcessingError::InvalidFormat(_)
                | ProcessingError::InvalidStage(_)
                | ProcessingError::InvalidFormatType(_)
        ) {
            eprintln!("\nAvailable formats:");
            for format in available_formats() {
                eprintln!("  {}", format);
            }
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logshape=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Builds the configuration from the defaults, `--config` and every `--set`
fn load_config(matches: &ArgMatches) -> Result<ShapeConfig, ProcessingError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(overrides) = matches.get_many::<String>("set") {
        for assignment in overrides {
            loader = loader.with_assignment(assignment)?;
        }
    }
    Ok(loader.build()?)
}

fn resolve_spec(matches: &ArgMatches, config: &ShapeConfig) -> Result<ProcessingSpec, ProcessingError> {
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or(&config.output.format);
    ProcessingSpec::from_string(format)
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches) -> Result<(), ProcessingError> {
    let config = load_config(matches)?;
    let spec = resolve_spec(matches, &config)?;
    let Some(path) = matches.get_one::<String>("path") else {
        return Ok(());
    };
    print!("{}", process_file(path, &spec, &config)?);
    Ok(())
}

/// Handle the line command
fn handle_line_command(matches: &ArgMatches) -> Result<(), ProcessingError> {
    let config = load_config(matches)?;
    let spec = resolve_spec(matches, &config)?;
    let Some(text) = matches.get_one::<String>("text") else {
        return Ok(());
    };
    print!("{}", process_line(text, &spec, &config)?);
    Ok(())
}

/// Handle the list-formats command
fn handle_formats_command() {
    println!("Available formats:");
    for format in available_formats() {
        println!("  {}", format);
    }
}
