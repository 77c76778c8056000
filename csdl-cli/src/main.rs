//! Command-line interface for csdl
//! This binary exposes the editor core (lexer, completion, folding, indentation) for inspection
//! and scripting.
//!
//! Usage:
//!   csdl tokens `<path>` [--format simple|json]           - Dump the tokens of every line
//!   csdl complete `<path>` --line N --column N             - List completions at a cursor
//!   csdl folds `<path>`                                    - List foldable strings
//!   csdl indent `<path>` --line N                          - Indentation hint for a line
//!
//! `--config <file>` layers a TOML file over the built-in defaults, `-v` / `-vv` raise the log
//! level (logs go to stderr, `RUST_LOG` takes precedence).

mod commands;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::{CliError, TOKEN_FORMATS};
use csdl_config::{CsdlConfig, Loader};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    if let Err(error) = run(&matches) {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}

fn build_cli() -> Command {
    let path = Arg::new("path")
        .help("Path to the CSDL file")
        .required(true)
        .index(1);
    let line = Arg::new("line")
        .long("line")
        .short('l')
        .help("1-based line number")
        .required(true)
        .value_parser(value_parser!(usize));

    Command::new("csdl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting CSDL filters")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration layered over the built-in defaults")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output to stderr, repeat for trace output")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("tokens")
                .about("Dump the tokens of every line")
                .arg(path.clone())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(TOKEN_FORMATS.to_vec())
                        .default_value("simple"),
                ),
        )
        .subcommand(
            Command::new("complete")
                .about("List completion candidates at a cursor position")
                .arg(path.clone())
                .arg(line.clone())
                .arg(
                    Arg::new("column")
                        .long("column")
                        .help("1-based cursor column, the cursor sits before this character")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("folds")
                .about("List foldable strings with their placeholders")
                .arg(path.clone()),
        )
        .subcommand(
            Command::new("indent")
                .about("Print the indentation hint for a line")
                .arg(path)
                .arg(line),
        )
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<CsdlConfig, CliError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        tracing::debug!(%path, "layering configuration file");
        loader = loader.with_file(path);
    }
    Ok(loader.build()?)
}

fn read_source(matches: &ArgMatches) -> Result<String, CliError> {
    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })
}

fn required_number(matches: &ArgMatches, name: &str) -> usize {
    *matches
        .get_one::<usize>(name)
        .expect("numeric arguments are required")
}

fn run(matches: &ArgMatches) -> Result<(), CliError> {
    let config = load_config(matches)?;

    let output = match matches.subcommand() {
        Some(("tokens", sub)) => {
            let format = sub
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or("simple");
            commands::tokens(&config, &read_source(sub)?, format)?
        }
        Some(("complete", sub)) => commands::complete(
            &config,
            &read_source(sub)?,
            required_number(sub, "line"),
            required_number(sub, "column"),
        )?,
        Some(("folds", sub)) => commands::folds(&config, &read_source(sub)?),
        Some(("indent", sub)) => {
            commands::indent(&config, &read_source(sub)?, required_number(sub, "line"))?
        }
        _ => return Ok(()),
    };

    print!("{}", output);
    Ok(())
}
