//! Command-line interface for troff-parser
//! Prints the token stream or the parsed tree of a man page, and writes the parse table.
//!
//! Usage:
//!   troff tokens `<path>`                                  - Print the token stream
//!   troff parse `<path>` [--format treeviz|json|yaml]      - Print the document tree
//!   troff tables [--outdir `<dir>`]                        - Write the parse table as JSON
//!
//! Global options: `--config <file.yaml>` loads a ParserConfig, `--debug <level>` sets
//! the parser debug level. Log output is controlled with `RUST_LOG`.

use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;
use troff_parser::troff::formats::to_treeviz_str;
use troff_parser::{DiagnosticSink, Lexer, Parser, ParserConfig};

fn main() {
    init_tracing();

    let matches = Command::new("troff")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting troff man page sources")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("YAML file with parser options"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('d')
                .global(true)
                .value_parser(value_parser!(u32))
                .default_value("0")
                .help("Parser debug level (0 = off)"),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream of a file")
                .arg(
                    Arg::new("path")
                        .help("Path to the troff file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a file and print its document tree")
                .arg(
                    Arg::new("path")
                        .help("Path to the troff file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["treeviz", "json", "yaml"])
                        .default_value("treeviz"),
                ),
        )
        .subcommand(
            Command::new("tables")
                .about("Write the man page parse table as JSON")
                .arg(
                    Arg::new("outdir")
                        .long("outdir")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory for the table file (overrides the config)"),
                ),
        )
        .get_matches();

    let config = load_config(&matches);
    let debug_level = matches.get_one::<u32>("debug").copied().unwrap_or(0);

    match matches.subcommand() {
        Some(("tokens", sub)) => handle_tokens_command(&config, path_arg(sub)),
        Some(("parse", sub)) => {
            let format = sub
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or("treeviz");
            handle_parse_command(config, path_arg(sub), format, debug_level);
        }
        Some(("tables", sub)) => {
            let mut config = config;
            if let Some(outdir) = sub.get_one::<PathBuf>("outdir") {
                config.outputdir = Some(outdir.clone());
            }
            handle_tables_command(config);
        }
        _ => unreachable!(),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (warnings only by default).
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(matches: &ArgMatches) -> ParserConfig {
    let Some(path) = matches.get_one::<PathBuf>("config") else {
        return ParserConfig::default();
    };
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config {}: {}", path.display(), e);
        std::process::exit(1);
    });
    ParserConfig::from_yaml(&source).unwrap_or_else(|e| {
        eprintln!("Invalid config {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

fn path_arg(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or_default()
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    })
}

/// Lexical errors go to stderr prefixed with the file name.
fn stderr_sink(path: &str) -> Box<dyn DiagnosticSink> {
    let path = path.to_string();
    Box::new(move |message: &str, line: usize, column: usize| {
        eprintln!("{}:{}:{}: {}", path, line, column, message);
    })
}

fn handle_tokens_command(config: &ParserConfig, path: &str) {
    let source = read_source(path);
    let mut lexer = Lexer::from_config(config, stderr_sink(path)).unwrap_or_else(|e| {
        eprintln!("Error building lexer: {}", e);
        std::process::exit(1);
    });
    lexer.set_fname(path);
    lexer.input(&source);

    while let Some(token) = lexer.token() {
        println!(
            "{} {}:{} {:?}",
            token.kind,
            token.line,
            lexer.token_col(&token),
            token.text
        );
    }
}

fn handle_parse_command(config: ParserConfig, path: &str, format: &str, debug_level: u32) {
    let source = read_source(path);
    let mut parser = Parser::new(config, stderr_sink(path)).unwrap_or_else(|e| {
        eprintln!("Error building parser: {}", e);
        std::process::exit(1);
    });

    let doc = parser.parse(&source, path, debug_level).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let output = match format {
        "json" => serde_json::to_string_pretty(&doc)
            .map(|json| json + "\n")
            .map_err(|e| e.to_string()),
        "yaml" => serde_yaml::to_string(&doc).map_err(|e| e.to_string()),
        _ => Ok(to_treeviz_str(&doc)),
    };
    match output {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            std::process::exit(1);
        }
    }
}

fn handle_tables_command(config: ParserConfig) {
    let parser = Parser::new(config, stderr_sink("<tables>")).unwrap_or_else(|e| {
        eprintln!("Error building parser: {}", e);
        std::process::exit(1);
    });
    let json = parser.table().to_json().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let target = parser.config().table_artifact_path();
    if let Some(dir) = target.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Error creating {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    }
    if let Err(e) = std::fs::write(&target, json) {
        eprintln!("Error writing {}: {}", target.display(), e);
        std::process::exit(1);
    }
    println!(
        "{} states written to {}",
        parser.table().state_count(),
        target.display()
    );
}
