// Command-line interface for docbridge
//
// This binary moves a fixed set of markup units into a single rich-text document for review in a
// word processor, and back again.
//
// The unit list, the docs directory and the document path all come from configuration: the
// embedded defaults, then ./docbridge.toml if present, then --config <PATH>.
//
// Usage:
//  docbridge export                      - Flatten every unit and write the rich-text document
//  docbridge import                      - Read the rich-text document and rewrite every unit
//  docbridge inspect <path> [<view>]     - Show a unit's tokens, block tree or flattened text
//  docbridge --list-transforms           - List available inspect views
//
// Progress goes to stdout, errors to stderr with exit code 1. Diagnostic logging is controlled by
// DOCBRIDGE_LOG (tracing EnvFilter syntax, default "warn") and is written to stderr.

mod transforms;

use clap::{Arg, ArgAction, Command, ValueHint};
use docbridge_babel::formats::PandocConverter;
use docbridge_babel::{
    export, import, ExportSpec, Grammar, ImportSpec, Malformation, Progress, UnitRegistry,
};
use docbridge_config::{DocbridgeConfig, Loader};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DOCBRIDGE_LOG";

fn build_cli() -> Command {
    Command::new("docbridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Round-trip markup units through a rich-text document")
        .long_about(
            "docbridge flattens a fixed set of markup units into one rich-text document that can \
            be edited in a word processor, and rebuilds the units from that document afterwards.\n\n\
            Block nesting, embedded checkbox controls and links between units survive the trip.",
        )
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .help("Path to a docbridge.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available inspect views")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("export")
                .about("Write the rich-text document from the unit files")
                .long_about(
                    "Reads every configured unit from the docs directory, flattens them into a \
                    single linear document and has pandoc render it.\n\n\
                    The linear document is also kept at the debug export path for inspection.",
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Rewrite the unit files from the rich-text document")
                .long_about(
                    "Has pandoc read the rich-text document back, rebuilds every unit and \
                    overwrites the unit files.\n\n\
                    Unit files are only written once every unit has been rebuilt.",
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show how a unit file is read")
                .arg(
                    Arg::new("path")
                        .help("Path to the unit file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("View to print")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    init_logging();

    let matches = build_cli().get_matches();

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let registry = config.registry().unwrap_or_else(|err| {
        eprintln!("Invalid unit list: {err}");
        std::process::exit(1);
    });
    let grammar = config.grammar();

    match matches.subcommand() {
        Some(("export", _)) => handle_export_command(&config, &registry, &grammar),
        Some(("import", _)) => handle_import_command(&config, &registry, &grammar),
        Some(("inspect", sub_matches)) => {
            let Some(path) = sub_matches.get_one::<String>("path") else {
                eprintln!("Missing unit file path.");
                std::process::exit(1);
            };
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            handle_inspect_command(path, transform, &registry, &grammar);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn converter_from_config(config: &DocbridgeConfig) -> PandocConverter {
    let converter = PandocConverter::new()
        .with_rich_format(config.converter.target_format.as_str())
        .with_linear_format(config.converter.source_format.as_str());
    match &config.converter.binary {
        Some(binary) => converter.with_binary(binary),
        None => converter,
    }
}

fn print_progress(event: &Progress) {
    println!("{event}");
}

/// Handle the export command
fn handle_export_command(config: &DocbridgeConfig, registry: &UnitRegistry, grammar: &Grammar) {
    let spec = ExportSpec::new(
        registry,
        grammar,
        &config.project.docs_dir,
        &config.project.document,
    )
    .with_debug_output(&config.debug.export_path)
    .with_source_format(config.converter.source_format.as_str())
    .with_target_format(config.converter.target_format.as_str());

    let converter = converter_from_config(config);
    match export(&spec, &converter, print_progress) {
        Ok(report) => summarize_issues(&report.issues),
        Err(err) => {
            eprintln!("Export failed: {err}");
            std::process::exit(1);
        }
    }
}

/// Handle the import command
fn handle_import_command(config: &DocbridgeConfig, registry: &UnitRegistry, grammar: &Grammar) {
    let spec = ImportSpec::new(
        registry,
        grammar,
        &config.project.document,
        &config.project.docs_dir,
    )
    .with_debug_output(&config.debug.import_path)
    .with_source_format(config.converter.target_format.as_str());

    let converter = converter_from_config(config);
    match import(&spec, &converter, print_progress) {
        Ok(report) => summarize_issues(&report.issues),
        Err(err) => {
            eprintln!("Import failed: {err}");
            std::process::exit(1);
        }
    }
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, transform: &str, registry: &UnitRegistry, grammar: &Grammar) {
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });

    let unit = unit_name(path, registry);
    let inspection = transforms::execute_transform(&source, &unit, transform, registry, grammar)
        .unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    for issue in &inspection.issues {
        tracing::warn!("{issue}");
    }
    print!("{}", inspection.output);
}

/// Registered unit matching the file name, or the file name itself
fn unit_name(path: &str, registry: &UnitRegistry) -> String {
    let file_name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    registry
        .names()
        .find(|name| *name == file_name || path.ends_with(*name))
        .map(str::to_string)
        .unwrap_or(file_name)
}

fn summarize_issues(issues: &[Malformation]) {
    if !issues.is_empty() {
        eprintln!("Completed with {} repaired issue(s).", issues.len());
    }
}

fn handle_list_transforms_command() {
    println!("Available inspect views:\n");
    println!("  tokens-json    - Line tokens as JSON");
    println!("  tokens-simple  - One line per token (default)");
    println!("  tree-json      - Block tree as JSON");
    println!("  flat           - The unit as written into the linear document");
}

fn load_cli_config(explicit_path: Option<&str>) -> DocbridgeConfig {
    let loader = Loader::new().with_optional_file("docbridge.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}
