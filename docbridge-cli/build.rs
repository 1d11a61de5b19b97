use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the views from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &["tokens-json", "tokens-simple", "tree-json", "flat"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("docbridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Round-trip markup units through a rich-text document")
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
        .subcommand(Command::new("export").about("Write the rich-text document from the unit files"))
        .subcommand(Command::new("import").about("Rewrite the unit files from the rich-text document"))
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
                            AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        );

    generate_to(Bash, &mut cmd, "docbridge", &outdir)?;
    generate_to(Zsh, &mut cmd, "docbridge", &outdir)?;
    generate_to(Fish, &mut cmd, "docbridge", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
