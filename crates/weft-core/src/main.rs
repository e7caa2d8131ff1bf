#![recursion_limit = "256"]

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use weft_ast::{Tier, TreeStats};
use weft_core::{logging, EditorConfig, RendererRegistry};
use weft_preview::{Language, Target};
use weft_session::HandlerSpec;

fn cli() -> Command {
    Command::new("weft")
        .version(weft_core::VERSION)
        .about("Inspect portable handler trees and the preview target catalog")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Editor config file (TOML)"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the canvas outline and tier summary of a handler document")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Handler document (JSON)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(Command::new("targets").about("List supported languages and frameworks"))
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration")
                .arg(
                    Arg::new("path")
                        .value_parser(value_parser!(PathBuf))
                        .help("Config file to load instead of defaults"),
                ),
        )
}

fn load_config(path: Option<&PathBuf>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

fn inspect(file: &Path, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let spec = HandlerSpec::from_json_str(&raw).with_context(|| format!("decoding {}", file.display()))?;
    let rows = RendererRegistry::with_defaults().outline(&spec.body);
    let stats = TreeStats::collect(&spec.body);

    if json {
        let report = serde_json::json!({
            "name": spec.name,
            "outline": rows,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let params: Vec<String> = spec
        .params
        .iter()
        .map(|param| {
            let marker = if param.optional { "?" } else { "" };
            format!("{}{marker}: {}", param.name, param.type_name)
        })
        .collect();
    let prefix = if spec.is_async { "async " } else { "" };
    let returns = spec.return_type.as_deref().map(|ty| format!(" -> {ty}")).unwrap_or_default();
    println!("{prefix}{}({}){returns}", spec.name, params.join(", "));
    println!();

    for row in &rows {
        let indent = "  ".repeat(row.depth + 1);
        let slot = row.slot.as_deref().map(|slot| format!("{slot}: ")).unwrap_or_default();
        println!("{indent}{slot}{}  [{}]", row.label, row.tier.label());
    }
    println!();

    let tiers: Vec<String> = Tier::ALL
        .iter()
        .map(|tier| format!("{} {}", tier.label(), stats.count(*tier)))
        .collect();
    println!("Nodes: {}  Depth: {}", stats.nodes, stats.max_depth);
    println!("Tiers: {}", tiers.join(", "));
    match stats.worst_tier() {
        Some(tier) if !stats.is_fully_portable() => println!("Portable: no (worst tier: {})", tier.label()),
        _ => println!("Portable: yes"),
    }
    Ok(())
}

fn targets() {
    for language in Language::ALL {
        let frameworks: Vec<String> = language
            .frameworks()
            .iter()
            .map(|framework| {
                if *framework == language.default_framework() {
                    format!("{framework} (default)")
                } else {
                    framework.to_string()
                }
            })
            .collect();
        println!("{language:<12}{}", frameworks.join(", "));
    }
    println!();
    println!("Default target: {}", Target::default());
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(matches.get_one::<PathBuf>("config"))?;
    logging::init(&config.logging);

    match matches.subcommand() {
        Some(("inspect", args)) => {
            let file = args
                .get_one::<PathBuf>("file")
                .context("missing handler document")?;
            inspect(file, args.get_flag("json"))?;
        }
        Some(("targets", _)) => targets(),
        Some(("config", args)) => {
            let effective = match args.get_one::<PathBuf>("path") {
                Some(path) => load_config(Some(path))?,
                None => config,
            };
            print!("{}", effective.to_toml_string()?);
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}
