//! tinycalc - A small spreadsheet with a batch command-line front end

mod config;
mod table;

use anyhow::Context;
use std::env;
use std::path::PathBuf;
use tinycalc_core::storage::write_markdown;
use tinycalc_core::{CellRef, Sheet};
use tinycalc_engine::builtins::BUILTINS;
use tinycalc_engine::engine::format_value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: tinycalc [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Sheet file to open");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <CELL=TEXT>     Set a cell before anything else (can be repeated)");
    eprintln!("  -c, --command <EXPR>      Evaluate a formula and print the result (can be repeated)");
    eprintln!("  -o, --output <FILE>       Export to markdown file");
    eprintln!("  -w, --write               Save the sheet back to FILE");
    eprintln!("  --config <path>           Load settings from TOML file");
    eprintln!("  --no-config               Ignore any config file");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Functions:");
    for builtin in BUILTINS {
        eprintln!("  {:<25} {}", builtin.name, builtin.description);
    }
    eprintln!();
    eprintln!("Set TINYCALC_LOG (e.g. TINYCALC_LOG=debug) to control diagnostics on stderr.");
}

#[derive(Default)]
struct Options {
    file_path: Option<PathBuf>,
    sets: Vec<(CellRef, String)>,
    commands: Vec<String>,
    output_file: Option<PathBuf>,
    write: bool,
    config_file: Option<PathBuf>,
    no_config: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TINYCALC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-s" | "--set" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --set requires CELL=TEXT");
                    std::process::exit(1);
                }
                let Some((name, text)) = args[i].split_once('=') else {
                    eprintln!("Error: --set expects CELL=TEXT, got: {}", args[i]);
                    std::process::exit(1);
                };
                let Some(at) = CellRef::parse(name.trim()) else {
                    eprintln!("Error: Invalid cell reference: {}", name);
                    std::process::exit(1);
                };
                opts.sets.push((at, text.to_string()));
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a formula");
                    std::process::exit(1);
                }
                opts.commands.push(args[i].to_string());
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires a file path");
                    std::process::exit(1);
                }
                opts.output_file = Some(PathBuf::from(&args[i]));
            }
            "-w" | "--write" => opts.write = true,
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                opts.config_file = Some(PathBuf::from(&args[i]));
            }
            "--no-config" => opts.no_config = true,
            arg if arg.starts_with('-') && arg.len() > 1 => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if opts.file_path.is_none() {
                    opts.file_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    match run(opts) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Apply the requested actions; returns the process exit code.
fn run(opts: Options) -> anyhow::Result<i32> {
    let (config, warnings) = if opts.no_config {
        (config::Config::default(), Vec::new())
    } else {
        config::load_config(opts.config_file.as_ref())
    };
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut sheet = match &opts.file_path {
        Some(path) => Sheet::with_file(Some(path.clone()))
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Sheet::new(),
    };
    debug!(cells = sheet.store().len(), "sheet ready");

    for (at, text) in &opts.sets {
        sheet
            .set_cell(*at, text)
            .with_context(|| format!("Failed to set {}", at))?;
    }

    let mut exit_code = 0;
    for command in &opts.commands {
        let value = sheet.evaluate_formula(command);
        if value.is_error() {
            exit_code = 1;
        }
        println!("{}", format_value(&value, usize::MAX, config.show_error_messages));
    }

    if let Some(output_path) = &opts.output_file {
        write_markdown(output_path, &sheet, config.show_error_messages)
            .with_context(|| format!("Failed to export {}", output_path.display()))?;
        eprintln!("Exported to {}", output_path.display());
    }

    if opts.write {
        let path = sheet.save_file().context("Failed to save")?;
        eprintln!("Saved to {}", path.display());
    }

    if opts.commands.is_empty() && opts.output_file.is_none() && !opts.write {
        print!("{}", table::render_table(&sheet, &config));
    }

    Ok(exit_code)
}
