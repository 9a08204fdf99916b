use clap::{ArgAction, Parser};
use metromap::map::{build_layout, load_subways};
use metromap::style::MapStyle;
use std::path::PathBuf;

/// Compute transit map geometry and print it as JSON
#[derive(Parser, Debug)]
#[command(name = "metromap-layout")]
#[command(version)]
#[command(about = "Dump station and track geometry for a transit map as JSON", long_about = None)]
struct Args {
    /// Map JSON: a file path, an http(s) URL, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Path to a style file (TOML or YAML)
    #[arg(short, long, value_name = "STYLE", conflicts_with = "preset")]
    style: Option<PathBuf>,

    /// Built-in style preset
    #[arg(short, long, value_name = "NAME")]
    preset: Option<String>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    metromap::logging::init(args.verbose);

    let style =
        MapStyle::resolve(args.style.as_deref(), args.preset.as_deref()).map_err(|e| e.to_string())?;
    let subways = load_subways(&args.input).map_err(|e| e.to_string())?;
    let layout = build_layout(&subways, &style).map_err(|e| e.to_string())?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&layout)
    } else {
        serde_json::to_string(&layout)
    }
    .map_err(|e| format!("Failed to serialize layout: {}", e))?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json).map_err(|e| format!("Failed to write layout: {}", e))?;
            eprintln!("Layout saved to: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
