use clap::{ArgAction, Parser};
use metromap::export::{wrap_document, write_output};
use metromap::map::{build_layout, load_subways, render_map};
use metromap::style::MapStyle;
use std::path::PathBuf;

/// Render a schematic transit map to SVG, PNG or PDF
#[derive(Parser, Debug)]
#[command(name = "metromap")]
#[command(version)]
#[command(about = "Render a transit map described in JSON to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Map JSON: a file path, an http(s) URL, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to a style file (TOML or YAML)
    #[arg(short, long, value_name = "STYLE", conflicts_with = "preset")]
    style: Option<PathBuf>,

    /// Built-in style preset
    #[arg(short, long, value_name = "NAME")]
    preset: Option<String>,

    /// Padding around the map in pixels
    #[arg(long, default_value_t = 20.0)]
    padding: f64,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

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

    for warning in &layout.warnings {
        eprintln!("Warning: {}", warning);
    }

    let (inner_svg, width, height) = render_map(&layout, &style).map_err(|e| e.to_string())?;
    let svg = wrap_document(&inner_svg, width, height, args.padding, &style.background);

    write_output(&args.output, &svg, args.png_scale).map_err(|e| e.to_string())?;
    eprintln!("Map saved to: {}", args.output.display());

    Ok(())
}
