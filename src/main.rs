//! nashfig - figures for the Nash equilibrium VM allocation example.
//!
//! Renders a fixed set of bar charts and line plots from hardcoded example
//! numbers into an output directory.

mod data;
mod error;
mod font;
mod plot;

use anyhow::Result;
use clap::Parser;
use plot::ImageFormat;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Generate the Nash equilibrium example figures
#[derive(Parser, Debug)]
#[command(name = "nashfig")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the figures are written to (created if missing)
    #[arg(short, long, default_value = "figures")]
    output_dir: PathBuf,

    /// Image format of the generated figures
    #[arg(short, long, value_enum, default_value_t = ImageFormat::Png)]
    format: ImageFormat,

    /// TrueType font used for titles and labels (default: first system font found)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose)?;

    let font = font::ensure_registered(args.font.as_deref())?;
    info!(font = %font.display(), "Using font");
    info!(dir = %args.output_dir.display(), format = args.format.extension(), "Generating figures");

    let generated = plot::generate_all_plots(&args.output_dir, args.format)?;
    info!(count = generated.len(), "Done");

    println!(
        "Graphs generated and saved in the '{}' directory.",
        args.output_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_plain_run() {
        let args = Args::try_parse_from(["nashfig"]).unwrap();
        assert_eq!(args.output_dir, PathBuf::from("figures"));
        assert_eq!(args.format, ImageFormat::Png);
        assert!(args.font.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_svg_and_custom_dir() {
        let args = Args::try_parse_from(["nashfig", "-o", "out/figs", "--format", "svg", "-v"]).unwrap();
        assert_eq!(args.output_dir, PathBuf::from("out/figs"));
        assert_eq!(args.format, ImageFormat::Svg);
        assert!(args.verbose);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["nashfig", "--format", "jpeg"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
