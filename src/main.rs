use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use pix2bez::{trace_bitmap, Bitmap, Color, FittingOptions, SplineDegree, TraceHooks};

#[derive(Parser)]
#[command(name = "pix2bez", about = "Trace bitmap regions into cubic bezier splines")]
struct Cli {
    /// Input image path (PNG, JPEG, BMP)
    #[arg(short, long)]
    input: PathBuf,

    /// Output SVG path
    #[arg(short, long)]
    output: PathBuf,

    /// Background color as hex (e.g. "FFFFFF"); regions of this color
    /// produce no outlines
    #[arg(short, long)]
    background: Option<String>,

    /// Trace the stroke skeleton instead of region boundaries
    #[arg(long)]
    centerline: bool,

    /// Attach stroke-width estimates to centerline output
    #[arg(long)]
    preserve_width: bool,

    /// Scale factor for preserved stroke widths
    #[arg(long, default_value = "6.0")]
    width_factor: f64,

    /// Points on either side of a point considered when measuring its
    /// corner angle
    #[arg(long, default_value = "4")]
    corner_surround: usize,

    /// Angle (degrees) at or below which a corner search window opens
    #[arg(long, default_value = "100")]
    corner_threshold: f64,

    /// Angle (degrees) at or below which a point is always a corner
    #[arg(long, default_value = "60")]
    corner_always_threshold: f64,

    /// Smoothing passes before fitting (0 = off)
    #[arg(long, default_value = "4")]
    filter_iterations: usize,

    /// Worst per-point fit error (pixels) accepted before subdividing
    #[arg(long, default_value = "2.0")]
    error_threshold: f64,

    /// Mean chord deviation (pixels) under which a cubic becomes a line
    #[arg(long, default_value = "1.0")]
    line_threshold: f64,

    /// Drop one of each pair of immediately adjacent corners
    #[arg(long)]
    remove_adjacent_corners: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let background = match cli.background.as_deref() {
        Some(hex) => Some(
            Color::from_hex(hex).ok_or_else(|| format!("invalid background color {hex:?}"))?,
        ),
        None => None,
    };
    let opts = FittingOptions {
        corner_surround: cli.corner_surround,
        corner_threshold: cli.corner_threshold,
        corner_always_threshold: cli.corner_always_threshold,
        filter_iterations: cli.filter_iterations,
        error_threshold: cli.error_threshold,
        line_threshold: cli.line_threshold,
        remove_adjacent_corners: cli.remove_adjacent_corners,
        centerline: cli.centerline,
        preserve_width: cli.preserve_width,
        width_weight_factor: cli.width_factor,
        background,
        ..FittingOptions::default()
    };

    let bitmap = Bitmap::load(&cli.input)?;
    if !cli.quiet {
        eprintln!();
        eprintln!("  pix2bez \u{00b7} {}", cli.input.display());
        eprintln!(
            "  Load        {}x{} px, {} plane(s)",
            bitmap.width(),
            bitmap.height(),
            bitmap.planes()
        );
    }

    let mut hooks = TraceHooks::default();
    if !cli.quiet {
        hooks.warning = Some(Box::new(|msg| eprintln!("  Warning     {msg}")));
    }

    let result = trace_bitmap(&bitmap, &opts, &mut hooks)?;
    if !cli.quiet {
        let (curves, lines) = result
            .lists
            .iter()
            .flat_map(|l| &l.splines)
            .fold((0usize, 0usize), |(c, l), s| match s.degree {
                SplineDegree::Cubic => (c + 1, l),
                SplineDegree::Linear => (c, l + 1),
            });
        let mode = if cli.centerline { "centerline" } else { "outline" };
        eprintln!(
            "  Trace       {} {} contours \u{2192} {} curves + {} lines",
            result.lists.len(),
            mode,
            curves,
            lines,
        );
    }

    let mut out = BufWriter::new(File::create(&cli.output)?);
    pix2bez::output::svg::write_svg(&mut out, &result)?;
    if !cli.quiet {
        eprintln!("  \u{2713} {}", cli.output.display());
        eprintln!();
    }

    Ok(())
}
