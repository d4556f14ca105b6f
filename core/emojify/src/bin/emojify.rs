//! Overlay expression emoji on faces recorded by an external detector.
//!
//! Usage:
//!   emojify photo.jpg --faces faces.json --assets emoji/ -o out.png
//!   emojify photo.jpg --faces faces.json --assets emoji/ -o out.png --json

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use emojify::{DirectoryAssetStore, Emojifier, ExpressionCategory, RecordedDetections};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "emojify")]
#[command(author, version, about = "Overlay expression emoji on detected faces", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// JSON file with the faces detected in the image
    #[arg(long)]
    faces: PathBuf,

    /// Directory holding one PNG per expression (smile.png, frown.png, ...)
    #[arg(long)]
    assets: PathBuf,

    /// Output image file
    #[arg(short, long)]
    output: PathBuf,

    /// Smiling probability threshold
    #[arg(long, default_value_t = emojify::classify::SMILING_PROBABILITY_THRESHOLD)]
    smile_threshold: f32,

    /// Eye-open probability threshold
    #[arg(long, default_value_t = emojify::classify::EYE_OPEN_PROBABILITY_THRESHOLD)]
    eye_threshold: f32,

    /// Emoji width relative to the face width
    #[arg(long, default_value_t = emojify::EMOJI_SCALE_FACTOR)]
    scale: f32,

    /// Minimum face size to decorate (0 keeps every recorded face)
    #[arg(long, default_value_t = 0)]
    min_face_size: u32,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Summary {
    image: String,
    output: String,
    faces_detected: usize,
    overlays: Vec<OverlayOutput>,
    skipped: Vec<SkippedOutput>,
}

#[derive(Serialize)]
struct OverlayOutput {
    face: usize,
    category: ExpressionCategory,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct SkippedOutput {
    face: usize,
    category: ExpressionCategory,
    reason: String,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "emojify=debug" } else { "emojify=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let detections = RecordedDetections::from_reader(BufReader::new(File::open(&args.faces)?))?;
    let picture = image::open(&args.image)?;

    let result = Emojifier::new(
        Box::new(detections),
        Box::new(DirectoryAssetStore::new(&args.assets)),
    )
    .smiling_threshold(args.smile_threshold)
    .eye_open_threshold(args.eye_threshold)
    .scale_factor(args.scale)
    .min_face_size(args.min_face_size)
    .notifier(Box::new(|message: &str| eprintln!("{message}")))
    .emojify(&picture)?;

    result.image.save(&args.output)?;

    let summary = Summary {
        image: args.image.display().to_string(),
        output: args.output.display().to_string(),
        faces_detected: result.faces_detected,
        overlays: result
            .overlays
            .iter()
            .map(|o| OverlayOutput {
                face: o.face_index + 1,
                category: o.category,
                x: o.placement.x,
                y: o.placement.y,
                width: o.placement.width,
                height: o.placement.height,
            })
            .collect(),
        skipped: result
            .skipped
            .iter()
            .map(|s| SkippedOutput {
                face: s.face_index + 1,
                category: s.category,
                reason: s.reason.clone(),
            })
            .collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_human_readable(&summary));
    }
    Ok(())
}

fn format_human_readable(summary: &Summary) -> String {
    let mut out = format!(
        "{} -> {} ({} face(s))\n",
        summary.image, summary.output, summary.faces_detected
    );
    for o in &summary.overlays {
        out.push_str(&format!(
            "  face {}: {:?} at ({}, {}) {}x{}\n",
            o.face, o.category, o.x, o.y, o.width, o.height
        ));
    }
    for s in &summary.skipped {
        out.push_str(&format!(
            "  face {}: {:?} skipped: {}\n",
            s.face, s.category, s.reason
        ));
    }
    out
}
