//! Command-line diagnostics for the fenlens pipeline.
//!
//! `fenlens detect board.jpg --rectified out.png --annotated overlay.png`
//! extracts the board and reports the quadrilateral, strategy and quality.
//! FEN production needs a trained classifier and is a library-level API.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fenlens::{annotate_detection, FenPipeline, PipelineParams};
use image::ImageReader;
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "fenlens", version, about = "Chessboard photo analysis")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Locate, validate and rectify the board in a photo.
    Detect {
        /// Input photo (JPEG/PNG).
        image: PathBuf,

        /// Write the rectified canonical board here (PNG).
        #[arg(long)]
        rectified: Option<PathBuf>,

        /// Write the source photo with the quad overlay here (PNG).
        #[arg(long)]
        annotated: Option<PathBuf>,

        /// Emit the report as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = fenlens::core::init_with_level(level);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Detect {
            image,
            rectified,
            annotated,
            json,
        } => {
            let decoded = ImageReader::open(&image)?.decode()?;
            let gray = decoded.to_luma8();

            let pipeline = FenPipeline::new(PipelineParams::default());
            let extraction = pipeline.extract_board(&gray)?;

            if json {
                let report = serde_json::json!({
                    "source": extraction.source,
                    "quad": extraction.quad,
                    "geometry": extraction.geometry,
                    "source_crop": extraction.rectified.source_crop,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("strategy: {:?}", extraction.source);
                for (name, p) in ["TL", "TR", "BR", "BL"]
                    .iter()
                    .zip(extraction.quad.corners.iter())
                {
                    println!("{name}: ({:.1}, {:.1})", p.x, p.y);
                }
                println!(
                    "board: {:.0}x{:.0}px, ratios {:.2}/{:.2}",
                    extraction.geometry.avg_width,
                    extraction.geometry.avg_height,
                    extraction.geometry.width_ratio,
                    extraction.geometry.height_ratio
                );
                println!("quality: {:.0}/100", extraction.geometry.quality.total);
                println!("canonical size: {}px", extraction.geometry.output_size);
            }

            if let Some(path) = rectified {
                let png = fenlens::encode_gray_png(&extraction.rectified.image)?;
                std::fs::write(&path, png)?;
                eprintln!("wrote rectified board to {}", path.display());
            }

            if let Some(path) = annotated {
                let overlay = annotate_detection(&decoded.to_rgb8(), &extraction.quad);
                overlay.save(&path)?;
                eprintln!("wrote annotated photo to {}", path.display());
            }

            Ok(())
        }
    }
}
