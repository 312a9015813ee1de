// ============================================================================
// Canny Playground CLI — headless single-image edge map
// ============================================================================
//
// Usage examples:
//   canny-playground --input photo.png
//   canny-playground -i photo.jpg -o edges.png --low 40 --high 120
//   canny-playground -i scan.tif --blur 1.4 --verbose
//
// No window is opened.  The same pipeline the GUI uses runs here: the engine
// is loaded, the image is loaded, and the card is settled before the result
// surface is written out.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use crate::canny::CannyEngine;
use crate::pipeline::{EdgeCard, EngineState, FileInput, ImageOrigin, PipelineError};
use crate::settings::AppSettings;

/// Canny Playground headless edge detector.
#[derive(Parser, Debug)]
#[command(
    name = "canny-playground",
    about = "Compute a Canny edge map for one image without opening the GUI",
    long_about = "Loads one image, runs the Canny edge engine with the given\n\
                  thresholds, and writes the edge map as PNG.\n\n\
                  Example:\n  \
                  canny-playground --input photo.png --low 40 --high 120"
)]
pub struct CliArgs {
    /// Input image (PNG, JPEG, WEBP, BMP, TGA, ICO, TIFF, GIF).
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output PNG path.  Defaults to `<stem>_edges.png` next to the input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Low hysteresis threshold (clamped to 0..high-1).
    #[arg(long, value_name = "0-254")]
    pub low: Option<i32>,

    /// High hysteresis threshold (clamped to low+1..255).
    #[arg(long, value_name = "1-255")]
    pub high: Option<i32>,

    /// Gaussian pre-blur sigma (0 disables).
    #[arg(long, value_name = "SIGMA")]
    pub blur: Option<f32>,

    /// Print thresholds and timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when the process arguments ask for headless mode.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i")
    }
}

/// Run headless processing and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    let settings = AppSettings::load();
    let Some(output) = build_output_path(&args.input, args.output.as_deref()) else {
        eprintln!(
            "error: cannot determine output path for '{}'.",
            args.input.display()
        );
        return ExitCode::FAILURE;
    };

    let start = Instant::now();
    match run_one(&args, &settings, &output) {
        Ok(()) => {
            if args.verbose {
                println!(
                    "  → {} ({:.0}ms)",
                    output.display(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_one(args: &CliArgs, settings: &AppSettings, output: &Path) -> Result<(), String> {
    let sigma = args.blur.unwrap_or(settings.pre_blur_sigma);
    let mut card = EdgeCard::new(
        Arc::new(CannyEngine::new(sigma)),
        settings.initial_params(),
    );

    // Apply high first so a requested low above the default high is not clamped early.
    if let Some(high) = args.high {
        let committed = card.set_high(high);
        if committed as i32 != high {
            eprintln!("warning: --high {} clamped to {}", high, committed);
        }
    }
    if let Some(low) = args.low {
        let committed = card.set_low(low);
        if committed as i32 != low {
            eprintln!("warning: --low {} clamped to {}", low, committed);
        }
    }

    card.start();
    card.load_files(ImageOrigin::CommandLine, vec![FileInput::Path(args.input.clone())])
        .map_err(|e| format!("load failed: {}", e))?;
    card.settle();

    if card.engine_state() != EngineState::Ready {
        return Err(card
            .error_message()
            .unwrap_or_else(|| "edge engine did not become ready".to_string()));
    }
    if let Some(err @ PipelineError::EngineInvocationFailed(_)) = card.error() {
        return Err(err.to_string());
    }

    if args.verbose {
        let p = card.params();
        println!(
            "[1/1] {} (low {}, high {}, blur {})",
            args.input.display(),
            p.low(),
            p.high(),
            sigma
        );
    }

    let result = card
        .surfaces()
        .result
        .snapshot()
        .ok_or_else(|| "no edge map was produced".to_string())?;
    result
        .to_rgba_image()
        .save_with_format(output, image::ImageFormat::Png)
        .map_err(|e| format!("save failed: {}", e))?;

    card.teardown();
    Ok(())
}

/// Compute the output path.
///
/// 1. `--output` when given
/// 2. otherwise `<stem>_edges.png` beside the input (never the input itself)
fn build_output_path(input: &Path, output: Option<&Path>) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }
    let stem = input.file_stem()?.to_string_lossy().into_owned();
    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}_edges.png", stem));
    if candidate == input {
        Some(parent.join(format!("{}_edges_out.png", stem)))
    } else {
        Some(candidate)
    }
}
