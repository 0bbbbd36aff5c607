//! Colorizer CLI - colorize grayscale photographs.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use colorizer::image::{encode, open, DirectorySink, ImageSink, OutputFormat};
use colorizer::{Colorizer, Config};

/// File name used when no output path is given.
const DEFAULT_OUTPUT_NAME: &str = "output.jpg";

/// Colorize a grayscale photograph with a Lab pix2pix model.
#[derive(Parser, Debug)]
#[command(name = "colorizer")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output image path. Defaults to output.jpg in the Pictures directory.
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// ONNX model file. Defaults to the cached model.
    #[arg(short, long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// URL to download the model from when it is not cached.
    #[arg(long, value_name = "URL")]
    model_url: Option<String>,

    /// Inference worker threads.
    #[arg(short, long, default_value = "4", value_name = "INT")]
    threads: usize,

    /// Output JPEG quality (1-100).
    #[arg(short, long, default_value = "100", value_name = "INT")]
    quality: u8,

    /// Resize the 256x256 result back to the input dimensions.
    #[arg(long)]
    keep_size: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("colorizer={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let config = Config {
        model_path: args.model.clone(),
        model_url: args.model_url.clone(),
        intra_threads: args.threads,
        output_quality: args.quality,
        restore_dimensions: args.keep_size,
    };

    let mut colorizer = Colorizer::new(config).context("Failed to initialize colorizer")?;

    let location = if let Some(output) = &args.output {
        colorizer
            .process(&args.input, output)
            .context("Failed to colorize image")?;
        output.clone()
    } else {
        save_to_pictures(&mut colorizer, args)?
    };

    println!(
        "Successfully colorized {} -> {}",
        args.input.display(),
        location.display()
    );

    Ok(())
}

/// Colorize the input and store it as a JPEG in the Pictures directory.
fn save_to_pictures(colorizer: &mut Colorizer, args: &Args) -> Result<PathBuf> {
    let input = open(&args.input)?;
    let colorized = colorizer
        .colorize_for_output(&input)
        .context("Failed to colorize image")?;

    let bytes = encode(&colorized, OutputFormat::Jpeg, colorizer.config().output_quality)?;
    let sink = DirectorySink::pictures().context("Failed to open Pictures directory")?;

    Ok(sink.save(&bytes, DEFAULT_OUTPUT_NAME)?)
}
