//! `pixelprep` CLI - Run a preprocessing pipeline over images.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelprep::image::save_image;
use pixelprep::{Pipeline, PipelineConfig, TensorShape};

/// Turn images into model-ready float tensors.
#[derive(Parser, Debug)]
#[command(name = "pixelprep")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image or directory of images.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Pipeline configuration (JSON). Without it images are only flattened.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the output tensors, written as `<name>.json`.
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output: PathBuf,

    /// Also save the result of the image stages, with this extension (e.g. png, jpg).
    #[arg(long, value_name = "EXT")]
    save_images: Option<String>,

    /// JPEG quality for saved images (1-100).
    #[arg(short, long, default_value = "95", value_name = "INT")]
    quality: u8,

    /// Print the effective pipeline configuration and exit.
    #[arg(long)]
    print_config: bool,

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
                .unwrap_or_else(|_| format!("pixelprep={log_level}").into()),
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
    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to read pipeline config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if args.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    if !(1..=100).contains(&args.quality) {
        anyhow::bail!("Quality must be between 1 and 100, got {}", args.quality);
    }

    let pipeline = config.build().context("Failed to build pipeline")?;
    match pipeline.output_shape(&TensorShape::unknown(3)) {
        Ok(shape) => tracing::info!("Output shape: {shape}"),
        Err(err) => tracing::debug!("Output shape depends on the input: {err}"),
    }

    let inputs = collect_inputs(&args.input)?;
    if inputs.is_empty() {
        anyhow::bail!("No images found in {}", args.input.display());
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Processing [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    if inputs.len() == 1 {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let mut failures = 0usize;
    for input in &inputs {
        pb.set_message(display_name(input));
        if let Err(err) = process(&pipeline, input, args) {
            pb.suspend(|| tracing::error!("{}: {err:#}", input.display()));
            failures += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if failures > 0 {
        anyhow::bail!("{failures} of {} images failed", inputs.len());
    }

    println!(
        "Successfully processed {} image(s) -> {}",
        inputs.len(),
        args.output.display()
    );
    Ok(())
}

/// A single file, or every decodable image directly inside a directory.
fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        anyhow::bail!("Input does not exist: {}", input.display());
    }
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in
        fs::read_dir(input).with_context(|| format!("Failed to list {}", input.display()))?
    {
        let path = entry?.path();
        if path.is_file() && image::ImageFormat::from_path(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn process(pipeline: &Pipeline, input: &Path, args: &Args) -> Result<()> {
    let stem = input
        .file_stem()
        .with_context(|| format!("No file name in {}", input.display()))?
        .to_string_lossy();

    let image = pixelprep::image::load_image(input)?;

    let tensor = match &args.save_images {
        Some(ext) => {
            let processed = pipeline.apply_image_stages(&image)?;
            let path = args.output.join(format!("{stem}.{ext}"));
            save_image(&processed, &path, args.quality)?;
            tracing::debug!("Saved image stages output to {}", path.display());
            pipeline.flatten(&processed)?
        }
        None => pipeline.apply(&image)?,
    };
    let path = args.output.join(format!("{stem}.json"));
    let json = serde_json::to_string(&tensor)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(
        "Wrote {} values with shape {} to {}",
        tensor.data.len(),
        tensor.shape,
        path.display()
    );

    Ok(())
}
