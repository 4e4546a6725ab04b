use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use bokeh_core::blurring::domain::boundary_policy::BoundaryPolicy;
use bokeh_core::blurring::infrastructure::engine_factory::ContributionVariant;
use bokeh_core::pipeline::blur_settings::BlurSettings;
use bokeh_core::pipeline::bokeh_image_use_case::BokehImageUseCase;
use bokeh_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use bokeh_core::shared::constants::IMAGE_EXTENSIONS;
use bokeh_core::storage::infrastructure::image_file_reader::ImageFileReader;
use bokeh_core::storage::infrastructure::image_file_writer::ImageFileWriter;

/// Mask-driven bokeh blur for images.
#[derive(Parser)]
#[command(name = "bokeh")]
struct Cli {
    /// Source image (8- or 16-bit).
    input: PathBuf,

    /// Grayscale mask with the same dimensions as the source.
    mask: PathBuf,

    /// Output image; format follows the extension.
    output: PathBuf,

    /// JSON settings file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Out-of-range handling for shifted reads: wrap or clip.
    #[arg(long)]
    boundary: Option<String>,

    /// Contribution variant: direct or halved.
    #[arg(long)]
    variant: Option<String>,

    /// Multiplier on mask luminance for the direct variant (0.0-1.0].
    #[arg(long)]
    weight_scale: Option<f64>,

    /// Row worker threads (default: all cores).
    #[arg(long)]
    workers: Option<usize>,

    /// Write the accumulator after every mask sample into this directory.
    #[arg(long)]
    debug_frames: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let base = match &cli.config {
        Some(path) => BlurSettings::load(path)?,
        None => BlurSettings::default(),
    };
    let settings = apply_overrides(base, &cli)?;
    settings.validate()?;

    let mut use_case = BokehImageUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        settings,
        Box::new(StdoutPipelineLogger::default()),
        None,
        None,
    );
    use_case.execute(&cli.input, &cli.mask, &cli.output)?;
    log::info!("Output written to {}", cli.output.display());
    Ok(())
}

fn apply_overrides(
    mut settings: BlurSettings,
    cli: &Cli,
) -> Result<BlurSettings, Box<dyn std::error::Error>> {
    if let Some(boundary) = &cli.boundary {
        settings.boundary = boundary.parse::<BoundaryPolicy>()?;
    }
    if let Some(variant) = &cli.variant {
        settings.variant = variant.parse::<ContributionVariant>()?;
    }
    if let Some(weight_scale) = cli.weight_scale {
        settings.weight_scale = weight_scale;
    }
    if cli.workers.is_some() {
        settings.workers = cli.workers;
    }
    if cli.debug_frames.is_some() {
        settings.debug_frames = cli.debug_frames.clone();
    }
    Ok(settings)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !cli.mask.exists() {
        return Err(format!("Mask file not found: {}", cli.mask.display()).into());
    }
    if !is_image(&cli.output) {
        return Err(format!(
            "Output must have an image extension ({}), got {}",
            IMAGE_EXTENSIONS.join(", "),
            cli.output.display()
        )
        .into());
    }
    if let Some(config) = &cli.config {
        if !config.exists() {
            return Err(format!("Config file not found: {}", config.display()).into());
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
