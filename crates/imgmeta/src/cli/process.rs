//! The `imgmeta process` command.

use anyhow::Context;
use clap::Args;
use console::Style;
use imgmeta_core::config::InputMode;
use imgmeta_core::input::source_for;
use imgmeta_core::{
    export_csv, AsticaClient, Config, Credentials, MetadataPipeline, ProcessedImage,
    VisionClient,
};
use std::path::PathBuf;

use super::interactive;

/// Scratch directory (under the working directory) for staged uploads.
const STAGING_DIR: &str = ".imgmeta-uploads";

/// Arguments for the `process` command.
#[derive(Args, Debug, Default)]
pub struct ProcessArgs {
    /// Image file or directory to process (prompted for when omitted)
    pub input: Option<PathBuf>,

    /// Take images from this upload directory instead of a local path
    #[arg(long, conflicts_with = "input")]
    pub upload_dir: Option<PathBuf>,

    /// CSV file to write (defaults to output.csv_path from the config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args);
    config.validate()?;

    tracing::info!("Starting image metadata generation");

    let credentials = Credentials::from_env(&config).context(
        "Google Cloud credentials setup failed. Exiting, as Google Vision is essential",
    )?;

    let input = match (config.input.mode, args.input) {
        (InputMode::Filesystem, None) => match interactive::prompt_input_path()? {
            Some(path) => Some(path),
            None => return Ok(()),
        },
        (_, input) => input,
    };

    let staging_dir = std::env::current_dir()?.join(STAGING_DIR);
    let mut source = source_for(&config, input, staging_dir)?;
    tracing::info!("Reading images from {}", source.describe());

    let paths = source
        .acquire()
        .with_context(|| format!("Cannot read images from {}", source.describe()))?;
    if paths.is_empty() {
        tracing::info!("No compatible image files found in {}", source.describe());
        return Ok(());
    }
    tracing::info!("Found {} image(s) to process", paths.len());

    let tagger = VisionClient::from_key_file(&config.vision, &credentials.vision_key_path)?;
    let describer = AsticaClient::with_api_key(&config.describe, credentials.astica_api_key);
    let pipeline = MetadataPipeline::new(&config, Box::new(tagger), Box::new(describer));

    let start = std::time::Instant::now();
    let records = pipeline.run(&paths, print_summary).await;

    let csv_path = config.csv_path();
    match export_csv(&csv_path, &records) {
        Ok(Some(path)) => println!("\nMetadata successfully saved to {}", path.display()),
        Ok(None) => {
            tracing::info!("No images were processed, so no metadata CSV was generated")
        }
        Err(e) => tracing::error!("Error writing CSV file '{}': {e}", csv_path.display()),
    }

    tracing::info!(
        "Processed {} image(s) in {:.1}s",
        records.len(),
        start.elapsed().as_secs_f64()
    );

    source.cleanup();
    Ok(())
}

/// Fold CLI flags into the loaded configuration.
fn apply_overrides(config: &mut Config, args: &ProcessArgs) {
    if let Some(dir) = &args.upload_dir {
        config.input.mode = InputMode::Upload;
        config.input.upload_dir = Some(dir.display().to_string());
    }
    if let Some(output) = &args.output {
        config.output.csv_path = output.display().to_string();
    }
}

fn print_summary(image: &ProcessedImage) {
    let ok = Style::new().green();
    let warn = Style::new().yellow();
    let bold = Style::new().bold();

    let mark = if image.tags.is_failure() || image.description.is_failure() {
        warn.apply_to("!")
    } else {
        ok.apply_to("✓")
    };
    println!("{} {}", mark, bold.apply_to(summary_heading(image)));
    for line in summary_details(image) {
        println!("  {line}");
    }
}

fn summary_heading(image: &ProcessedImage) -> String {
    format!("Finished processing {}.", image.filename)
}

fn summary_details(image: &ProcessedImage) -> [String; 2] {
    [
        format!("Description: {}", image.description),
        format!("Tags: {}", image.tags),
    ]
}
