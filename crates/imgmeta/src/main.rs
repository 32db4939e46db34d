//! imgmeta CLI - tag and caption a batch of images into a CSV file.
//!
//! Every image is downscaled in place, labelled by Google Cloud Vision and
//! captioned by Astica. One row per image lands in `image_metadata.csv`.
//!
//! # Usage
//!
//! ```bash
//! # Prompt for a file or directory
//! imgmeta
//!
//! # Process a directory non-interactively
//! imgmeta process ./photos/ --output photos.csv
//!
//! # Process whatever was dropped into an upload directory
//! imgmeta process --upload-dir ./incoming
//!
//! # View configuration
//! imgmeta config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// imgmeta - tag and caption images into a CSV file.
#[derive(Parser, Debug)]
#[command(name = "imgmeta")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize, tag and describe images, then write the CSV
    Process(cli::process::ProcessArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Credentials may live in a .env next to the images.
    dotenv::dotenv().ok();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match imgmeta_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `imgmeta config path`."
            );
            imgmeta_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("imgmeta v{}", imgmeta_core::VERSION);

    match cli.command {
        Some(Commands::Process(args)) => cli::process::execute(args, config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None => cli::interactive::run(config).await,
    }
}
