//! Interactive entry for bare `imgmeta` invocation.
//!
//! Shows a banner and a short settings summary, asks for the image path and
//! hands over to the same flow as `imgmeta process`.

pub mod theme;

use console::Style;
use dialoguer::Input;
use imgmeta_core::config::{expand_path, InputMode};
use imgmeta_core::Config;
use std::path::PathBuf;

use super::process::{self, ProcessArgs};

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Entry point for interactive mode.
pub async fn run(config: Config) -> anyhow::Result<()> {
    theme::print_banner();
    print_settings(&config);
    process::execute(ProcessArgs::default(), config).await
}

/// Ask for a file or directory. `None` when the user interrupts.
pub fn prompt_input_path() -> anyhow::Result<Option<PathBuf>> {
    let theme = theme::imgmeta_theme();
    let raw = handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Path to a directory of images or a single image file")
            .interact_text(),
    )?;
    Ok(raw.map(|raw| parse_input_path(&raw)))
}

fn parse_input_path(raw: &str) -> PathBuf {
    expand_path(raw.trim())
}

fn print_settings(config: &Config) {
    let dim = Style::new().for_stderr().dim();
    let label = Style::new().for_stderr().bold();

    let source = match config.input.mode {
        InputMode::Filesystem => "local path".to_string(),
        InputMode::Upload => format!(
            "uploads in {}",
            config
                .upload_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        ),
    };

    eprintln!(
        "    {:<14} {}",
        label.apply_to("Input:"),
        dim.apply_to(source)
    );
    eprintln!(
        "    {:<14} {}",
        label.apply_to("Max width:"),
        dim.apply_to(format!("{}px", config.normalize.max_width))
    );
    eprintln!(
        "    {:<14} {}",
        label.apply_to("Output:"),
        dim.apply_to(config.csv_path().display())
    );
    eprintln!();
}
