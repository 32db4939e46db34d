//! Dialoguer theme and banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with cyan prompts, green success and red error markers.
pub fn imgmeta_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the version banner to stderr.
pub fn print_banner() {
    let lines = banner_lines(imgmeta_core::VERSION);
    let cyan = Style::new().for_stderr().cyan();

    eprintln!();
    for line in &lines {
        eprintln!("{}", cyan.apply_to(line));
    }
    eprintln!();
}

fn banner_lines(version: &str) -> [String; 4] {
    let version_line = format!("imgmeta v{version}");
    let tagline = "Image tags and captions to CSV";
    let inner_width = tagline.len() + 4;

    [
        format!("  ╔{:═<width$}╗", "", width = inner_width),
        format!("  ║{:^width$}║", version_line, width = inner_width),
        format!("  ║{:^width$}║", tagline, width = inner_width),
        format!("  ╚{:═<width$}╝", "", width = inner_width),
    ]
}
