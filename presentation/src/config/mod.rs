//! Presentation-level configuration
//!
//! Resolves how reports are shown from the command line and the
//! `[output]` section of the config file.

use crowdcontrol_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress bars while scoring
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Command-line flags win over the config file
    pub fn resolve(
        cli_format: Option<OutputFormat>,
        file_format: Option<OutputFormat>,
        file_color: bool,
        no_color: bool,
        quiet: bool,
    ) -> Self {
        let format = cli_format.or(file_format).unwrap_or_default();
        Self {
            format,
            color: file_color && !no_color,
            // No progress bars next to JSON output
            show_progress: !quiet && format != OutputFormat::Json,
        }
    }

    /// Switch terminal colors on or off for the whole process
    pub fn apply_color(&self) {
        colored::control::set_override(self.color);
    }
}
