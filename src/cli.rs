//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

use crate::config::CliOverrides;
use crate::recognize::RecognitionMode;

/// Exit codes for the CLI
///
/// These codes follow standard Unix conventions and provide
/// specific error categories for scripting and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Batch completed (individual pages may still have failed)
    Success = 0,
    /// Unclassified error
    GeneralError = 1,
    /// Argument error
    InvalidArgs = 2,
    /// Input file or directory not found
    InputNotFound = 3,
    /// Configuration missing or unreadable
    ConfigError = 4,
    /// Output directory or log file not writable
    OutputError = 5,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input file or directory not found",
            ExitCode::ConfigError => "Configuration missing or invalid",
            ExitCode::OutputError => "Output error (permission denied, disk full, etc.)",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

/// Batch recognition for scanned journal pages
#[derive(Parser, Debug)]
#[command(name = "journal-scan")]
#[command(version)]
#[command(about = "Batch recognition for scanned journal pages", long_about = None)]
pub struct Cli {
    /// Image directory or JSON manifest
    #[arg(default_value = "images")]
    pub input: PathBuf,

    /// Write annotated page images (requires --verbose)
    #[arg(long)]
    pub save_images: bool,

    /// Emit extra diagnostic lines
    #[arg(short, long)]
    pub verbose: bool,

    /// Run translated sentences through the correction service
    #[arg(long)]
    pub correct_translations: bool,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Binder gutter width in pixels, excluded from both split halves
    #[arg(long)]
    pub gutter: Option<u32>,

    /// JPEG quality for recognition requests and annotated output (1-100)
    #[arg(long)]
    pub quality: Option<u8>,

    /// Recognition response shape: tags or text
    #[arg(long)]
    pub mode: Option<RecognitionMode>,
}

impl Cli {
    /// Overrides to merge over the configuration file
    ///
    /// Boolean flags override only when given, so a flag left at its default
    /// never masks a `true` from the file.
    pub fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides::new();
        if self.save_images {
            overrides = overrides.with_save_images(true);
        }
        if self.verbose {
            overrides = overrides.with_verbose(true);
        }
        if self.correct_translations {
            overrides = overrides.with_correct_translations(true);
        }
        if let Some(gutter) = self.gutter {
            overrides = overrides.with_gutter_width(gutter);
        }
        if let Some(quality) = self.quality {
            overrides = overrides.with_quality(quality);
        }
        if let Some(mode) = self.mode {
            overrides = overrides.with_mode(mode);
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        // Verify CLI can be built
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_display() {
        let mut cmd = Cli::command();
        let help = cmd.render_help().to_string();
        assert!(help.contains("journal-scan"));
        assert!(help.contains("--save-images"));
    }

    #[test]
    fn test_version_display() {
        let cmd = Cli::command();
        let version = cmd.get_version().unwrap_or("unknown");
        assert!(!version.is_empty());
    }

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["journal-scan"]).unwrap();

        assert_eq!(cli.input, PathBuf::from("images"));
        assert!(!cli.save_images);
        assert!(!cli.verbose);
        assert!(!cli.correct_translations);
        assert!(cli.config.is_none());
        assert!(cli.gutter.is_none());
        assert!(cli.quality.is_none());
        assert!(cli.mode.is_none());
    }

    #[test]
    fn test_option_parsing() {
        let cli = Cli::try_parse_from([
            "journal-scan",
            "scans",
            "--save-images",
            "-v",
            "--correct-translations",
            "--gutter",
            "12",
            "--quality",
            "85",
            "--mode",
            "text",
        ])
        .unwrap();

        assert_eq!(cli.input, PathBuf::from("scans"));
        assert!(cli.save_images);
        assert!(cli.verbose);
        assert!(cli.correct_translations);
        assert_eq!(cli.gutter, Some(12));
        assert_eq!(cli.quality, Some(85));
        assert_eq!(cli.mode, Some(RecognitionMode::Text));
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result = Cli::try_parse_from(["journal-scan", "--mode", "everything"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_only_set_when_given() {
        let cli = Cli::try_parse_from(["journal-scan"]).unwrap();
        let overrides = cli.overrides();

        assert!(overrides.save_images.is_none());
        assert!(overrides.verbose.is_none());
        assert!(overrides.correct_translations.is_none());
        assert!(overrides.gutter_width.is_none());
        assert!(overrides.quality.is_none());
        assert!(overrides.mode.is_none());
    }

    #[test]
    fn test_overrides_carry_given_flags() {
        let cli =
            Cli::try_parse_from(["journal-scan", "--save-images", "--gutter", "8"]).unwrap();
        let overrides = cli.overrides();

        assert_eq!(overrides.save_images, Some(true));
        assert_eq!(overrides.gutter_width, Some(8));
        assert!(overrides.verbose.is_none());
    }

    #[test]
    fn test_config_path_parsing() {
        let cli =
            Cli::try_parse_from(["journal-scan", "--config", "/etc/journal-scan.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/journal-scan.toml")));
    }

    // Exit code tests
    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::GeneralError.code(), 1);
        assert_eq!(ExitCode::InvalidArgs.code(), 2);
        assert_eq!(ExitCode::InputNotFound.code(), 3);
        assert_eq!(ExitCode::ConfigError.code(), 4);
        assert_eq!(ExitCode::OutputError.code(), 5);
    }

    #[test]
    fn test_exit_code_descriptions() {
        assert_eq!(ExitCode::Success.description(), "Success");
        assert!(!ExitCode::GeneralError.description().is_empty());
        assert!(!ExitCode::InvalidArgs.description().is_empty());
        assert!(!ExitCode::InputNotFound.description().is_empty());
        assert!(!ExitCode::ConfigError.description().is_empty());
        assert!(!ExitCode::OutputError.description().is_empty());
    }

    #[test]
    fn test_exit_code_into_i32() {
        let code: i32 = ExitCode::Success.into();
        assert_eq!(code, 0);

        let code: i32 = ExitCode::OutputError.into();
        assert_eq!(code, 5);
    }

    #[test]
    fn test_exit_code_equality() {
        assert_eq!(ExitCode::Success, ExitCode::Success);
        assert_ne!(ExitCode::Success, ExitCode::GeneralError);
    }

    #[test]
    fn test_exit_code_clone_copy() {
        let code = ExitCode::ConfigError;
        let cloned = code.clone();
        let copied = code;
        assert_eq!(code, cloned);
        assert_eq!(code, copied);
    }
}
