//! journal-scan - Batch recognition for scanned journal pages
//!
//! CLI entry point

use clap::Parser;
use std::time::Duration;

use journal_scan::{
    exit_codes,
    Annotator, Assists, BatchDriver, BatchError, Cli, Config, ConsoleSink, EntryError,
    HttpCorrector, HttpLanguageDetector, HttpRecognizer, HttpTranslator,
};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Load config file if specified, otherwise search the default paths
    let config = match &cli.config {
        Some(config_path) => match Config::load_from_path(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::CONFIG_ERROR;
            }
        },
        // A missing file on the search path is fine (defaults apply), but a
        // file that exists and fails to parse is fatal.
        None => match Config::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::CONFIG_ERROR;
            }
        },
    };

    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        return exit_codes::CONFIG_ERROR;
    }

    // Merge config file with CLI arguments (CLI takes precedence)
    let options = config.merge_with_cli(&cli.overrides());
    let timeout = Duration::from_secs(options.timeout_secs);

    let discovered = match journal_scan::entries::discover(&cli.input) {
        Ok(discovered) => discovered,
        Err(e @ EntryError::InputNotFound(_)) => {
            eprintln!("{}", e);
            return exit_codes::INPUT_NOT_FOUND;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::GENERAL_ERROR;
        }
    };

    // validate() guarantees endpoint and key are present
    let (Some(endpoint), Some(key)) = (&config.recognition.endpoint, &config.recognition.key)
    else {
        eprintln!("{}", journal_scan::ConfigError::MissingRecognitionService);
        return exit_codes::CONFIG_ERROR;
    };
    let recognizer = match HttpRecognizer::new(endpoint, key, options.mode, timeout) {
        Ok(recognizer) => recognizer,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::GENERAL_ERROR;
        }
    };

    let assists = match build_assists(&config, timeout) {
        Ok(assists) => assists,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::GENERAL_ERROR;
        }
    };

    let mut annotator = Annotator::new(options.jpeg_quality);
    if options.save_images && options.verbose {
        if let Some(font_path) = &config.annotation.font_path {
            match Annotator::load_font(font_path) {
                Ok(font) => annotator = annotator.with_font(font),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return exit_codes::CONFIG_ERROR;
                }
            }
        }
    }

    let driver = BatchDriver::new(&options, &recognizer, &assists, &annotator);
    let mut console = ConsoleSink::new();

    // Page failures are reported inside the run and do not change the exit
    // code; only broken output machinery does.
    match driver.run(&discovered, &mut console) {
        Ok(_) => exit_codes::SUCCESS,
        Err(e @ BatchError::OutputDir { .. }) => {
            eprintln!("Error: {}", e);
            exit_codes::OUTPUT_ERROR
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::OUTPUT_ERROR
        }
    }
}

/// Build the optional collaborators from their config sections
///
/// A collaborator is created only when its section carries both endpoint
/// and key.
fn build_assists(config: &Config, timeout: Duration) -> Result<Assists, journal_scan::AssistError> {
    let mut assists = Assists::none();

    if let Some((endpoint, key)) = config.detection.credentials() {
        assists.detector = Some(Box::new(HttpLanguageDetector::new(endpoint, key, timeout)?));
    }
    if let Some((endpoint, key)) = config.translation.credentials() {
        assists.translator = Some(Box::new(HttpTranslator::new(endpoint, key, timeout)?));
    }
    if let Some((endpoint, key)) = config.correction.credentials() {
        assists.corrector = Some(Box::new(HttpCorrector::new(endpoint, key, timeout)?));
    }

    Ok(assists)
}
