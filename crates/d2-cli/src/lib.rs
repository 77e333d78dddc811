//! CLI logic for the D2 parse tool.
//!
//! Reads D2 files, parses them and reports every diagnostic. With `--json`
//! the parsed tree of each file is written to stdout.

pub mod error_adapter;

mod args;
mod config;
mod error;

pub use args::Args;
pub use config::{AppConfig, ConfigError};
pub use error::CliError;

use std::{
    fs,
    io::{self, Write},
};

use log::{info, warn};

use d2_parser::ParseOptions;

/// Run the D2 parse CLI application
///
/// Each input file is parsed with the options from the configuration file,
/// overridden by any options given on the command line. Parsing stops at
/// the first file that produced diagnostics.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Syntax errors in an input file
/// - JSON output errors
pub fn run(args: &Args) -> Result<(), CliError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let options = parse_options(args, app_config);

    for input in &args.inputs {
        info!(input_path = input, utf16 = options.utf16; "Parsing file");

        let source = fs::read_to_string(input)?;
        let output = d2_parser::parse_str(input.as_str(), &source, &options);

        if args.json {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, output.map())?;
            writeln!(stdout)?;
        }

        let nodes = output.map().nodes.len();
        if let Err(err) = output.into_result() {
            warn!(input_path = input, diagnostics = err.iter().count(); "File has syntax errors");
            return Err(CliError::new_parse_error(err, source, options.utf16));
        }

        info!(input_path = input, nodes; "File parsed successfully");
    }

    Ok(())
}

/// Merge command-line overrides into the configured parser options.
fn parse_options(args: &Args, app_config: AppConfig) -> ParseOptions {
    let mut options = app_config.parser;
    options.utf16 |= args.utf16;
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            inputs: vec!["a.d2".to_string()],
            config: None,
            utf16: false,
            max_depth: None,
            json: false,
            log_level: "off".to_string(),
        }
    }

    #[test]
    fn test_config_options_kept_without_overrides() {
        let config = AppConfig {
            parser: ParseOptions {
                utf16: true,
                max_depth: 7,
            },
        };

        let options = parse_options(&args(), config.clone());
        assert_eq!(options, config.parser);
    }

    #[test]
    fn test_command_line_overrides() {
        let args = Args {
            utf16: true,
            max_depth: Some(3),
            ..args()
        };

        let options = parse_options(&args, AppConfig::default());
        assert!(options.utf16);
        assert_eq!(options.max_depth, 3);
    }
}
