//! D2 parse CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use d2_cli::{Args, error_adapter::to_reportables};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?, files = args.inputs.len(); "Starting d2-parse");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = d2_cli::run(&args) {
        let reporter = miette::GraphicalReportHandler::new();
        let reportables = to_reportables(&err);

        for reportable in &reportables {
            let mut writer = String::new();
            reporter
                .render_report(&mut writer, reportable)
                .expect("Writing to String buffer is infallible");

            error!("{writer}");
        }

        let exit_code = err.exit_code();
        error!(reported = reportables.len(), exit_code; "Parsing failed");
        process::exit(exit_code);
    }

    info!(files = args.inputs.len(); "All files parsed without diagnostics");
}
