//! nut CLI entry point.
//!
//! Parses arguments, initializes logging, runs the command and maps any
//! error to a miette report and the matching exit code.

use clap::Parser;
use nut_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    // A panic inside the command surfaces as a JoinError instead of unwinding main
    let result = match tokio::spawn(commands::execute(args.command)).await {
        Ok(result) => result,
        Err(e) => Err(error::CliError::Unexpected(e.to_string())),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", error::cli_error_to_miette(err));
        std::process::exit(code);
    }
}
