mod commands;
mod terminal;

use std::process::ExitCode;

use tracing::error;

use commands::{CommandLine, Commands, plan, scan};
use terminal::{logging, print};

fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    let result = match &commands.command {
        Commands::Plan { unit, .. } => {
            print::header("planning scan units");
            plan::plan(unit, &commands.config())
        }
        Commands::Scan {
            unit,
            classification,
            ..
        } => {
            print::header("starting scanner");
            scan::scan(unit, classification.as_deref(), &commands.config())
        }
    };

    match result {
        Ok(()) => {
            print::rule();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
