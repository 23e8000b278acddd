//! # Command Line Interface
//!
//! Dispatch commands to `commands` module.

use env_logger;
#[cfg(windows)]
use colored;
use ropkit::commands;
use ropkit::commands::CommandError;
mod cli;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).unwrap();

    let main_cmd = cli::build_cli();
    let matches = main_cmd.get_matches();

    // Completions

    if let Some(cmd) = matches.subcommand_matches("completions") {
        return commands::completions::generate(cli::build_cli(),cmd);
    }

    // Compile a program

    if let Some(cmd) = matches.subcommand_matches("compile") {
        return commands::compile::compile(cmd);
    }

    // Check a program without emitting

    if let Some(cmd) = matches.subcommand_matches("check") {
        return commands::verify::check(cmd);
    }

    log::error!("No subcommand was found, try `ropkit --help`");
    return Err(Box::new(CommandError::InvalidCommand));
}
