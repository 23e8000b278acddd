//! # CLI Subcommands
//!
//! Contains modules that run the subcommands.

pub mod compile;
pub mod verify;
pub mod completions;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use log::error;
use crate::DYNERR;

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand,
    #[error("One of the parameters was out of range")]
    OutOfRange,
    #[error("Block is not in the program")]
    BlockNotFound,
    #[error("File not found")]
    FileNotFound
}

/// Get the program text from `--file` if present, else from stdin.
/// Line entry is refused, these commands expect a pipe or a file.
pub fn get_program(cmd: &clap::ArgMatches) -> Result<String,DYNERR> {
    if let Some(path) = cmd.get_one::<String>("file") {
        return match std::fs::read_to_string(path) {
            Ok(s) => Ok(s),
            Err(e) => {
                error!("could not read program `{}`: {}",path,e);
                Err(Box::new(CommandError::FileNotFound))
            }
        };
    }
    if atty::is(atty::Stream::Stdin) {
        error!("line entry is not supported, please pipe something in or use `--file`");
        return Err(Box::new(CommandError::InvalidCommand));
    }
    let mut program = String::new();
    std::io::stdin().read_to_string(&mut program)?;
    if program.len()==0 {
        error!("did not receive any data from previous node");
        return Err(Box::new(CommandError::InvalidCommand));
    }
    Ok(program)
}

/// Build the library map from the repeatable `--lib` option.  Each file is
/// keyed by its base name, the name an `import` statement would use.
pub fn get_libraries(cmd: &clap::ArgMatches) -> Result<HashMap<String,String>,DYNERR> {
    let mut libraries = HashMap::new();
    if let Some(paths) = cmd.get_many::<String>("lib") {
        for path in paths {
            let key = match Path::new(path).file_name() {
                Some(os) => os.to_string_lossy().to_string(),
                None => {
                    error!("could not interpret library path `{}`",path);
                    return Err(Box::new(CommandError::FileNotFound));
                }
            };
            match std::fs::read_to_string(path) {
                Ok(text) => {
                    libraries.insert(key,text);
                },
                Err(e) => {
                    error!("could not read library `{}`: {}",path,e);
                    return Err(Box::new(CommandError::FileNotFound));
                }
            }
        }
    }
    Ok(libraries)
}

/// Parse the optional `--config` JSON into compiler settings.
pub fn get_settings(cmd: &clap::ArgMatches) -> Result<crate::lang::settings::Settings,DYNERR> {
    match cmd.get_one::<String>("config") {
        Some(json) => crate::lang::settings::parse(json),
        None => Ok(crate::lang::settings::Settings::new())
    }
}
