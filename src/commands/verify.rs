//! ## Check command
//!
//! Runs the whole pipeline for its diagnostics and throws the output away.
//! When stdout is not the console the source is piped through unchanged, so
//! `check` can sit between nodes in a pipeline.

use colored::Colorize;
use crate::lang::compiler::Compiler;
use crate::STDRESULT;

pub fn check(cmd: &clap::ArgMatches) -> STDRESULT {
    let program = super::get_program(cmd)?;
    let libraries = super::get_libraries(cmd)?;
    let settings = super::get_settings(cmd)?;
    let mut compiler = Compiler::new();
    compiler.set_config(settings);
    match compiler.compile(&program,&libraries) {
        Ok(blocks) => {
            eprintln!("\u{2713} {} ({} blocks)","Passing".green(),blocks.len());
            if !atty::is(atty::Stream::Stdout) {
                // if not the console, pipe the code to the next node
                println!("{}",program);
            }
            Ok(())
        },
        Err(e) => {
            eprintln!("\u{2717} {}",e.to_string().red());
            Err(e)
        }
    }
}
