//! ## Compile command
//!
//! Runs the full pipeline and writes the result to stdout.  The default is
//! the JSON block map, which is also the host-glue shape: on failure a
//! single-key `{"error": …}` object is printed and the process exits nonzero.
//! With `--block` the output narrows to one block, and `--type bin` turns its
//! hex into raw bytes for piping into other tools.

use std::io::Write;
use log::error;
use super::CommandError;
use crate::lang::compiler::Compiler;
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

pub fn compile(cmd: &clap::ArgMatches) -> STDRESULT {
    let program = super::get_program(cmd)?;
    let libraries = super::get_libraries(cmd)?;
    let settings = super::get_settings(cmd)?;
    let fmt = cmd.get_one::<String>("type").expect(RCH);
    let maybe_block = cmd.get_one::<String>("block");

    let mut compiler = Compiler::new();
    compiler.set_config(settings);
    let blocks = match compiler.compile(&program,&libraries) {
        Ok(blocks) => blocks,
        Err(e) => {
            error!("{}",e);
            if fmt=="json" {
                println!("{{\"error\": {}}}",serde_json::Value::String(format!("error: {}",e)));
            }
            return Err(e);
        }
    };

    match fmt.as_str() {
        "json" => {
            let mut obj = serde_json::Map::new();
            for (name,hex) in &blocks {
                if maybe_block.is_none() || maybe_block==Some(name) {
                    obj.insert(name.clone(),serde_json::Value::String(hex.clone()));
                }
            }
            if maybe_block.is_some() && obj.len()==0 {
                error!("block `{}` is not in the program",maybe_block.expect(RCH));
                return Err(Box::new(CommandError::BlockNotFound));
            }
            println!("{}",serde_json::Value::Object(obj));
            Ok(())
        },
        "hex" => {
            let hex = get_one_block(&blocks,maybe_block)?;
            println!("{}",hex);
            Ok(())
        },
        "bin" => {
            let hex = get_one_block(&blocks,maybe_block)?;
            let bytes = hex::decode(hex)?;
            std::io::stdout().write_all(&bytes)?;
            Ok(())
        },
        _ => Err(Box::new(CommandError::InvalidCommand))
    }
}

/// `hex` and `bin` emit a single block: the one named by `--block`, or the
/// only block in the program.
fn get_one_block<'a>(blocks: &'a std::collections::BTreeMap<String,String>,maybe_block: Option<&String>) -> Result<&'a String,crate::DYNERR> {
    match maybe_block {
        Some(name) => match blocks.get(name) {
            Some(hex) => Ok(hex),
            None => {
                error!("block `{}` is not in the program",name);
                Err(Box::new(CommandError::BlockNotFound))
            }
        },
        None => {
            if blocks.len()==1 {
                return Ok(blocks.values().next().expect(RCH));
            }
            error!("program has {} blocks, select one with `--block`",blocks.len());
            Err(Box::new(CommandError::InvalidCommand))
        }
    }
}
