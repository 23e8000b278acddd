//! # `ropkit` main library
//!
//! This library compiles a domain-specific source language for Return-Oriented-Programming
//! (ROP) payload construction into hexadecimal byte-code strings, one per named output block.
//! The dialect mixes literal hex bytes with user-defined expansions, an import system for
//! library modules, address labels, arithmetic and endian expressions over addresses, and
//! in-place patching directives.
//!
//! ## Architecture
//!
//! Compilation is a linear pipeline over a single program text, housed in the `lang` module:
//! * `lang::preprocessor` collects definitions and named blocks, loading imported modules
//! * `lang::expander` rewrites each block body to a fixed point, expanding macro calls
//! * `lang::address` streams the expanded bytes once to assign every label an address
//! * `lang::emitter` streams them again with real label values and applies overwrite patches
//!
//! The driver in `lang::compiler` owns the definition tables and the block map and runs the
//! passes in order.  Each pass re-parses the block text with its own grammar; the grammars
//! share one token surface (`$`, `*`, `!`, hex pairs, `@` directives) provided by
//! `lang::scanner`.
//!
//! ## Source Language
//!
//! Three definition forms share a program with named blocks:
//! ```text
//! import gadgets.rop
//! def $ret { c3 }
//! def *push(v) { 68 [<%_v_%>] }
//! def !times2(){%%BODY%%} { %%BODY%% %%BODY%% }
//! @block.stage1:
//!     @offset=4000 @adr.start
//!     $ret *push(dead) !times2(){ 90 }
//!     [#start]
//! @blockend
//! ```
//! Constants (`$`), simple macros (`*`), and body-taking macros (`!`) occupy disjoint
//! name spaces.  Library files hold bare definitions (no `def` keyword, no blocks).

pub mod lang;
pub mod commands;

use std::collections::{HashMap,BTreeMap};
use log::error;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Compile a program against a library map, `libraries` is keyed by the
/// file name appearing in an `import` statement.  On success the answer maps
/// each `@block.NAME` to its uppercase hex string.  Import failures are logged
/// and skipped; any other error ends the compilation.
pub fn compile(source: &str,libraries: &HashMap<String,String>) -> Result<BTreeMap<String,String>,DYNERR> {
    let mut compiler = lang::compiler::Compiler::new();
    compiler.compile(source,libraries)
}

/// Calls `compile` and folds the outcome into the JSON shape expected by hosts:
/// the block map on success, a single-key `{"error": …}` object on failure.
pub fn compile_to_json(source: &str,libraries: &HashMap<String,String>) -> String {
    match compile(source,libraries) {
        Ok(blocks) => {
            let mut obj = serde_json::Map::new();
            for (name,hex) in blocks {
                obj.insert(name,serde_json::Value::String(hex));
            }
            serde_json::Value::Object(obj).to_string()
        },
        Err(e) => {
            error!("compilation failed: {}",e);
            let mut obj = serde_json::Map::new();
            obj.insert("error".to_string(),serde_json::Value::String(format!("error: {}",e)));
            serde_json::Value::Object(obj).to_string()
        }
    }
}
