//! # Preprocessor and module loader
//!
//! The preprocessor parses the top-level program grammar: `def` forms feed the
//! three definition tables, `@block.NAME: … @blockend` regions feed the block
//! table with their bodies stored verbatim, and `import FILE` pulls a library
//! module out of the host-provided map.
//!
//! Library modules admit only bare definitions (no `def` keyword, no blocks,
//! no directives, no nested imports).  A missing or malformed module is a
//! logged diagnostic, never a fatal error; the tables are simply left as they
//! were, so one bad library cannot take down the compilation.

use std::collections::{HashMap,BTreeMap};
use log::{info,error};
use super::{Definitions,Macro,Param};
use super::scanner::{Scanner,syntax};
use crate::DYNERR;

const RCH: &str = "unreachable was reached";

/// Immutable result of the preprocess stage, handed to the driver.
pub struct ProgramParts {
    pub defs: Definitions,
    pub blocks: BTreeMap<String,String>
}

pub struct Preprocessor {
    file_patt: regex::Regex
}

/// keyword match that refuses to split an identifier, `definitely` is not `def`
fn at_keyword(sc: &Scanner,kw: &str) -> bool {
    if !sc.at(kw) {
        return false;
    }
    match sc.rest()[kw.len()..].chars().next() {
        Some(c) => !super::scanner::is_cname_char(c),
        None => true
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            file_patt: regex::Regex::new(r"^[A-Za-z0-9_\-.]+$").expect(RCH)
        }
    }
    /// Parse the top-level program.  Any `import` is resolved against
    /// `libraries` on the spot, so later definitions shadow imported ones.
    pub fn parse_program(&self,source: &str,libraries: &HashMap<String,String>) -> Result<ProgramParts,DYNERR> {
        let mut defs = Definitions::new();
        let mut blocks = BTreeMap::new();
        let mut sc = Scanner::new(source);
        loop {
            sc.skip_trivia();
            if sc.eof() {
                break;
            }
            if at_keyword(&sc,"import") {
                sc.advance("import".len());
                sc.skip_trivia();
                let name = sc.take_nonspace();
                if !self.file_patt.is_match(&name) {
                    return Err(syntax(&sc));
                }
                self.load_module(&name,libraries,&mut defs);
                continue;
            }
            if at_keyword(&sc,"def") {
                sc.advance("def".len());
                sc.skip_trivia();
                parse_definition(&mut sc,&mut defs)?;
                continue;
            }
            if sc.at("@block") {
                parse_block(&mut sc,&mut blocks)?;
                continue;
            }
            return Err(syntax(&sc));
        }
        Ok(ProgramParts { defs, blocks })
    }
    /// Parse a library module: bare definitions only.
    pub fn parse_library(&self,source: &str) -> Result<Definitions,DYNERR> {
        let mut defs = Definitions::new();
        let mut sc = Scanner::new(source);
        loop {
            sc.skip_trivia();
            if sc.eof() {
                break;
            }
            match sc.peek() {
                Some('$') | Some('*') | Some('!') => parse_definition(&mut sc,&mut defs)?,
                _ => return Err(syntax(&sc))
            }
        }
        Ok(defs)
    }
    /// Merge a module's definitions into `defs`.  Failure of any kind is a
    /// diagnostic on the log and the tables stay untouched.
    fn load_module(&self,name: &str,libraries: &HashMap<String,String>,defs: &mut Definitions) {
        match libraries.get(name) {
            Some(text) => match self.parse_library(text) {
                Ok(more) => {
                    info!("loaded module '{}' ({} definitions)",name,more.len());
                    defs.merge(more);
                },
                Err(e) => error!("error loading module '{}': {}",name,e)
            },
            None => error!("error loading module '{}': file not found",name)
        }
    }
}

/// Parse one definition starting at its sigil.  Used for both the program
/// grammar (after `def`) and the library grammar (bare).
fn parse_definition(sc: &mut Scanner,defs: &mut Definitions) -> Result<(),DYNERR> {
    match sc.peek() {
        Some('$') => {
            let name = match sc.scan_sigil_name() {
                Some(n) => n,
                None => return Err(syntax(sc))
            };
            sc.skip_trivia();
            if !sc.eat("{") {
                return Err(syntax(sc));
            }
            let body = scan_brace_block(sc)?;
            defs.constants.insert(name,body);
        },
        Some('*') => {
            let name = match sc.scan_sigil_name() {
                Some(n) => n,
                None => return Err(syntax(sc))
            };
            let params = parse_params(sc)?;
            sc.skip_trivia();
            if !sc.eat("{") {
                return Err(syntax(sc));
            }
            let body = scan_brace_block(sc)?;
            defs.simple.insert(name,Macro { params, body });
        },
        Some('!') => {
            let name = match sc.scan_sigil_name() {
                Some(n) => n,
                None => return Err(syntax(sc))
            };
            let params = parse_params(sc)?;
            sc.skip_trivia();
            if !sc.eat("{%%BODY%%}") {
                return Err(syntax(sc));
            }
            sc.skip_trivia();
            if !sc.eat("{") {
                return Err(syntax(sc));
            }
            let body = scan_brace_block(sc)?;
            defs.body_taking.insert(name,Macro { params, body });
        },
        _ => return Err(syntax(sc))
    }
    Ok(())
}

/// Parse `(p1, p2=default, …)`.  A default is raw text from `=` to the next
/// `,` or `)`, taken verbatim.
fn parse_params(sc: &mut Scanner) -> Result<Vec<Param>,DYNERR> {
    sc.skip_trivia();
    if !sc.eat("(") {
        return Err(syntax(sc));
    }
    let mut params = Vec::new();
    sc.skip_trivia();
    if sc.eat(")") {
        return Ok(params);
    }
    loop {
        sc.skip_trivia();
        let name = match sc.scan_cname() {
            Some(n) => n,
            None => return Err(syntax(sc))
        };
        sc.skip_trivia();
        let default = match sc.eat("=") {
            true => Some(sc.take_until(&[',',')'])),
            false => None
        };
        params.push(Param { name, default });
        sc.skip_trivia();
        if sc.eat(",") {
            continue;
        }
        if sc.eat(")") {
            break;
        }
        return Err(syntax(sc));
    }
    Ok(params)
}

/// Body text between braces, opening brace already consumed.  Nested braces
/// are preserved in the stored body as `{ inner }`.
fn scan_brace_block(sc: &mut Scanner) -> Result<String,DYNERR> {
    let mut body = String::new();
    loop {
        match sc.peek() {
            None => return Err(syntax(sc)),
            Some('}') => {
                sc.bump();
                return Ok(body);
            },
            Some('{') => {
                sc.bump();
                let inner = scan_brace_block(sc)?;
                body += "{ ";
                body += &inner;
                body += " }";
            },
            Some(c) => {
                body.push(c);
                sc.bump();
            }
        }
    }
}

/// Parse `@block.NAME: … @blockend` (or `@end`), body stored verbatim.
fn parse_block(sc: &mut Scanner,blocks: &mut BTreeMap<String,String>) -> Result<(),DYNERR> {
    sc.advance("@block".len());
    sc.skip_trivia();
    if !sc.eat(".") {
        return Err(syntax(sc));
    }
    sc.skip_trivia();
    let name = match sc.scan_cname() {
        Some(n) => n,
        None => return Err(syntax(sc))
    };
    sc.skip_trivia();
    if !sc.eat(":") {
        return Err(syntax(sc));
    }
    let rest = sc.rest();
    let long_end = rest.find("@blockend");
    let short_end = rest.find("@end");
    let (idx,term) = match (long_end,short_end) {
        (Some(a),Some(b)) if a < b => (a,"@blockend"),
        (Some(a),None) => (a,"@blockend"),
        (_,Some(b)) => (b,"@end"),
        (None,None) => return Err(syntax(sc))
    };
    let body = rest[..idx].to_string();
    sc.advance(idx + term.len());
    blocks.insert(name,body);
    Ok(())
}
