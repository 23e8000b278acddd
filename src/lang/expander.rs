//! # Macro expander
//!
//! Expansion is textual and recursive-by-re-parsing: the driver calls
//! `expand_once` until the block text stops changing.  One pass walks the
//! body copying ordinary text through, stripping comments, and rewriting the
//! three call forms:
//!
//! * `$name` — replaced by the stored constant body, verbatim.
//! * `*name(a,b,…)` — positional arguments bound to declared parameters
//!   (declared defaults fill missing trailing arguments), then every
//!   `%_param_%` in the stored body is replaced by its argument.
//! * `!name(a,…){…}` — as above, then `%%BODY%%` is replaced by the caller's
//!   brace-delimited body, which was itself expanded by the surrounding walk.
//!
//! After parameter substitution each expansion gets a hygiene pass: every
//! `&_TOKEN_&` becomes `TOKEN_<suffix>` with an 8-hex-digit suffix drawn from
//! a per-compilation counter.  The same token within one expansion keeps one
//! suffix; the same token in another expansion gets a new one, so macros that
//! declare labels can be called more than once per block.
//!
//! Arguments are raw text up to the next `,` or `)`, taken verbatim; `()`
//! passes no arguments.  Braces outside a `!` call body are a syntax error,
//! matching the call grammar.

use std::collections::HashMap;
use super::{Definitions,Error,Macro};
use super::scanner::{Scanner,syntax};
use crate::DYNERR;

pub struct Expander<'a> {
    defs: &'a Definitions,
    /// source of hygienic suffixes, monotonic across the whole compilation
    serial: u32
}

impl<'a> Expander<'a> {
    pub fn new(defs: &'a Definitions) -> Self {
        Self { defs, serial: 0 }
    }
    /// One parse-and-rewrite pass over a block body.  The fixed-point loop
    /// belongs to the driver, which also owns the iteration bound.
    pub fn expand_once(&mut self,body: &str) -> Result<String,DYNERR> {
        let mut sc = Scanner::new(body);
        let ans = self.expand_seq(&mut sc,false)?;
        if !sc.eof() {
            // a stray closing brace stopped the walk
            return Err(syntax(&sc));
        }
        Ok(ans)
    }
    /// Walk text up to EOF, or up to the closing brace when inside a `!` call
    /// body.  Nested braces inside a call body are preserved as `{ inner }`.
    fn expand_seq(&mut self,sc: &mut Scanner,in_braces: bool) -> Result<String,DYNERR> {
        let mut out = String::new();
        loop {
            if sc.skip_comment() {
                continue;
            }
            match sc.peek() {
                None => {
                    if in_braces {
                        return Err(syntax(sc));
                    }
                    break;
                },
                Some('}') => {
                    if in_braces {
                        break;
                    }
                    return Err(syntax(sc));
                },
                Some('{') => {
                    if !in_braces {
                        return Err(syntax(sc));
                    }
                    sc.bump();
                    let inner = self.expand_seq(sc,true)?;
                    if !sc.eat("}") {
                        return Err(syntax(sc));
                    }
                    out += "{ ";
                    out += &inner;
                    out += " }";
                },
                Some('$') => {
                    let name = match sc.scan_sigil_name() {
                        Some(n) => n,
                        None => return Err(syntax(sc))
                    };
                    match self.defs.constants.get(&name) {
                        Some(body) => out += body,
                        None => return Err(Box::new(Error::UndefinedSymbol(name)))
                    };
                },
                Some('*') => {
                    let name = match sc.scan_sigil_name() {
                        Some(n) => n,
                        None => return Err(syntax(sc))
                    };
                    let args = parse_args(sc)?;
                    let mac = match self.defs.simple.get(&name) {
                        Some(m) => m.clone(),
                        None => return Err(Box::new(Error::UndefinedSymbol(name)))
                    };
                    out += &self.apply(&mac,&name,&args,None)?;
                },
                Some('!') => {
                    let name = match sc.scan_sigil_name() {
                        Some(n) => n,
                        None => return Err(syntax(sc))
                    };
                    let args = parse_args(sc)?;
                    sc.skip_trivia();
                    if !sc.eat("{") {
                        return Err(syntax(sc));
                    }
                    let caller_body = self.expand_seq(sc,true)?;
                    if !sc.eat("}") {
                        return Err(syntax(sc));
                    }
                    let mac = match self.defs.body_taking.get(&name) {
                        Some(m) => m.clone(),
                        None => return Err(Box::new(Error::UndefinedSymbol(name)))
                    };
                    out += &self.apply(&mac,&name,&args,Some(&caller_body))?;
                },
                Some(c) => {
                    out.push(c);
                    sc.bump();
                }
            }
        }
        Ok(out)
    }
    /// Substitute one call: bind arguments, rewrite `%_param_%`, freshen
    /// `&_TOKEN_&`, and for body macros splice the caller body at `%%BODY%%`.
    fn apply(&mut self,mac: &Macro,name: &str,args: &[String],caller_body: Option<&str>) -> Result<String,DYNERR> {
        let mut bindings: Vec<(String,String)> = Vec::new();
        for (i,param) in mac.params.iter().enumerate() {
            let val = match args.get(i) {
                Some(a) => a.clone(),
                None => match &param.default {
                    Some(d) => d.clone(),
                    None => return Err(Box::new(Error::ArityMismatch(name.to_string())))
                }
            };
            bindings.push((param.name.clone(),val));
        }
        let mut body = mac.body.clone();
        for (param,val) in &bindings {
            body = body.replace(&format!("%_{}_%",param),val);
        }
        body = self.freshen(&body);
        if let Some(caller) = caller_body {
            body = body.replace("%%BODY%%",caller);
        }
        Ok(body)
    }
    /// Rewrite every `&_TOKEN_&` as `TOKEN_<suffix>`.  The map is local, so
    /// reuse happens only within this one expansion.
    fn freshen(&mut self,body: &str) -> String {
        let mut out = String::new();
        let mut seen: HashMap<String,String> = HashMap::new();
        let mut rest = body;
        while let Some(start) = rest.find("&_") {
            out += &rest[..start];
            let after = &rest[start+2..];
            match hygienic_token(after) {
                Some(tok) => {
                    let fresh = seen.entry(tok.to_string()).or_insert_with(|| {
                        self.serial += 1;
                        format!("{}_{:08x}",tok,self.serial)
                    }).clone();
                    out += &fresh;
                    rest = &after[tok.len()+2..];
                },
                None => {
                    out += "&_";
                    rest = after;
                }
            }
        }
        out += rest;
        out
    }
}

/// The token between `&_` and the nearest `_&`, which may not contain
/// whitespace and may not be empty.
fn hygienic_token(s: &str) -> Option<&str> {
    for (idx,c) in s.char_indices() {
        if idx > 0 && s[idx..].starts_with("_&") {
            return Some(&s[..idx]);
        }
        if c.is_whitespace() {
            return None;
        }
    }
    None
}

/// Argument list of a call: raw text split on `,` up to `)`, each argument
/// verbatim.  `()` is an empty list, an empty argument is a syntax error.
fn parse_args(sc: &mut Scanner) -> Result<Vec<String>,DYNERR> {
    sc.skip_trivia();
    if !sc.eat("(") {
        return Err(syntax(sc));
    }
    sc.skip_trivia();
    if sc.eat(")") {
        return Ok(Vec::new());
    }
    let mut args = Vec::new();
    loop {
        let arg = sc.take_until(&[',',')']);
        if arg.is_empty() {
            return Err(syntax(sc));
        }
        args.push(arg);
        if sc.eat(",") {
            continue;
        }
        if sc.eat(")") {
            return Ok(args);
        }
        return Err(syntax(sc));
    }
}
