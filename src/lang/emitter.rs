//! # Final emitter (pass 2)
//!
//! The second pass re-parses the expanded block with the label map in hand.
//! Expressions now resolve `#name` and `##name` to real addresses, `@x=`
//! rebinds the placeholder digit as the stream goes by, and layout directives
//! emit nothing.  `@overwrite(A,V)` entries are collected while streaming and
//! spliced into the finished hex at the end.
//!
//! The splice reproduces the historical formula exactly: a 1-based byte
//! address `A` maps to character position `A*2 - 2`, and the patch lands two
//! characters to the right of it.  Compatibility outranks tidiness here.

use log::trace;
use super::{Error,LabelMap};
use super::expr::{ExprParser,MapResolver};
use super::scanner::{Scanner,syntax};
use crate::DYNERR;

pub struct Emitter<'a> {
    labels: &'a LabelMap
}

impl<'a> Emitter<'a> {
    pub fn new(labels: &'a LabelMap) -> Self {
        Self { labels }
    }
    /// Emit the block's hex string, overwrites applied, case not yet normalized.
    pub fn emit(&self,body: &str) -> Result<String,DYNERR> {
        let resolver = MapResolver { labels: self.labels };
        let mut x_char = '0';
        let mut patches: Vec<(String,String)> = Vec::new();
        let mut out = String::new();
        let mut sc = Scanner::new(body);
        loop {
            sc.skip_trivia();
            if sc.eof() {
                break;
            }
            if sc.at("@") {
                if sc.at("@offset") {
                    sc.advance("@offset".len());
                    scan_assignment(&mut sc,4)?;
                    continue;
                }
                if sc.at("@rstoffst") {
                    sc.advance("@rstoffst".len());
                    continue;
                }
                if sc.at("@adr") {
                    sc.advance("@adr".len());
                    sc.skip_trivia();
                    if !sc.eat(".") {
                        return Err(syntax(&sc));
                    }
                    sc.skip_trivia();
                    if sc.scan_cname().is_none() {
                        return Err(syntax(&sc));
                    }
                    continue;
                }
                if sc.at("@x") {
                    sc.advance("@x".len());
                    let digit = scan_assignment(&mut sc,1)?;
                    x_char = digit.chars().next().expect("digit was scanned");
                    continue;
                }
                if sc.at("@overwrite") {
                    sc.advance("@overwrite".len());
                    let parser = ExprParser::new(&resolver,x_char,false);
                    sc.skip_trivia();
                    if !sc.eat("(") {
                        return Err(syntax(&sc));
                    }
                    let addr = parser.eval_expr(&mut sc)?;
                    sc.skip_trivia();
                    if !sc.eat(",") {
                        return Err(syntax(&sc));
                    }
                    let val = parser.eval_expr(&mut sc)?;
                    sc.skip_trivia();
                    if !sc.eat(")") {
                        return Err(syntax(&sc));
                    }
                    trace!("overwrite {} <- {}",addr,val);
                    match patches.iter().position(|(a,_)| *a==addr) {
                        Some(idx) => patches[idx].1 = val,
                        None => patches.push((addr,val))
                    };
                    continue;
                }
                return Err(syntax(&sc));
            }
            let parser = ExprParser::new(&resolver,x_char,false);
            out += &parser.eval_expr(&mut sc)?;
        }
        apply_patches(out,&patches)
    }
}

/// `= H…H` with exactly `n` hex digits; the digits are validated and returned
fn scan_assignment(sc: &mut Scanner,n: usize) -> Result<String,DYNERR> {
    sc.skip_trivia();
    if !sc.eat("=") {
        return Err(syntax(sc));
    }
    sc.skip_trivia();
    match sc.scan_hex_digits(n) {
        Some(d) => Ok(d),
        None => Err(syntax(sc))
    }
}

/// Apply the recorded overwrites in the order they first appeared.
/// `pos = A*2 - 2` and the splice keeps `out[..pos+2]`, drops
/// `len(V)` characters, then keeps the rest.
fn apply_patches(mut out: String,patches: &[(String,String)]) -> Result<String,DYNERR> {
    for (addr,val) in patches {
        let a = match u64::from_str_radix(addr,16) {
            Ok(a) if a <= 0x7fffffff => a as i64,
            _ => return Err(Box::new(Error::OverwriteOutOfRange(addr.clone())))
        };
        let pos = a*2 - 2;
        if pos + val.len() as i64 > out.len() as i64 {
            return Err(Box::new(Error::OverwriteOutOfRange(addr.clone())));
        }
        let head_end = std::cmp::min((pos + 2) as usize,out.len());
        let tail_start = std::cmp::min((pos + 2 + val.len() as i64) as usize,out.len());
        out = format!("{}{}{}",&out[..head_end],val,&out[tail_start..]);
    }
    Ok(out)
}
