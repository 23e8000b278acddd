//! # Address resolver (pass 1)
//!
//! Labels cannot be evaluated until the byte stream around them is laid out,
//! so the first pass works in two stages.  The flatten stage evaluates every
//! expression with labels read as `0000`, discards `@x=` and `@overwrite`,
//! and passes the offset and label directives through, producing a stream of
//! nothing but hex pairs and the three directives that matter for layout.
//! The scan stage walks that stream counting bytes and records where every
//! `@adr.NAME` fell.
//!
//! `@offset=` moves the address base without touching the byte counter;
//! `@rstoffst` zeroes the byte counter without touching the base.  Both label
//! coordinates are 16-bit and wrap.

use log::trace;
use super::{Error,LabelAddress,LabelMap};
use super::expr::{ExprParser,NullResolver};
use super::scanner::{Scanner,syntax};
use crate::DYNERR;

/// Reduce an expanded block body to hex pairs plus layout directives.
pub fn flatten(body: &str) -> Result<String,DYNERR> {
    let null = NullResolver;
    let parser = ExprParser::new(&null,'0',true);
    let mut sc = Scanner::new(body);
    let mut out = String::new();
    loop {
        sc.skip_trivia();
        if sc.eof() {
            break;
        }
        if sc.at("@") {
            if sc.at("@offset") {
                sc.advance("@offset".len());
                let digits = scan_assigned_digits(&mut sc,4)?;
                out += &format!(" @offset={} ",digits);
                continue;
            }
            if sc.at("@rstoffst") {
                sc.advance("@rstoffst".len());
                out += " @rstoffst ";
                continue;
            }
            if sc.at("@adr") {
                sc.advance("@adr".len());
                let name = scan_label_name(&mut sc)?;
                out += &format!(" @adr.{} ",name);
                continue;
            }
            if sc.at("@x") {
                sc.advance("@x".len());
                scan_assigned_digits(&mut sc,1)?;
                continue;
            }
            if sc.at("@overwrite") {
                // admitted as an expression factor, contributes nothing
                out += &parser.eval_expr(&mut sc)?;
                continue;
            }
            return Err(syntax(&sc));
        }
        out += &parser.eval_expr(&mut sc)?;
    }
    trace!("flattened stream: {}",out);
    Ok(out)
}

/// Walk the flattened stream and assign every label its address pair.
pub fn scan_labels(stream: &str) -> Result<LabelMap,DYNERR> {
    let mut sc = Scanner::new(stream);
    let mut labels = LabelMap::new();
    let mut offset: u16 = 0x0000;
    let mut count: usize = 0;
    loop {
        sc.skip_trivia();
        if sc.eof() {
            break;
        }
        if sc.at("@offset") {
            sc.advance("@offset".len());
            let digits = scan_assigned_digits(&mut sc,4)?;
            offset = u16::from_str_radix(&digits,16)?;
            continue;
        }
        if sc.at("@rstoffst") {
            sc.advance("@rstoffst".len());
            count = 0;
            continue;
        }
        if sc.at("@adr") {
            sc.advance("@adr".len());
            let name = scan_label_name(&mut sc)?;
            if labels.contains_key(&name) {
                return Err(Box::new(Error::DuplicateLabel(name)));
            }
            let addr = LabelAddress {
                absolute: offset.wrapping_add(count as u16),
                relative: count as u16
            };
            trace!("label {} at {:04X} (+{:04X})",name,addr.absolute,addr.relative);
            labels.insert(name,addr);
            continue;
        }
        if sc.at_hex_pair() {
            sc.scan_hex_pair();
            count += 1;
            continue;
        }
        return Err(syntax(&sc));
    }
    Ok(labels)
}

/// `= H…H` with exactly `n` hex digits, as in `@offset=1000` or `@x=f`
fn scan_assigned_digits(sc: &mut Scanner,n: usize) -> Result<String,DYNERR> {
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

/// `.NAME` as in `@adr.start`
fn scan_label_name(sc: &mut Scanner) -> Result<String,DYNERR> {
    sc.skip_trivia();
    if !sc.eat(".") {
        return Err(syntax(sc));
    }
    sc.skip_trivia();
    match sc.scan_cname() {
        Some(n) => Ok(n),
        None => Err(syntax(sc))
    }
}
