//! Expression sub-grammar shared by the address pass and the final emitter.
//!
//! `expr := term (('+'|'-') term)*`, `term := factor+`, and a factor is a
//! `<…>` group, a `[…]` endian swap, a run of hex pairs, or a label call
//! (`#name` for the absolute address, `##name` for the byte offset).
//! Juxtaposed factors concatenate their hex strings; `+` and `-` operate on
//! unsigned hex at the width of the widest operand, rounded up to even.
//! Subtraction wraps modulo `16^width`; addition is allowed to carry into
//! extra digits.
//!
//! The two passes differ only in how labels resolve and how the placeholder
//! digit is bound, so those arrive through `LabelResolver` and a digit
//! argument.  The address pass additionally swallows `@overwrite(…,…)`
//! wherever a factor may appear, contributing nothing to the stream.

use super::Error;
use super::LabelMap;
use super::scanner::{Scanner,syntax};
use crate::DYNERR;

const RCH: &str = "unreachable was reached";

/// Seam between the passes: pass 1 reads every label as `0000`, pass 2
/// reads the label map built by pass 1.
pub trait LabelResolver {
    fn absolute(&self,name: &str) -> Result<String,DYNERR>;
    fn relative(&self,name: &str) -> Result<String,DYNERR>;
}

/// Resolver for the address pass, labels are not known yet.
pub struct NullResolver;

impl LabelResolver for NullResolver {
    fn absolute(&self,_name: &str) -> Result<String,DYNERR> {
        Ok("0000".to_string())
    }
    fn relative(&self,_name: &str) -> Result<String,DYNERR> {
        Ok("0000".to_string())
    }
}

/// Resolver for the final pass, backed by the label map.
pub struct MapResolver<'a> {
    pub labels: &'a LabelMap
}

impl<'a> LabelResolver for MapResolver<'a> {
    fn absolute(&self,name: &str) -> Result<String,DYNERR> {
        match self.labels.get(name) {
            Some(addr) => Ok(format!("{:04X}",addr.absolute)),
            None => Err(Box::new(Error::UnresolvedLabel(name.to_string())))
        }
    }
    fn relative(&self,name: &str) -> Result<String,DYNERR> {
        match self.labels.get(name) {
            Some(addr) => Ok(format!("{:04X}",addr.relative)),
            None => Err(Box::new(Error::UnresolvedLabel(name.to_string())))
        }
    }
}

pub struct ExprParser<'a> {
    resolver: &'a dyn LabelResolver,
    /// value substituted for the `x`/`X` placeholder digit
    x_char: char,
    /// the address grammar admits `@overwrite` as a factor and discards it
    overwrite_as_factor: bool
}

impl<'a> ExprParser<'a> {
    pub fn new(resolver: &'a dyn LabelResolver,x_char: char,overwrite_as_factor: bool) -> Self {
        Self { resolver, x_char, overwrite_as_factor }
    }
    /// Evaluate an expression starting at the scanner's position, leaving the
    /// scanner just past it.  The answer is a hex string.
    pub fn eval_expr(&self,sc: &mut Scanner) -> Result<String,DYNERR> {
        let mut terms = vec![self.eval_term(sc)?];
        let mut ops: Vec<char> = Vec::new();
        loop {
            sc.skip_trivia();
            match sc.peek() {
                Some('+') | Some('-') => {
                    ops.push(sc.bump().expect(RCH));
                    terms.push(self.eval_term(sc)?);
                },
                _ => break
            }
        }
        if ops.is_empty() {
            return Ok(terms.pop().expect(RCH));
        }
        combine(&terms,&ops)
    }
    fn eval_term(&self,sc: &mut Scanner) -> Result<String,DYNERR> {
        let mut ans = String::new();
        let mut any = false;
        while let Some(s) = self.eval_factor(sc)? {
            ans += &s;
            any = true;
        }
        if !any {
            return Err(syntax(sc));
        }
        Ok(ans)
    }
    fn eval_factor(&self,sc: &mut Scanner) -> Result<Option<String>,DYNERR> {
        sc.skip_trivia();
        if sc.eat("<") {
            let v = self.eval_expr(sc)?;
            sc.skip_trivia();
            if !sc.eat(">") {
                return Err(syntax(sc));
            }
            return Ok(Some(v));
        }
        if sc.eat("[") {
            let v = self.eval_expr(sc)?;
            sc.skip_trivia();
            if !sc.eat("]") {
                return Err(syntax(sc));
            }
            return Ok(Some(swap_endian(&v)?));
        }
        if sc.at("##") {
            sc.advance(2);
            let name = match sc.scan_cname() {
                Some(n) => n,
                None => return Err(syntax(sc))
            };
            return Ok(Some(self.resolver.relative(&name)?));
        }
        if sc.at("#") {
            sc.advance(1);
            let name = match sc.scan_cname() {
                Some(n) => n,
                None => return Err(syntax(sc))
            };
            return Ok(Some(self.resolver.absolute(&name)?));
        }
        if self.overwrite_as_factor && sc.at("@overwrite") {
            sc.advance("@overwrite".len());
            sc.skip_trivia();
            if !sc.eat("(") {
                return Err(syntax(sc));
            }
            let _addr = sc.take_until(&[',',')']);
            if !sc.eat(",") {
                return Err(syntax(sc));
            }
            let _val = sc.take_until(&[',',')']);
            if !sc.eat(")") {
                return Err(syntax(sc));
            }
            return Ok(Some(String::new()));
        }
        if sc.at_hex_pair() {
            let mut hx = String::new();
            loop {
                let (a,b) = sc.scan_hex_pair();
                hx.push(self.normalize(a));
                hx.push(self.normalize(b));
                sc.skip_trivia();
                if !sc.at_hex_pair() {
                    break;
                }
            }
            return Ok(Some(hx));
        }
        Ok(None)
    }
    /// hex pairs are lowercased, placeholder digits become `x_char`
    fn normalize(&self,c: char) -> char {
        match c {
            'x' | 'X' => self.x_char,
            _ => c.to_ascii_lowercase()
        }
    }
}

/// Fold the operand list.  Width is the widest operand rounded up to even;
/// only subtraction wraps, a sum may grow past the width.
fn combine(terms: &[String],ops: &[char]) -> Result<String,DYNERR> {
    let mut width = 0;
    for t in terms {
        if t.len() > width {
            width = t.len();
        }
    }
    if width % 2 == 1 {
        width += 1;
    }
    if width > 30 {
        return Err(Box::new(Error::Syntax(format!("arithmetic operand too wide ({} digits)",width))));
    }
    let mut acc = parse_operand(&terms[0])?;
    for (i,op) in ops.iter().enumerate() {
        let v = parse_operand(&terms[i+1])?;
        match *op {
            '+' => acc = match acc.checked_add(v) {
                Some(n) => n,
                None => return Err(Box::new(Error::Syntax("arithmetic overflow".to_string())))
            },
            '-' => acc = match v > acc {
                true => 16u128.pow(width as u32) - (v - acc),
                false => acc - v
            },
            _ => return Err(Box::new(Error::Syntax(format!("invalid operator: {}",op))))
        }
    }
    Ok(format!("{:0width$X}",acc,width = width))
}

fn parse_operand(term: &str) -> Result<u128,DYNERR> {
    match u128::from_str_radix(term,16) {
        Ok(v) => Ok(v),
        Err(_) => Err(Box::new(Error::Syntax(format!("cannot evaluate operand `{}`",term))))
    }
}

/// Swap adjacent byte pairs: `AABBCCDD` becomes `BBAADDCC`.  The operand
/// must hold a whole number of pairs.
pub fn swap_endian(hex: &str) -> Result<String,DYNERR> {
    if hex.len() % 4 != 0 {
        return Err(Box::new(Error::MalformedEndian(hex.to_string())));
    }
    let bytes: Vec<&str> = (0..hex.len()/2).map(|i| &hex[2*i..2*i+2]).collect();
    let mut ans = String::new();
    for i in (0..bytes.len()).step_by(2) {
        ans += bytes[i+1];
        ans += bytes[i];
    }
    Ok(ans)
}
