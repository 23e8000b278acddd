//! Shared token surface for the grammar family.
//!
//! Every pass parses block text with its own small recursive-descent grammar,
//! but they all agree on the terminals: two-character hex pairs, sigiled names,
//! `CNAME` identifiers, and line comments introduced by `//` or `;`.
//! The scanner is a plain cursor over the source; the grammars live with
//! their passes.

/// hex digit, either case
pub fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// character admissible in a hex pair, including the placeholder digit
pub fn is_hex_or_x(c: char) -> bool {
    c.is_ascii_hexdigit() || c=='x' || c=='X'
}

/// first character of a `CNAME` identifier
pub fn is_cname_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c=='_'
}

/// continuation character of a `CNAME` identifier
pub fn is_cname_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c=='_'
}

/// Cursor over one source text.  Positions are byte offsets, advancing is
/// always by whole characters.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
    pub fn pos(&self) -> usize {
        self.pos
    }
    pub fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }
    /// unscanned remainder of the source
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }
    pub fn at(&self,pat: &str) -> bool {
        self.rest().starts_with(pat)
    }
    /// advance over `pat` if it is next, answer whether we did
    pub fn eat(&mut self,pat: &str) -> bool {
        if self.at(pat) {
            self.pos += pat.len();
            return true;
        }
        false
    }
    /// Skip whitespace and line comments (`//…` or `;…` up to the newline).
    /// Comments are ignorable in every grammar of the family.
    pub fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => { self.bump(); },
                Some(';') => self.skip_to_eol(),
                Some('/') if self.at("//") => self.skip_to_eol(),
                _ => return
            }
        }
    }
    /// Skip a line comment if one starts here, answer whether we did.
    /// For grammars that keep whitespace significant while still ignoring
    /// comments.
    pub fn skip_comment(&mut self) -> bool {
        match self.peek() {
            Some(';') => {
                self.skip_to_eol();
                true
            },
            Some('/') if self.at("//") => {
                self.skip_to_eol();
                true
            },
            _ => false
        }
    }
    fn skip_to_eol(&mut self) {
        while let Some(c) = self.peek() {
            if c=='\n' {
                return;
            }
            self.bump();
        }
    }
    /// Scan a sigiled name: the sigil (already verified by the caller as one
    /// of `$`, `*`, `!`) plus every following character up to whitespace or
    /// `(`.  None if the name part is empty.
    pub fn scan_sigil_name(&mut self) -> Option<String> {
        let sigil = self.bump()?;
        let mut name = String::from(sigil);
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c=='(' {
                break;
            }
            name.push(c);
            self.bump();
        }
        if name.len() > sigil.len_utf8() {
            Some(name)
        } else {
            None
        }
    }
    /// Scan a `CNAME`: `[A-Za-z_][A-Za-z0-9_]*`
    pub fn scan_cname(&mut self) -> Option<String> {
        match self.peek() {
            Some(c) if is_cname_start(c) => {},
            _ => return None
        }
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !is_cname_char(c) {
                break;
            }
            name.push(c);
            self.bump();
        }
        Some(name)
    }
    /// Scan exactly `n` hex digits, or None without advancing.
    pub fn scan_hex_digits(&mut self,n: usize) -> Option<String> {
        let digits: String = self.rest().chars().take(n).collect();
        if digits.chars().count()==n && digits.chars().all(is_hex_digit) {
            self.pos += digits.len();
            return Some(digits);
        }
        None
    }
    /// Is a two-character hex pair (placeholder digits allowed) next?
    pub fn at_hex_pair(&self) -> bool {
        let mut iter = self.rest().chars();
        match (iter.next(),iter.next()) {
            (Some(a),Some(b)) => is_hex_or_x(a) && is_hex_or_x(b),
            _ => false
        }
    }
    /// Consume a hex pair, caller must have checked `at_hex_pair`.
    pub fn scan_hex_pair(&mut self) -> (char,char) {
        let a = self.bump().expect("hex pair was checked");
        let b = self.bump().expect("hex pair was checked");
        (a,b)
    }
    /// Jump forward by `n` bytes, `n` must land on a character boundary.
    pub fn advance(&mut self,n: usize) {
        self.pos = std::cmp::min(self.pos + n,self.src.len());
    }
    /// Everything up to the next whitespace character.
    pub fn take_nonspace(&mut self) -> String {
        let mut ans = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            ans.push(c);
            self.bump();
        }
        ans
    }
    /// Everything up to (not including) the first of the stop characters.
    /// Used for raw argument text, which is taken verbatim.
    pub fn take_until(&mut self,stops: &[char]) -> String {
        let mut ans = String::new();
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                break;
            }
            ans.push(c);
            self.bump();
        }
        ans
    }
    /// Short snippet of what comes next, for diagnostics.
    pub fn context(&self) -> String {
        if self.eof() {
            return format!("end of input (offset {})",self.pos);
        }
        let snip: String = self.rest().chars().take(16).collect();
        format!("`{}` (offset {})",snip.trim_end(),self.pos)
    }
}

/// Shorthand for the ubiquitous syntax failure.
pub fn syntax(sc: &Scanner) -> crate::DYNERR {
    Box::new(super::Error::Syntax(sc.context()))
}
