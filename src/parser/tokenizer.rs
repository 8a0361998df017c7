//! SQL tokenization
//!
//! Lossless tokenizer: every byte of the scanned source belongs to exactly
//! one token, so concatenating the tokens reproduces the source. Comments
//! and whitespace are tokens like any other.

use std::borrow::Cow;

use crate::error::{Error, ErrorCode, Result};
use crate::parser::vocabulary::OPERATORS;

// ============================================================================
// Token
// ============================================================================

/// A token from the SQL source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Start position in source
    pub start: usize,
    /// End position in source (exclusive)
    pub end: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, in characters)
    pub column: u32,
}

impl Token {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Token {
            start,
            end,
            line,
            column,
        }
    }

    /// Get the text of this token from the source
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Token Stream
// ============================================================================

/// Tokens together with the source they slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream<'a> {
    source: Cow<'a, str>,
    tokens: Vec<Token>,
}

impl<'a> TokenStream<'a> {
    /// The scanned source, after any whitespace collapsing
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Text of the token at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|t| t.text(&self.source))
    }

    /// Token texts in source order
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(move |t| t.text(&self.source))
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.texts().map(str::to_string).collect()
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

/// SQL tokenizer
pub struct Tokenizer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokenizer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire source
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Get the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.is_eof() {
            return Ok(None);
        }

        let start = self.pos;
        let start_line = self.line;
        let start_column = self.column;

        self.scan_token()?;

        Ok(Some(Token::new(start, self.pos, start_line, start_column)))
    }

    /// Try each alternative in precedence order
    fn scan_token(&mut self) -> Result<()> {
        let matched = self.scan_line_comment()
            || self.scan_block_comment()
            || self.scan_operator()
            || self.scan_punctuation()
            || self.scan_empty_string()
            || self.scan_string()
            || self.scan_word()
            || self.scan_whitespace()
            || self.scan_period();

        if matched {
            Ok(())
        } else {
            Err(self.malformed())
        }
    }

    /// Scan a `--` or `#` comment, stopping before the newline
    fn scan_line_comment(&mut self) -> bool {
        if !(self.starts_with("--") || self.current() == Some(b'#')) {
            return false;
        }
        while let Some(c) = self.current() {
            if c == b'\n' {
                break;
            }
            self.advance();
        }
        true
    }

    /// Scan a `/* ... */` comment; unterminated comments do not match
    fn scan_block_comment(&mut self) -> bool {
        if !self.starts_with("/*") {
            return false;
        }
        match self.source[self.pos + 2..].find("*/") {
            Some(idx) => {
                self.advance_to(self.pos + 2 + idx + 2);
                true
            }
            None => false,
        }
    }

    /// Scan an operator, longest first
    fn scan_operator(&mut self) -> bool {
        for op in OPERATORS {
            if !self.starts_with(op) {
                continue;
            }
            // A lone '*' or '/' must not split a comment delimiter
            if *op == "*" && self.peek() == Some(b'/') {
                return false;
            }
            if *op == "/" && self.peek() == Some(b'*') {
                return false;
            }
            self.advance_to(self.pos + op.len());
            return true;
        }
        false
    }

    fn scan_punctuation(&mut self) -> bool {
        match self.current() {
            Some(b'[' | b']' | b'(' | b')' | b'{' | b'}' | b',' | b';' | b'`') => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    /// Scan `''` or `""` when no third quote follows
    fn scan_empty_string(&mut self) -> bool {
        let Some(quote @ (b'\'' | b'"')) = self.current() else {
            return false;
        };
        if self.peek() != Some(quote) || self.peek_at(2) == Some(quote) {
            return false;
        }
        self.advance();
        self.advance();
        true
    }

    /// Scan a quoted string; doubled or backslash-escaped quotes do not end it
    fn scan_string(&mut self) -> bool {
        let Some(quote @ (b'\'' | b'"')) = self.current() else {
            return false;
        };
        let saved = self.mark();
        self.advance(); // consume opening quote

        while let Some(c) = self.current() {
            if c == b'\\' {
                self.advance();
                if self.is_eof() {
                    break;
                }
                self.advance();
            } else if c == quote {
                if self.peek() == Some(quote) {
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    return true;
                }
            } else {
                self.advance();
            }
        }

        // Unterminated
        self.reset(saved);
        false
    }

    /// Scan an identifier, number or placeholder with dotted continuations
    /// (`db.table.column`, `t.*`)
    fn scan_word(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if is_word_char(c) || c == ':' || c == '@' {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == start {
            return false;
        }

        while self.current() == Some(b'.') {
            let next = self.source[self.pos + 1..].chars().next();
            match next {
                Some('*') => {
                    self.advance();
                    self.advance();
                }
                Some(c) if is_word_char(c) => {
                    self.advance();
                    while self.current_char().is_some_and(is_word_char) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        true
    }

    fn scan_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
        self.pos > start
    }

    fn scan_period(&mut self) -> bool {
        if self.current() == Some(b'.') {
            self.advance();
            true
        } else {
            false
        }
    }

    fn malformed(&self) -> Error {
        let c = self.current_char().unwrap_or('\0');
        let mut buf = [0u8; 4];
        let bytes = c.encode_utf8(&mut buf).as_bytes();
        Error::with_message(
            ErrorCode::MalformedInput,
            format!(
                "unrecognized input x'{}' at line {}, column {}",
                hex::encode(bytes),
                self.line,
                self.column
            ),
        )
        .at(self.pos)
    }

    /// Check if at end of input
    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn current_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Peek at next byte
    fn peek(&self) -> Option<u8> {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.bytes[self.pos..].starts_with(prefix.as_bytes())
    }

    /// Advance one character, tracking line and column
    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += c.len_utf8();
        }
    }

    fn advance_to(&mut self, end: usize) {
        while self.pos < end {
            self.advance();
        }
    }

    fn mark(&self) -> (usize, u32, u32) {
        (self.pos, self.line, self.column)
    }

    fn reset(&mut self, (pos, line, column): (usize, u32, u32)) {
        self.pos = pos;
        self.line = line;
        self.column = column;
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// ============================================================================
// Whitespace Collapsing
// ============================================================================

/// Trim leading whitespace and replace every run of two or more whitespace
/// characters with a single space. Single whitespace characters are kept.
pub fn collapse_whitespace(sql: &str) -> Cow<'_, str> {
    let trimmed = sql.trim_start();

    let mut out = String::with_capacity(trimmed.len());
    let mut changed = trimmed.len() != sql.len();
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_whitespace() {
            out.push(c);
            continue;
        }
        if chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            out.push(' ');
            changed = true;
        } else {
            out.push(c);
        }
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(sql)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Tokenize a SQL string, optionally collapsing whitespace first
pub fn tokenize(sql: &str, collapse: bool) -> Result<TokenStream<'_>> {
    let source = if collapse {
        collapse_whitespace(sql)
    } else {
        Cow::Borrowed(sql)
    };
    let tokens = Tokenizer::new(&source).tokenize()?;
    Ok(TokenStream { source, tokens })
}

/// Concatenate tokens back into SQL text, with no separators
pub fn untokenize<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens.into_iter().fold(String::new(), |mut sql, token| {
        sql.push_str(token.as_ref());
        sql
    })
}

// ============================================================================
// Tests
// ============================================================================
