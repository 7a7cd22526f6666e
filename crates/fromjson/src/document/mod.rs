//! Whole-input JSON tokenizer.
//!
//! Overview
//! - [`Parser::parse`] validates the input as UTF-8 and lays it out as a flat
//!   *tape* of [`Node`]s in document order. Containers are bracketed by a start
//!   node that records the index of its matching end node, so skipping a
//!   subtree is O(1).
//! - Every key and string value is unescaped into one contiguous string
//!   buffer. Tape string nodes store byte ranges into that buffer.
//! - Once parsing succeeds the buffer is frozen into a shared [`Bytes`]
//!   handle. String values built from the document slice that handle instead
//!   of copying, so the buffer stays alive exactly as long as the longest-lived
//!   value that refers to it.
//!
//! Nesting is tracked with an explicit stack of open containers; the tokenizer
//! never recurses.

mod cursor;
mod error;
mod escape_buffer;
mod literal;
mod numbers;

use core::mem;

use bytes::Bytes;
pub use cursor::{Cursor, NodeType};
pub use error::{ParseError, SyntaxError};
use escape_buffer::{SurrogatePair, UnicodeEscapeBuffer};
use literal::{ExpectedLiteral, Step as LiteralStep};
use numbers::NumberLexeme;

/// One tape entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Node {
    /// `end` is the tape index of the matching [`Node::ObjectEnd`].
    Object { end: usize },
    ObjectEnd,
    /// `end` is the tape index of the matching [`Node::ArrayEnd`].
    Array { end: usize },
    ArrayEnd,
    /// Byte range into the document's string buffer.
    String { start: usize, end: usize },
    Int(i64),
    UInt(u64),
    Double(f64),
    True,
    False,
    Null,
}

/// Capacity of the string buffer for an input of `len` bytes.
///
/// Unescaping never grows a string, so this is always enough to hold every
/// key and string of the input without reallocating.
#[must_use]
pub fn string_buffer_capacity(len: usize) -> usize {
    (len.saturating_mul(5) / 3 + 32).next_multiple_of(64)
}

/// The parsed form of one JSON text.
#[derive(Debug, Clone)]
pub struct Document {
    tape: Vec<Node>,
    strings: Bytes,
}

impl Document {
    /// A cursor positioned on the root value.
    #[must_use]
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// Number of tape entries, container ends included.
    #[must_use]
    pub fn tape_len(&self) -> usize {
        self.tape.len()
    }

    /// The buffer holding every unescaped key and string.
    #[must_use]
    pub fn string_buffer(&self) -> &Bytes {
        &self.strings
    }

    pub(crate) fn node(&self, index: usize) -> Option<Node> {
        self.tape.get(index).copied()
    }

    pub(crate) fn str_at(&self, start: usize, end: usize) -> &str {
        let bytes = &self.strings[start..end];
        // SAFETY: the buffer is filled only through `String` appends, and every
        // recorded range begins and ends between two appends.
        unsafe { core::str::from_utf8_unchecked(bytes) }
    }

    pub(crate) fn bytes_at(&self, start: usize, end: usize) -> Bytes {
        self.strings.slice(start..end)
    }
}

/// Tokenizes JSON text into [`Document`]s.
#[derive(Debug, Default)]
pub struct Parser {
    tape: Vec<Node>,
    open: Vec<usize>,
}

impl Parser {
    /// A parser whose tape is pre-sized for an input of `len` bytes.
    #[must_use]
    pub fn with_capacity(len: usize) -> Self {
        Self {
            tape: Vec::with_capacity(len / 2 + 2),
            open: Vec::new(),
        }
    }

    /// Parse exactly one JSON value, surrounded by optional whitespace.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for invalid UTF-8, malformed or truncated JSON,
    /// trailing characters and numbers outside the `f64` range.
    pub fn parse(&mut self, input: &[u8]) -> Result<Document, ParseError> {
        let text = core::str::from_utf8(input)
            .map_err(|e| ParseError::at(input, e.valid_up_to(), SyntaxError::InvalidUtf8))?;

        self.tape.clear();
        self.open.clear();
        let mut strings = String::with_capacity(string_buffer_capacity(input.len()));
        let mut tokenizer = Tokenizer {
            text,
            input,
            pos: 0,
            tape: &mut self.tape,
            open: &mut self.open,
            strings: &mut strings,
        };
        if let Err(kind) = tokenizer.parse_document() {
            return Err(ParseError::at(input, tokenizer.pos, kind));
        }

        Ok(Document {
            tape: mem::take(&mut self.tape),
            strings: Bytes::from(strings),
        })
    }
}

/// Whether the value just parsed opened a container with content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parsed {
    Descended,
    Complete,
}

struct Tokenizer<'a> {
    text: &'a str,
    input: &'a [u8],
    pos: usize,
    tape: &'a mut Vec<Node>,
    open: &'a mut Vec<usize>,
    strings: &'a mut String,
}

impl Tokenizer<'_> {
    fn parse_document(&mut self) -> Result<(), SyntaxError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(SyntaxError::EmptyInput);
        }
        loop {
            if self.parse_value()? == Parsed::Descended {
                continue;
            }
            if !self.after_value()? {
                break;
            }
        }
        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(SyntaxError::TrailingCharacters);
        }
        Ok(())
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// The error for whatever sits at the current position.
    fn unexpected(&self) -> SyntaxError {
        self.text
            .get(self.pos..)
            .and_then(|rest| rest.chars().next())
            .map_or(SyntaxError::UnexpectedEndOfInput, SyntaxError::InvalidCharacter)
    }

    fn expect(&mut self, b: u8) -> Result<(), SyntaxError> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn open_container(&mut self, node: Node) {
        self.open.push(self.tape.len());
        self.tape.push(node);
    }

    fn close_container(&mut self) {
        let Some(start) = self.open.pop() else {
            return;
        };
        let end = self.tape.len();
        let end_node = match &mut self.tape[start] {
            Node::Object { end: slot } => {
                *slot = end;
                Node::ObjectEnd
            }
            Node::Array { end: slot } => {
                *slot = end;
                Node::ArrayEnd
            }
            _ => unreachable!("open container stack points at a scalar"),
        };
        self.tape.push(end_node);
    }

    fn in_object(&self) -> bool {
        self.open
            .last()
            .is_some_and(|&i| matches!(self.tape[i], Node::Object { .. }))
    }

    fn parse_value(&mut self) -> Result<Parsed, SyntaxError> {
        self.skip_whitespace();
        let Some(b) = self.peek() else {
            return Err(SyntaxError::UnexpectedEndOfInput);
        };
        match b {
            b'{' | b'[' => {
                self.pos += 1;
                let (node, close) = if b == b'{' {
                    (Node::Object { end: 0 }, b'}')
                } else {
                    (Node::Array { end: 0 }, b']')
                };
                self.open_container(node);
                self.skip_whitespace();
                if self.peek() == Some(close) {
                    self.pos += 1;
                    self.close_container();
                    return Ok(Parsed::Complete);
                }
                if b == b'{' {
                    self.parse_key()?;
                }
                Ok(Parsed::Descended)
            }
            b'"' => {
                self.pos += 1;
                let node = self.parse_string()?;
                self.tape.push(node);
                Ok(Parsed::Complete)
            }
            b'-' | b'0'..=b'9' => {
                let node = self.parse_number()?;
                self.tape.push(node);
                Ok(Parsed::Complete)
            }
            _ => {
                let node = self.parse_literal()?;
                self.tape.push(node);
                Ok(Parsed::Complete)
            }
        }
    }

    /// Close finished containers. Returns `true` when positioned before the
    /// next value (after `,` or after `"key":`), `false` once the root is done.
    fn after_value(&mut self) -> Result<bool, SyntaxError> {
        while !self.open.is_empty() {
            self.skip_whitespace();
            let in_object = self.in_object();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    if in_object {
                        self.parse_key()?;
                    }
                    return Ok(true);
                }
                Some(b'}') if in_object => {
                    self.pos += 1;
                    self.close_container();
                }
                Some(b']') if !in_object => {
                    self.pos += 1;
                    self.close_container();
                }
                _ => return Err(self.unexpected()),
            }
        }
        Ok(false)
    }

    fn parse_key(&mut self) -> Result<(), SyntaxError> {
        self.skip_whitespace();
        self.expect(b'"')?;
        let node = self.parse_string()?;
        self.tape.push(node);
        self.skip_whitespace();
        self.expect(b':')
    }

    /// Called just after the opening quote.
    fn parse_string(&mut self) -> Result<Node, SyntaxError> {
        let start = self.strings.len();
        loop {
            let run = self.pos;
            while let Some(b) = self.peek() {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            // The run stops only on ASCII bytes, so both ends are char boundaries.
            self.strings.push_str(&self.text[run..self.pos]);

            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(Node::String {
                        start,
                        end: self.strings.len(),
                    });
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.parse_escape()?;
                }
                Some(b) => return Err(SyntaxError::ControlCharacterInString(b)),
                None => return Err(SyntaxError::UnexpectedEndOfInput),
            }
        }
    }

    /// Called just after a backslash.
    fn parse_escape(&mut self) -> Result<(), SyntaxError> {
        let c = match self.peek() {
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\u{8}',
            Some(b'f') => '\u{c}',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => {
                self.pos += 1;
                let c = match SurrogatePair::first(self.parse_code_unit()?)? {
                    SurrogatePair::Scalar(c) => c,
                    SurrogatePair::High(high) => {
                        if self.input.get(self.pos..self.pos + 2) != Some(b"\\u".as_slice()) {
                            return Err(SyntaxError::InvalidUnicodeEscapeSequence(u32::from(high)));
                        }
                        self.pos += 2;
                        SurrogatePair::second(high, self.parse_code_unit()?)?
                    }
                };
                self.strings.push(c);
                return Ok(());
            }
            Some(_) => {
                return Err(match self.unexpected() {
                    SyntaxError::InvalidCharacter(c) => SyntaxError::InvalidEscape(c),
                    other => other,
                });
            }
            None => return Err(SyntaxError::UnexpectedEndOfInput),
        };
        self.pos += 1;
        self.strings.push(c);
        Ok(())
    }

    fn parse_code_unit(&mut self) -> Result<u16, SyntaxError> {
        let mut digits = UnicodeEscapeBuffer::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(SyntaxError::UnexpectedEndOfInput);
            };
            if let Some(unit) = digits.feed(b).map_err(|_| match self.unexpected() {
                SyntaxError::InvalidCharacter(c) => SyntaxError::InvalidUnicodeEscapeChar(c),
                other => other,
            })? {
                self.pos += 1;
                return Ok(unit);
            }
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
        self.pos - start
    }

    /// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
    fn parse_number(&mut self) -> Result<Node, SyntaxError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                self.skip_digits();
            }
            _ => return Err(self.unexpected()),
        }

        let mut float = false;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            float = true;
            if self.skip_digits() == 0 {
                return Err(self.unexpected());
            }
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            float = true;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                return Err(self.unexpected());
            }
        }

        let text = &self.text[start..self.pos];
        let lexeme = if float {
            NumberLexeme::Float(text)
        } else {
            NumberLexeme::Integer(text)
        };
        let node = lexeme.to_node();
        if node.is_err() {
            self.pos = start;
        }
        node
    }

    fn parse_literal(&mut self) -> Result<Node, SyntaxError> {
        let Some(mut literal) = self.peek().and_then(ExpectedLiteral::new) else {
            return Err(self.unexpected());
        };
        self.pos += 1;
        loop {
            let Some(b) = self.peek() else {
                return Err(SyntaxError::UnexpectedEndOfInput);
            };
            match literal.step(b) {
                LiteralStep::NeedMore => self.pos += 1,
                LiteralStep::Done(node) => {
                    self.pos += 1;
                    return Ok(node);
                }
                LiteralStep::Reject => return Err(self.unexpected()),
            }
        }
    }
}
