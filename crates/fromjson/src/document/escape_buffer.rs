//! Decoding of `\uXXXX` escapes, including UTF-16 surrogate pairs.
//!
//! [`UnicodeEscapeBuffer`] accumulates exactly four ASCII hexadecimal digits
//! into one UTF-16 code unit. [`SurrogatePair`] then turns one or two code
//! units into a `char`: a high surrogate must be followed immediately by a
//! `\u` escape holding a low surrogate, and a lone low surrogate is rejected.
use super::error::SyntaxError;

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    code: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.code = 0;
        self.len = 0;
    }

    /// Feeds one hex digit. Returns the code unit once four digits were seen,
    /// then starts over.
    pub fn feed(&mut self, b: u8) -> Result<Option<u16>, SyntaxError> {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return Err(SyntaxError::InvalidUnicodeEscapeChar(char::from(b))),
        };
        self.code = (self.code << 4) | u16::from(digit);
        self.len += 1;
        if self.len == 4 {
            let code = self.code;
            self.reset();
            Ok(Some(code))
        } else {
            Ok(None)
        }
    }
}

/// What a code unit means on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SurrogatePair {
    /// A complete scalar value.
    Scalar(char),
    /// A high surrogate; a low surrogate must follow.
    High(u16),
}

impl SurrogatePair {
    pub fn first(unit: u16) -> Result<Self, SyntaxError> {
        match unit {
            0xD800..=0xDBFF => Ok(Self::High(unit)),
            0xDC00..=0xDFFF => Err(SyntaxError::InvalidUnicodeEscapeSequence(u32::from(unit))),
            _ => char::from_u32(u32::from(unit))
                .map(Self::Scalar)
                .ok_or(SyntaxError::InvalidUnicodeEscapeSequence(u32::from(unit))),
        }
    }

    pub fn second(high: u16, low: u16) -> Result<char, SyntaxError> {
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(SyntaxError::InvalidUnicodeEscapeSequence(u32::from(high)));
        }
        let code = 0x1_0000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
        char::from_u32(code).ok_or(SyntaxError::InvalidUnicodeEscapeSequence(code))
    }
}
