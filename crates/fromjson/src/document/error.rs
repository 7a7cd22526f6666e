use bstr::ByteSlice;
use thiserror::Error;

/// A tokenizer diagnostic together with the position it was raised at.
///
/// `line` and `column` are 1-based; the column counts characters, not bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}:{column}")]
pub struct ParseError {
    pub(crate) kind: SyntaxError,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Locate `offset` within `input` and attach it to `kind`.
    pub(crate) fn at(input: &[u8], offset: usize, kind: SyntaxError) -> Self {
        let prefix = &input[..offset.min(input.len())];
        let line_start = prefix.rfind_byte(b'\n').map_or(0, |nl| nl + 1);
        Self {
            kind,
            line: prefix.iter().filter(|&&b| b == b'\n').count() + 1,
            column: prefix[line_start..].chars().count() + 1,
        }
    }

    /// What went wrong, without the position.
    #[must_use]
    pub fn kind(&self) -> &SyntaxError {
        &self.kind
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("input is not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid escape character '{0}'")]
    InvalidEscape(char),
    #[error("invalid unicode escape sequence at character: '{0}'")]
    InvalidUnicodeEscapeChar(char),
    #[error("invalid unicode escape sequence \\u{0:04X}")]
    InvalidUnicodeEscapeSequence(u32),
    #[error("unescaped control character 0x{0:02X} in string")]
    ControlCharacterInString(u8),
    #[error("number out of range")]
    NumberOutOfRange,
    #[error("no JSON value found")]
    EmptyInput,
    #[error("trailing characters after JSON value")]
    TrailingCharacters,
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_counts_lines_and_characters() {
        let input = "{\n  \"é\": x".as_bytes();
        let offset = input.len() - 1;
        let err = ParseError::at(input, offset, SyntaxError::InvalidCharacter('x'));
        assert_eq!((err.line, err.column), (2, 8));
        assert_eq!(err.to_string(), "invalid character 'x' at 2:8");
    }

    #[test]
    fn position_past_end_is_clamped() {
        let err = ParseError::at(b"[1,", 10, SyntaxError::UnexpectedEndOfInput);
        assert_eq!((err.line, err.column), (1, 4));
    }
}
