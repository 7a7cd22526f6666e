use super::{Node, error::SyntaxError};

/// Lexical hint so integers and floats take different conversion paths.
pub(crate) enum NumberLexeme<'a> {
    Integer(&'a str), // no '.' and no exponent
    Float(&'a str),   // has '.' or exponent
}

impl NumberLexeme<'_> {
    /// Integers that fit `i64` stay signed, larger positive ones that fit
    /// `u64` become unsigned, and anything wider falls back to a double.
    pub fn to_node(&self) -> Result<Node, SyntaxError> {
        match *self {
            NumberLexeme::Integer(text) => {
                if let Ok(n) = text.parse::<i64>() {
                    Ok(Node::Int(n))
                } else if let Ok(n) = text.parse::<u64>() {
                    Ok(Node::UInt(n))
                } else {
                    parse_double(text)
                }
            }
            NumberLexeme::Float(text) => parse_double(text),
        }
    }
}

fn parse_double(text: &str) -> Result<Node, SyntaxError> {
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Node::Double(n)),
        _ => Err(SyntaxError::NumberOutOfRange),
    }
}
