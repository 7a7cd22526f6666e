use thiserror::Error;

use crate::document::ParseError;

/// Why a conversion produced no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("JSON nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },
    #[error("JSON integer {value} is outside the signed 64-bit range")]
    IntegerOutOfRange { value: u64 },
    #[error("duplicate key '{key}' in JSON object")]
    DuplicateKey { key: String },
}
