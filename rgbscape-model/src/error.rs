//! Model error types

use thiserror::Error;

/// Errors from parsing a color string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Invalid color length: expected 3, 6 or 8 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("Invalid hex digits: {0:?}")]
    InvalidDigit(String),
}
