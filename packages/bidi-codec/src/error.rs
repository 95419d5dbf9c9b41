//! Error types for the codec functions
//!
//! Every failure is reported as one of three kinds: malformed input text
//! (`Validation`), a value that does not fit its target width (`Encoding`),
//! or text that should have been hexadecimal and is not (`Decoding`).

use thiserror::Error;

/// Broad classification of a [`CodecError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Encoding,
    Decoding,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Encoding error: {component} {value} does not fit in {width} bytes")]
    Encoding {
        component: &'static str,
        value: String,
        width: usize,
    },

    #[error("Decoding error: {0}")]
    Decoding(String),
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Validation(_) => ErrorKind::Validation,
            CodecError::Encoding { .. } => ErrorKind::Encoding,
            CodecError::Decoding(_) => ErrorKind::Decoding,
        }
    }
}

impl From<hex::FromHexError> for CodecError {
    fn from(err: hex::FromHexError) -> Self {
        CodecError::Decoding(err.to_string())
    }
}
