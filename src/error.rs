//! Error types and Result aliases for sqlsplit

use std::fmt;

/// Failure category for tokenizing and section splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Input matched none of the scanning alternatives
    MalformedInput,
    /// An opening enclosure never met its closer (or a closer had no opener)
    UnbalancedEnclosure,
    /// Enclosure nesting went past the configured maximum depth
    RecursionLimitExceeded,
}

impl ErrorCode {
    /// Default description for the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MalformedInput => "malformed input",
            ErrorCode::UnbalancedEnclosure => "unbalanced enclosure",
            ErrorCode::RecursionLimitExceeded => "recursion limit exceeded",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by tokenize and parse operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: Option<String>,
    /// Byte offset into the scanned source, when known
    pub offset: Option<usize>,
}

impl Error {
    pub fn new(code: ErrorCode) -> Self {
        Error {
            code,
            message: None,
            offset: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Error {
            code,
            message: Some(message.into()),
            offset: None,
        }
    }

    /// Attach the byte offset the failure was detected at
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.code, msg),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for sqlsplit operations
pub type Result<T> = std::result::Result<T, Error>;
