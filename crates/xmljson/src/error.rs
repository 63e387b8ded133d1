//! Error types for xmljson

use std::fmt;
use thiserror::Error;

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Conversion options are missing or malformed
    Configuration,
    /// Input to a decode helper is malformed
    Decode,
    /// XML text handed to the tree builder is malformed
    Xml,
    MaxDepthExceeded { max: usize },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration error"),
            Self::Decode => write!(f, "decode error"),
            Self::Xml => write!(f, "xml error"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
        }
    }
}

/// Main error type for xmljson
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    offset: Option<usize>,
}

impl Error {
    /// Create an error of `kind`
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            offset: None,
        }
    }

    /// Options rejected before conversion started
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Input to a decode helper rejected
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// Create an XML error at a byte offset of the source text
    pub fn xml_at(offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Xml,
            message: message.into(),
            offset: Some(offset),
        }
    }

    /// Category of the error
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Message without the kind prefix
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte offset into the XML source, when the error came from the tree builder
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// True for [`ErrorKind::Configuration`]
    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }

    /// True for [`ErrorKind::Decode`]
    pub fn is_decode(&self) -> bool {
        self.kind == ErrorKind::Decode
    }
}

/// Result type alias for xmljson
pub type Result<T> = std::result::Result<T, Error>;
