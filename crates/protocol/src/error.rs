//! Protocol error types
//!
//! Errors that can occur when parsing input lines or encoding/decoding
//! store payloads. All of them are record-level: the pipeline counts them
//! and moves on to the next line.

use std::fmt;

use thiserror::Error;

/// Errors that can occur while parsing one input line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line has fewer tab-separated fields than required
    #[error("malformed line: expected at least {expected} tab-separated fields, got {actual}")]
    MalformedLine { expected: usize, actual: usize },

    /// Device type or device id is empty
    #[error("missing device identity: {field} is empty")]
    MissingIdentity { field: &'static str },

    /// Latitude or longitude is not a finite decimal number
    #[error("invalid {field} coordinate: '{value}'")]
    InvalidCoordinate { field: &'static str, value: String },

    /// An app id token is not a non-negative 32-bit integer
    #[error("invalid app id: '{token}'")]
    InvalidAppId { token: String },
}

impl ParseError {
    /// Create a malformed line error
    #[inline]
    pub fn malformed(actual: usize) -> Self {
        Self::MalformedLine {
            expected: crate::FIELD_COUNT,
            actual,
        }
    }

    /// Create a missing identity error
    #[inline]
    pub fn missing_identity(field: &'static str) -> Self {
        Self::MissingIdentity { field }
    }

    /// Create an invalid coordinate error
    #[inline]
    pub fn invalid_coordinate(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            field,
            value: value.into(),
        }
    }

    /// Create an invalid app id error
    #[inline]
    pub fn invalid_app_id(token: impl Into<String>) -> Self {
        Self::InvalidAppId {
            token: token.into(),
        }
    }

    /// Get the error category (for per-kind counters)
    #[inline]
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::MalformedLine { .. } => ParseErrorKind::MalformedLine,
            Self::MissingIdentity { .. } => ParseErrorKind::MissingIdentity,
            Self::InvalidCoordinate { .. } => ParseErrorKind::InvalidCoordinate,
            Self::InvalidAppId { .. } => ParseErrorKind::InvalidAppId,
        }
    }
}

/// Category of a parse error, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    MalformedLine,
    MissingIdentity,
    InvalidCoordinate,
    InvalidAppId,
}

impl ParseErrorKind {
    /// All kinds, in counter order
    pub const ALL: [ParseErrorKind; 4] = [
        Self::MalformedLine,
        Self::MissingIdentity,
        Self::InvalidCoordinate,
        Self::InvalidAppId,
    ];

    /// Stable index for counter arrays
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::MalformedLine => 0,
            Self::MissingIdentity => 1,
            Self::InvalidCoordinate => 2,
            Self::InvalidAppId => 3,
        }
    }

    /// Snake-case name for logging
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedLine => "malformed_line",
            Self::MissingIdentity => "missing_identity",
            Self::InvalidCoordinate => "invalid_coordinate",
            Self::InvalidAppId => "invalid_app_id",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while encoding a record for the store
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The store key cannot be used with memcached
    #[error("invalid store key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Protobuf serialization failed
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] prost::EncodeError),
}

impl EncodeError {
    /// Create an invalid key error
    #[inline]
    pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }
}

/// Errors that can occur while decoding a stored payload
#[derive(Debug, Error)]
#[error("payload decoding failed: {0}")]
pub struct DecodeError(#[from] prost::DecodeError);
