//! Error types for payload and identifier parsing.

use thiserror::Error;

/// Errors that can occur while decoding bus payloads and identifiers.
///
/// This error type is transport-agnostic: it covers the JSON payload
/// schemas and identifier canonicalization only. Connection and routing
/// errors belong in unishare-core.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Payload was not valid JSON or did not match the expected schema.
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Identifier was empty or contained non-alphanumeric characters
    /// after separator stripping.
    #[error("invalid device identifier {0:?}")]
    InvalidIdentifier(String),

    /// Telemetry field name is not one of the known fields.
    #[error("unknown telemetry field {0:?}")]
    UnknownField(String),
}

/// Result type alias using [`ParseError`].
pub type ParseResult<T> = std::result::Result<T, ParseError>;
