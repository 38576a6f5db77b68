//! Construction-time validation errors for ICE candidates.

use thiserror::Error;

/// Reasons a candidate (or one of its fields) is rejected before it is
/// exposed to priority computation or encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("candidate address is empty")]
    EmptyAddress,

    #[error("port {0} is outside 0..=65535")]
    PortOutOfRange(i64),

    #[error("remote (related) address is missing")]
    MissingRemoteAddress,

    #[error("component {0} is outside 1..=256")]
    ComponentOutOfRange(i64),

    #[error("not a component ID: {0}")]
    InvalidComponent(String),

    #[error("unknown transport protocol: {0}")]
    UnknownProtocol(String),
}

/// Check that a port read from a wider integer fits in 16 bits.
pub fn validate_port(value: i64) -> Result<u16, ValidationError> {
    u16::try_from(value).map_err(|_| ValidationError::PortOutOfRange(value))
}
