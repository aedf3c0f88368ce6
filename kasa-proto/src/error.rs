use std::io;
use thiserror::Error;

/// Errors raised while encoding commands or decoding device replies.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// IO error surfaced through the frame codec
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Payload is not valid JSON or not the expected envelope shape
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Declared frame length cannot be a real reply
    #[error("invalid frame length: {0} bytes (maximum {1})")]
    InvalidLength(usize, usize),

    /// Payload does not fit the 32-bit length prefix
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    /// A command parameter is outside the range the device accepts
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears on the wire
        name: &'static str,
        /// Human readable constraint
        reason: String,
    },

    /// The device answered with a non-zero `err_code`
    #[error("device error {code}: {message}")]
    Device {
        /// Device-reported error code
        code: i64,
        /// Device-reported message, empty when the device sent none
        message: String,
    },

    /// The queried module or action is absent from the reply
    #[error("response is missing `{0}`")]
    Missing(&'static str),
}

pub type Result<T> = std::result::Result<T, ProtoError>;
