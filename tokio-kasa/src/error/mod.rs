use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use kasa_proto::ProtoError;
use thiserror::Error;

/// Step of a unicast exchange an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolve,
    Connect,
    Send,
    Read,
    Decode,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Resolve => "resolve",
            Phase::Connect => "connect",
            Phase::Send => "send",
            Phase::Read => "read",
            Phase::Decode => "decode",
        })
    }
}

/// Errors returned by the transport, discovery and device layers.
///
/// None of these are retried internally; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum KasaError {
    /// Hostname lookup failed
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    /// Lookup succeeded but returned only IPv6 addresses
    #[error("no IPv4 address found for {0}")]
    NoIpv4Address(String),

    /// The local UDP socket could not be bound or configured
    #[error("failed to bind local socket: {0}")]
    Bind(#[source] io::Error),

    /// The device refused or reset the connection
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Writing the request failed
    #[error("failed to send to {addr}: {source}")]
    Send {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Reading the reply failed
    #[error("failed to read from {addr}: {source}")]
    Read {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// A connect, write or single read exceeded its deadline
    #[error("{phase} with {addr} timed out after {after:?}")]
    Timeout {
        addr: SocketAddr,
        phase: Phase,
        after: Duration,
    },

    /// The connection closed before the 4-byte length prefix arrived
    #[error("incomplete header from {addr}: got {received} of 4 bytes")]
    IncompleteHeader { addr: SocketAddr, received: usize },

    /// The connection closed before the declared body length arrived
    #[error("truncated response from {addr}: got {received} of {expected} bytes")]
    Truncated {
        addr: SocketAddr,
        expected: usize,
        received: usize,
    },

    /// Network interfaces could not be listed for broadcast discovery
    #[error("failed to enumerate network interfaces: {0}")]
    Interfaces(#[source] io::Error),

    /// Encoding, framing, decoding or a device-reported error
    #[error(transparent)]
    Proto(#[from] ProtoError),
}

impl KasaError {
    /// Phase of a unicast exchange this error came from, if any.
    ///
    /// Local setup failures (`Bind`, `Interfaces`) and command validation or
    /// device-reported errors have no phase.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            KasaError::Resolve { .. } | KasaError::NoIpv4Address(_) => Some(Phase::Resolve),
            KasaError::Connect { .. } => Some(Phase::Connect),
            KasaError::Send { .. } => Some(Phase::Send),
            KasaError::Read { .. }
            | KasaError::IncompleteHeader { .. }
            | KasaError::Truncated { .. }
            | KasaError::Proto(ProtoError::InvalidLength(..)) => Some(Phase::Read),
            KasaError::Timeout { phase, .. } => Some(*phase),
            KasaError::Proto(ProtoError::Json(_) | ProtoError::Missing(_)) => Some(Phase::Decode),
            _ => None,
        }
    }

    /// The device answered but reported a non-zero `err_code`.
    pub fn is_device_error(&self) -> bool {
        matches!(self, KasaError::Proto(ProtoError::Device { .. }))
    }
}

pub type Result<T> = std::result::Result<T, KasaError>;
