//! Transport timing and buffer sizes.

use std::time::Duration;

pub use kasa_proto::protocol::constants::DEFAULT_PORT;

/// Bytes requested per read of a stream reply body.
pub const CHUNK_SIZE: usize = 1024;

/// Deadline for each individual read (and for the request write).
pub const CHUNK_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause after a full chunk. Devices fill their send buffer slower than we
/// drain it.
pub const CHUNK_PAUSE: Duration = Duration::from_millis(150);

/// Deadline for establishing the TCP connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Receive buffer for discovery replies. Six-outlet strips cross 1 KiB.
pub const DATAGRAM_BUFFER_SIZE: usize = 2048;

/// Default time budget of a discovery scan.
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Default number of probe rounds per scan.
pub const DISCOVERY_PROBES: u32 = 1;
