//! Wire-level constants shared by the stream and datagram transports.

/// Control port used by devices for both TCP and UDP.
pub const DEFAULT_PORT: u16 = 9999;

/// Seed of the autokey stream. Reset at the start of every payload.
pub const INITIAL_KEY: u8 = 0xAB;

/// Size of the big-endian length prefix on stream frames.
pub const HEADER_SIZE: usize = 4;

/// Largest reply body we accept from a device.
///
/// Six-outlet strips answer `get_sysinfo` with a little over 1 KiB, so this
/// leaves generous room while still rejecting garbage headers.
pub const MAX_FRAME_LENGTH: usize = 64 * 1024;

const _: () = {
    assert!(MAX_FRAME_LENGTH <= u32::MAX as usize);
};
