//! Unicast transports.
//!
//! - [`stream`]: one TCP connection per request, length-prefixed frames,
//!   reply read in paced chunks.
//! - [`datagram`]: one UDP datagram per command, no reply expected.
//!
//! Both are one-shot: the socket is scoped to the call and dropped on every
//! exit path.

use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;

use crate::error::Result;

pub mod datagram;
pub mod resolve;
pub mod stream;

pub use resolve::resolve_ipv4;
pub use stream::StreamConfig;

/// Which transport a request goes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// TCP request/response.
    #[default]
    Stream,
    /// UDP fire-and-forget.
    Datagram,
}

/// Sends one plaintext command to `address:port`.
///
/// In [`Mode::Stream`] the unscrambled reply body is returned. In
/// [`Mode::Datagram`] the result is empty once the local network stack has
/// accepted the datagram; nothing is read back.
pub async fn send_request(
    address: IpAddr,
    port: u16,
    plaintext: &[u8],
    mode: Mode,
    config: &StreamConfig,
) -> Result<Bytes> {
    let addr = SocketAddr::new(address, port);
    match mode {
        Mode::Stream => stream::request(addr, plaintext, config).await,
        Mode::Datagram => {
            datagram::send(addr, plaintext).await?;
            Ok(Bytes::new())
        }
    }
}
