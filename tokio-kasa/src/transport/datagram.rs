use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use kasa_proto::protocol::codec::encode_datagram;
use tokio::net::UdpSocket;
use tracing::trace;

use crate::error::{KasaError, Result};

/// Sends one scrambled, unprefixed command and returns without reading.
///
/// Success means the local stack accepted the datagram, not that the device
/// acted on it.
pub async fn send(addr: SocketAddr, plaintext: &[u8]) -> Result<()> {
    let local: SocketAddr = if addr.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };

    let socket = UdpSocket::bind(local).await.map_err(KasaError::Bind)?;
    socket
        .connect(addr)
        .await
        .map_err(|source| KasaError::Connect { addr, source })?;

    let payload = encode_datagram(plaintext);
    socket
        .send(&payload)
        .await
        .map_err(|source| KasaError::Send { addr, source })?;

    trace!(%addr, len = payload.len(), "datagram sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasa_proto::protocol::crypto::unscramble;
    use std::time::Duration;

    #[tokio::test]
    async fn test_datagram_is_scrambled_without_prefix() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = device.local_addr().unwrap();

        let command = br#"{"system":{"set_relay_state":{"state":1}}}"#;
        send(addr, command).await.unwrap();

        let mut buf = [0u8; 256];
        let (n, _) = tokio::time::timeout(Duration::from_secs(2), device.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(n, command.len());
        assert_eq!(unscramble(&buf[..n]), command);
    }
}
