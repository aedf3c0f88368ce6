use std::net::SocketAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use kasa_proto::protocol::codec::{FrameCodec, declared_length};
use kasa_proto::protocol::constants::{HEADER_SIZE, MAX_FRAME_LENGTH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{self, timeout};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::constants::{CHUNK_PAUSE, CHUNK_SIZE, CHUNK_TIMEOUT, CONNECT_TIMEOUT};
use crate::error::{KasaError, Phase, Result};

/// Configuration for a stream request.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Deadline for the TCP handshake.
    pub connect_timeout: Duration,
    /// Deadline for the request write and for each individual read.
    pub chunk_timeout: Duration,
    /// Bytes requested per body read.
    pub chunk_size: usize,
    /// Pause after a full chunk before reading again.
    pub chunk_pause: Duration,
    /// Largest reply body accepted.
    pub max_response_length: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            chunk_timeout: CHUNK_TIMEOUT,
            chunk_size: CHUNK_SIZE,
            chunk_pause: CHUNK_PAUSE,
            max_response_length: MAX_FRAME_LENGTH,
        }
    }
}

/// Performs one request/response exchange over a fresh TCP connection.
///
/// The request is written as a single frame. The reply header is read first,
/// then the body in `chunk_size` reads, each bounded by `chunk_timeout`. The
/// loop ends on end-of-stream, on a read shorter than requested, or once the
/// declared length has arrived. Anything short of the declared length is
/// [`KasaError::Truncated`]; a stalled read is [`KasaError::Timeout`].
pub async fn request(addr: SocketAddr, plaintext: &[u8], config: &StreamConfig) -> Result<Bytes> {
    let mut stream = timeout(config.connect_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| KasaError::Timeout {
            addr,
            phase: Phase::Connect,
            after: config.connect_timeout,
        })?
        .map_err(|source| KasaError::Connect { addr, source })?;

    let mut codec = FrameCodec::new(config.max_response_length);
    let mut frame = BytesMut::with_capacity(HEADER_SIZE + plaintext.len());
    codec.encode(plaintext, &mut frame)?;

    timeout(config.chunk_timeout, stream.write_all(&frame))
        .await
        .map_err(|_| KasaError::Timeout {
            addr,
            phase: Phase::Send,
            after: config.chunk_timeout,
        })?
        .map_err(|source| KasaError::Send { addr, source })?;
    trace!(%addr, len = frame.len(), "request written");

    let header = read_header(&mut stream, addr, config.chunk_timeout).await?;
    let expected = declared_length(header, config.max_response_length)?;

    let mut reply = BytesMut::with_capacity(HEADER_SIZE + expected);
    reply.extend_from_slice(&header);

    let mut chunk = vec![0u8; config.chunk_size.max(1)];
    let mut received = 0;
    while received < expected {
        let n = read_some(&mut stream, &mut chunk, addr, config.chunk_timeout).await?;
        if n == 0 {
            trace!(%addr, received, expected, "end of stream");
            break;
        }
        reply.extend_from_slice(&chunk[..n]);
        received += n;

        if n < chunk.len() {
            break;
        }
        if received < expected {
            time::sleep(config.chunk_pause).await;
        }
    }

    match codec.decode(&mut reply)? {
        Some(body) => {
            debug!(%addr, len = body.len(), "response received");
            Ok(body)
        }
        None => Err(KasaError::Truncated {
            addr,
            expected,
            received,
        }),
    }
}

async fn read_header(
    stream: &mut TcpStream,
    addr: SocketAddr,
    deadline: Duration,
) -> Result<[u8; HEADER_SIZE]> {
    let mut header = [0u8; HEADER_SIZE];
    let mut filled = 0;
    while filled < HEADER_SIZE {
        let n = read_some(stream, &mut header[filled..], addr, deadline).await?;
        if n == 0 {
            return Err(KasaError::IncompleteHeader {
                addr,
                received: filled,
            });
        }
        filled += n;
    }
    Ok(header)
}

async fn read_some(
    stream: &mut TcpStream,
    buf: &mut [u8],
    addr: SocketAddr,
    deadline: Duration,
) -> Result<usize> {
    timeout(deadline, stream.read(buf))
        .await
        .map_err(|_| KasaError::Timeout {
            addr,
            phase: Phase::Read,
            after: deadline,
        })?
        .map_err(|source| KasaError::Read { addr, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasa_proto::ProtoError;
    use kasa_proto::protocol::codec::encode_stream;
    use kasa_proto::protocol::crypto::scramble;
    use tokio::net::TcpListener;

    const SYSINFO_QUERY: &[u8] = br#"{"system":{"get_sysinfo":{}}}"#;

    fn fast_config() -> StreamConfig {
        StreamConfig {
            chunk_timeout: Duration::from_millis(500),
            chunk_pause: Duration::from_millis(10),
            ..Default::default()
        }
    }

    /// Accepts one connection, reads one request frame, then writes `reply`
    /// verbatim and closes.
    async fn mock_device(reply: Vec<u8>) -> (SocketAddr, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut header = [0u8; 4];
            socket.read_exact(&mut header).await.unwrap();
            let mut body = vec![0u8; u32::from_be_bytes(header) as usize];
            socket.read_exact(&mut body).await.unwrap();
            socket.write_all(&reply).await.unwrap();
            socket.shutdown().await.unwrap();
            body
        });
        (addr, handle)
    }

    #[tokio::test]
    async fn test_request_roundtrip() {
        let response = br#"{"system":{"get_sysinfo":{"alias":"Porch","err_code":0}}}"#;
        let (addr, device) = mock_device(encode_stream(response).unwrap().to_vec()).await;

        let body = request(addr, SYSINFO_QUERY, &fast_config()).await.unwrap();
        assert_eq!(&body[..], response);

        let seen = device.await.unwrap();
        assert_eq!(kasa_proto::protocol::crypto::unscramble(&seen), SYSINFO_QUERY);
    }

    #[tokio::test]
    async fn test_multi_chunk_response() {
        let alias = "x".repeat(3000);
        let response = format!(r#"{{"system":{{"get_sysinfo":{{"alias":"{alias}"}}}}}}"#);
        let (addr, _device) = mock_device(encode_stream(response.as_bytes()).unwrap().to_vec()).await;

        let body = request(addr, SYSINFO_QUERY, &fast_config()).await.unwrap();
        assert_eq!(body.len(), response.len());
        assert_eq!(&body[..], response.as_bytes());
    }

    #[tokio::test]
    async fn test_truncated_body_is_an_error() {
        let response = br#"{"system":{"get_sysinfo":{}}}"#;
        let mut reply = (response.len() as u32 + 40).to_be_bytes().to_vec();
        reply.extend_from_slice(&scramble(response));
        let (addr, _device) = mock_device(reply).await;

        let err = request(addr, SYSINFO_QUERY, &fast_config()).await.unwrap_err();
        match err {
            KasaError::Truncated {
                expected, received, ..
            } => {
                assert_eq!(expected, response.len() + 40);
                assert_eq!(received, response.len());
            }
            other => panic!("expected truncated error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_incomplete_header() {
        let (addr, _device) = mock_device(vec![0, 0]).await;
        let err = request(addr, SYSINFO_QUERY, &fast_config()).await.unwrap_err();
        assert!(matches!(err, KasaError::IncompleteHeader { received: 2, .. }));
    }

    #[tokio::test]
    async fn test_oversized_length_rejected() {
        let (addr, _device) = mock_device(u32::MAX.to_be_bytes().to_vec()).await;
        let err = request(addr, SYSINFO_QUERY, &fast_config()).await.unwrap_err();
        assert!(matches!(
            err,
            KasaError::Proto(ProtoError::InvalidLength(..))
        ));
    }

    #[tokio::test]
    async fn test_stalled_device_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _device = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let err = request(addr, SYSINFO_QUERY, &fast_config()).await.unwrap_err();
        assert!(matches!(
            err,
            KasaError::Timeout {
                phase: Phase::Read,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Grab a free port, then close it so nothing is listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = request(addr, SYSINFO_QUERY, &fast_config()).await.unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Connect));
    }
}
