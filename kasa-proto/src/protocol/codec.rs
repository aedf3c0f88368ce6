//! Length-prefixed framing for the stream transport.
//!
//! A stream frame is a 4-byte big-endian length of the plaintext followed by
//! that many scrambled bytes. Datagrams carry the scrambled bytes alone.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use super::constants::{HEADER_SIZE, MAX_FRAME_LENGTH};
use super::crypto::{scramble_into, unscramble_in_place};
use crate::error::{ProtoError, Result};

/// Encodes `plaintext` as a stream frame.
///
/// The prefix is computed from the plaintext before scrambling; since the
/// cipher preserves length, it also equals the body length on the wire. An
/// empty payload is rejected, matching what [`declared_length`] accepts.
pub fn encode_stream(plaintext: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(HEADER_SIZE + plaintext.len());
    FrameCodec::default().encode(plaintext, &mut dst)?;
    Ok(dst.freeze())
}

/// Encodes `plaintext` as a datagram payload: scrambled bytes, no prefix.
pub fn encode_datagram(plaintext: &[u8]) -> Bytes {
    let mut dst = BytesMut::with_capacity(plaintext.len());
    scramble_into(plaintext, &mut dst);
    dst.freeze()
}

/// Reads the declared body length from a frame header.
///
/// Fails with [`ProtoError::InvalidLength`] when the value is zero or exceeds
/// `max`. Devices never send an empty reply.
pub fn declared_length(header: [u8; HEADER_SIZE], max: usize) -> Result<usize> {
    let len = u32::from_be_bytes(header) as usize;
    if len == 0 || len > max {
        return Err(ProtoError::InvalidLength(len, max));
    }
    Ok(len)
}

/// A codec for stream frames.
///
/// Decoding yields the unscrambled body of one complete frame; encoding
/// writes the prefix and the scrambled body. Both sides reject zero-length
/// bodies with [`ProtoError::InvalidLength`], so every encoded frame decodes. Usable with
/// [`tokio_util::codec::Framed`] or directly on an accumulated buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_length: usize,
}

impl FrameCodec {
    /// Creates a codec that rejects frames longer than `max_length`.
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(MAX_FRAME_LENGTH)
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = ProtoError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let mut header = [0u8; HEADER_SIZE];
        header.copy_from_slice(&src[..HEADER_SIZE]);
        let len = declared_length(header, self.max_length)?;

        if src.len() < HEADER_SIZE + len {
            trace!(have = src.len() - HEADER_SIZE, want = len, "partial frame");
            src.reserve(HEADER_SIZE + len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        let mut body = src.split_to(len);
        unscramble_in_place(&mut body);
        Ok(Some(body.freeze()))
    }
}

impl<T: AsRef<[u8]>> Encoder<T> for FrameCodec {
    type Error = ProtoError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<()> {
        let plaintext = item.as_ref();
        if plaintext.is_empty() {
            return Err(ProtoError::InvalidLength(0, self.max_length));
        }
        let len = u32::try_from(plaintext.len())
            .map_err(|_| ProtoError::PayloadTooLarge(plaintext.len()))?;

        dst.reserve(HEADER_SIZE + plaintext.len());
        dst.put_u32(len);
        scramble_into(plaintext, dst);
        Ok(())
    }
}
