//! Autokey XOR scrambling applied to every payload.
//!
//! The device protocol obfuscates JSON with a single-byte autokey stream: the
//! key starts at [`INITIAL_KEY`] for each payload and is advanced by the
//! *ciphertext* byte, on both the encoding and the decoding side. This is
//! obfuscation only and offers no confidentiality.

use bytes::BufMut;

use super::constants::INITIAL_KEY;

/// Scrambles `plaintext` into a freshly allocated buffer.
///
/// Each output byte is `key ^ input`, and the output byte becomes the key for
/// the next position. The output has the same length as the input.
///
/// # Examples
///
/// ```
/// use kasa_proto::protocol::crypto::scramble;
///
/// let wire = scramble(b"{}");
/// assert_eq!(wire[0], 0xAB ^ b'{');
/// assert_eq!(wire[1], wire[0] ^ b'}');
/// ```
pub fn scramble(plaintext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(plaintext.len());
    scramble_into(plaintext, &mut out);
    out
}

/// Scrambles `plaintext` and appends the ciphertext to `dst`.
pub fn scramble_into<B: BufMut>(plaintext: &[u8], dst: &mut B) {
    let mut key = INITIAL_KEY;
    for &byte in plaintext {
        key ^= byte;
        dst.put_u8(key);
    }
}

/// Reverses [`scramble`], returning the plaintext in a new buffer.
///
/// # Examples
///
/// ```
/// use kasa_proto::protocol::crypto::{scramble, unscramble};
///
/// let json = br#"{"system":{"get_sysinfo":{}}}"#;
/// assert_eq!(unscramble(&scramble(json)), json);
/// ```
pub fn unscramble(ciphertext: &[u8]) -> Vec<u8> {
    let mut out = ciphertext.to_vec();
    unscramble_in_place(&mut out);
    out
}

/// Reverses [`scramble`] in place.
///
/// The key advances with the *input* byte, which is why the original value is
/// captured before it is overwritten.
pub fn unscramble_in_place(buf: &mut [u8]) {
    let mut key = INITIAL_KEY;
    for byte in buf.iter_mut() {
        let next = *byte;
        *byte ^= key;
        key = next;
    }
}
