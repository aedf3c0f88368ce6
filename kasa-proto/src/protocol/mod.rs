//! Wire-level pieces of the protocol: constants, scrambling and framing.

pub mod codec;
pub mod constants;
pub mod crypto;

pub use codec::FrameCodec;
