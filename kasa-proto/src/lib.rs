//! Sans-IO implementation of the Kasa local control protocol.
//!
//! This crate contains everything that does not touch a socket:
//! - [`protocol::crypto`] for the XOR autokey scrambling applied to every payload
//! - [`protocol::codec`] for the length-prefixed stream framing
//! - [`command`] for the typed command catalog and the child-relay context envelope
//! - [`response`] for the response envelope and the per-module records
//!
//! The tokio transport and the broadcast discovery engine live in `tokio-kasa`.
//!
//! ## Example
//!
//! ```rust
//! use kasa_proto::{Command, Request, protocol::crypto};
//!
//! let request = Request::new(Command::SetRelayState(true)).child("8006...00");
//! let plaintext = request.to_json().unwrap();
//! let wire = crypto::scramble(plaintext.as_bytes());
//! assert_eq!(crypto::unscramble(&wire), plaintext.as_bytes());
//! ```

pub mod command;
pub mod error;
pub mod protocol;
pub mod response;

pub use command::{Command, Request};
pub use error::{ProtoError, Result};
pub use response::Envelope;
