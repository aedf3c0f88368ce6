//! Tokio-based client for the Kasa local control protocol.
//!
//! This crate provides the IO half of the protocol on top of `kasa-proto`:
//! - [`transport`] for one-shot TCP request/response and UDP fire-and-forget
//! - [`discovery`] for broadcast probing of every local IPv4 subnet
//! - [`Device`] for typed operations against a single device
//!
//! The library emits `tracing` events and never installs a subscriber; the
//! application decides where logs go.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tokio_kasa::{Device, discovery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let found = discovery::discover_sysinfo(&Default::default()).await?;
//!     for (ip, info) in &found {
//!         println!("{ip}: {} {}", info.model, info.alias);
//!     }
//!
//!     let plug = Device::resolve("192.168.1.20").await?;
//!     plug.set_relay_state(true).await?;
//!     Ok(())
//! }
//! ```

pub mod builders;
pub mod constants;
pub mod device;
pub mod discovery;
pub mod error;
pub mod transport;

pub use builders::{DeviceConfigBuilder, DiscoveryConfigBuilder};
pub use device::{Device, DeviceConfig};
pub use discovery::{DiscoveryConfig, Probe};
pub use error::{KasaError, Phase, Result};
pub use transport::{Mode, send_request};

pub use kasa_proto as proto;
