//! Re-exports the [`kasa_proto`] and [`tokio_kasa`] libraries for convenient access to the Kasa
//! local protocol types and the tokio client.
#[cfg(feature = "kasa-proto")]
pub use kasa_proto;
#[cfg(feature = "tokio-kasa")]
pub use tokio_kasa;
