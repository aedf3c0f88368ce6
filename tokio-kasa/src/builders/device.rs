use std::time::Duration;

use crate::device::DeviceConfig;
use crate::transport::StreamConfig;

/// Configuration builder for [`crate::Device`].
#[derive(Debug, Clone)]
pub struct DeviceConfigBuilder {
    port: u16,
    connect_timeout: Duration,
    chunk_timeout: Duration,
    chunk_size: usize,
    chunk_pause: Duration,
    max_response_length: usize,
    child_id: Option<String>,
}

impl Default for DeviceConfigBuilder {
    /// Creates a [`DeviceConfigBuilder`] pre-populated with the library's default device settings.
    fn default() -> Self {
        let config = DeviceConfig::default();
        Self {
            port: config.port,
            connect_timeout: config.stream.connect_timeout,
            chunk_timeout: config.stream.chunk_timeout,
            chunk_size: config.stream.chunk_size,
            chunk_pause: config.stream.chunk_pause,
            max_response_length: config.stream.max_response_length,
            child_id: config.child_id,
        }
    }
}

impl From<DeviceConfigBuilder> for DeviceConfig {
    fn from(builder: DeviceConfigBuilder) -> Self {
        builder.build()
    }
}

impl DeviceConfigBuilder {
    /// Creates a new [`DeviceConfigBuilder`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the device port for both TCP and UDP.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the TCP handshake timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the deadline for the request write and each reply read.
    pub fn chunk_timeout(mut self, timeout: Duration) -> Self {
        self.chunk_timeout = timeout;
        self
    }

    /// Sets both the connect and the per-read timeout.
    ///
    /// This is the single "per-call timeout" most callers want.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.connect_timeout(timeout).chunk_timeout(timeout)
    }

    /// Sets the number of bytes requested per reply read. Zero is treated as one.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Sets the pause after a full chunk.
    pub fn chunk_pause(mut self, pause: Duration) -> Self {
        self.chunk_pause = pause;
        self
    }

    /// Sets the largest reply accepted.
    pub fn max_response_length(mut self, len: usize) -> Self {
        self.max_response_length = len;
        self
    }

    /// Scopes every command to one outlet.
    pub fn child_id(mut self, id: impl Into<String>) -> Self {
        self.child_id = Some(id.into());
        self
    }

    /// Constructs a [`DeviceConfig`] from this builder.
    pub fn build(self) -> DeviceConfig {
        DeviceConfig {
            port: self.port,
            stream: StreamConfig {
                connect_timeout: self.connect_timeout,
                chunk_timeout: self.chunk_timeout,
                chunk_size: self.chunk_size,
                chunk_pause: self.chunk_pause,
                max_response_length: self.max_response_length,
            },
            child_id: self.child_id,
        }
    }
}
