use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::discovery::DiscoveryConfig;

/// Configuration builder for [`crate::discovery::discover`].
#[derive(Debug, Clone)]
pub struct DiscoveryConfigBuilder {
    timeout: Duration,
    probes: u32,
    port: u16,
    targets: Option<Vec<Ipv4Addr>>,
    bind_addr: SocketAddr,
    buffer_size: usize,
}

impl Default for DiscoveryConfigBuilder {
    /// Creates a [`DiscoveryConfigBuilder`] pre-populated with the library's default scan settings.
    fn default() -> Self {
        let config = DiscoveryConfig::default();
        Self {
            timeout: config.timeout,
            probes: config.probes,
            port: config.port,
            targets: config.targets,
            bind_addr: config.bind_addr,
            buffer_size: config.buffer_size,
        }
    }
}

impl From<DiscoveryConfigBuilder> for DiscoveryConfig {
    fn from(builder: DiscoveryConfigBuilder) -> Self {
        builder.build()
    }
}

impl DiscoveryConfigBuilder {
    /// Creates a new [`DiscoveryConfigBuilder`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total time budget of the scan.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of probe rounds. Extra rounds help on lossy Wi-Fi.
    pub fn probes(mut self, probes: u32) -> Self {
        self.probes = probes;
        self
    }

    /// Sets the port probes are sent to.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Adds one explicit probe destination.
    ///
    /// Once any target is set, interface broadcast addresses are no longer
    /// probed.
    pub fn target(mut self, ip: Ipv4Addr) -> Self {
        self.targets.get_or_insert_with(Vec::new).push(ip);
        self
    }

    /// Sets the local address of the scan socket.
    pub fn bind_addr(mut self, addr: impl Into<SocketAddr>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Sets the receive buffer size.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Constructs a [`DiscoveryConfig`] from this builder.
    pub fn build(self) -> DiscoveryConfig {
        DiscoveryConfig {
            timeout: self.timeout,
            probes: self.probes,
            port: self.port,
            targets: self.targets,
            bind_addr: self.bind_addr,
            buffer_size: self.buffer_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_accumulate() {
        let config = DiscoveryConfigBuilder::new()
            .target(Ipv4Addr::new(10, 0, 0, 255))
            .target(Ipv4Addr::new(10, 0, 1, 255))
            .build();
        assert_eq!(config.targets.map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_defaults_broadcast() {
        let config: DiscoveryConfig = DiscoveryConfigBuilder::new()
            .timeout(Duration::from_secs(4))
            .probes(3)
            .into();
        assert!(config.targets.is_none());
        assert_eq!(config.probe_interval(), Duration::from_secs(1));
    }
}
