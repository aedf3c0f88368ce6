//! Broadcast discovery.
//!
//! A scan runs two halves concurrently over one UDP socket:
//!
//! - the **prober**, a spawned task, sends the probe to every broadcast
//!   address `probes` times, recomputing the address set each round and
//!   sleeping `timeout / (probes + 1)` in between;
//! - the **collector**, on the calling task, decodes every reply that arrives
//!   before the deadline and keeps the probe's result per sender address.
//!
//! The socket is bound before the first probe is sent, so no reply can be
//! missed. Devices answer to the source port of the probe, which is why the
//! prober sends through the collector's socket rather than its own.

use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use kasa_proto::protocol::codec::encode_datagram;
use kasa_proto::protocol::crypto::unscramble_in_place;
use kasa_proto::response::{DimmerParameters, EmeterRealtime, StaInfo, Sysinfo};
use kasa_proto::{Envelope, Request};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

use crate::constants::{DATAGRAM_BUFFER_SIZE, DEFAULT_PORT, DISCOVERY_PROBES, DISCOVERY_TIMEOUT};
use crate::error::{KasaError, Result};

mod probe;
pub mod subnet;

pub use probe::{DimmerProbe, EmeterProbe, Probe, SysinfoProbe, WifiProbe};

/// Responders keyed by their dotted-quad IPv4 address.
pub type Discovered<T> = HashMap<String, T>;

/// Configuration for a discovery scan.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Total time budget. The scan always runs for this long.
    pub timeout: Duration,
    /// Number of probe rounds.
    pub probes: u32,
    /// Destination port of the probes.
    pub port: u16,
    /// Explicit probe destinations. When set, these replace the enumerated
    /// broadcast addresses, which allows directed scans across routers that
    /// drop broadcasts.
    pub targets: Option<Vec<Ipv4Addr>>,
    /// Local address of the scan socket.
    pub bind_addr: SocketAddr,
    /// Receive buffer size; longer datagrams are truncated and then fail to
    /// parse.
    pub buffer_size: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: DISCOVERY_TIMEOUT,
            probes: DISCOVERY_PROBES,
            port: DEFAULT_PORT,
            targets: None,
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            buffer_size: DATAGRAM_BUFFER_SIZE,
        }
    }
}

impl DiscoveryConfig {
    fn probe_targets(&self) -> Result<Vec<Ipv4Addr>> {
        match &self.targets {
            Some(targets) => Ok(targets.clone()),
            None => subnet::broadcast_addresses(),
        }
    }

    /// Pause between probe rounds.
    pub fn probe_interval(&self) -> Duration {
        self.timeout / self.probes.saturating_add(1)
    }
}

/// Runs one scan and returns every device that answered with a usable result.
///
/// An empty map is a normal outcome. Replies that fail to decode, or whose
/// module or action reports a non-zero `err_code`, are skipped. When one
/// device answers more than once, its last reply wins.
///
/// Errors are only returned for failures before the first probe is sent:
/// binding the socket, enumerating interfaces or encoding the probe.
pub async fn discover<P: Probe>(probe: &P, config: &DiscoveryConfig) -> Result<Discovered<P::Output>> {
    let payload = encode_datagram(Request::new(probe.command()).to_json()?.as_bytes());
    let targets = config.probe_targets()?;

    let socket = UdpSocket::bind(config.bind_addr).await.map_err(KasaError::Bind)?;
    socket.set_broadcast(true).map_err(KasaError::Bind)?;
    let socket = Arc::new(socket);

    debug!(
        targets = targets.len(),
        probes = config.probes,
        timeout = ?config.timeout,
        "starting discovery"
    );

    let deadline = Instant::now() + config.timeout;
    let _prober = AbortOnDrop(tokio::spawn(run_prober(
        socket.clone(),
        payload,
        targets,
        config.clone(),
    )));

    let found = collect(probe, &socket, deadline, config.buffer_size).await;
    debug!(found = found.len(), "discovery finished");
    Ok(found)
}

/// Scans for general device information.
pub async fn discover_sysinfo(config: &DiscoveryConfig) -> Result<Discovered<Sysinfo>> {
    discover(&SysinfoProbe, config).await
}

/// Scans for dimmers and their fade settings.
pub async fn discover_dimmers(config: &DiscoveryConfig) -> Result<Discovered<DimmerParameters>> {
    discover(&DimmerProbe, config).await
}

/// Scans for Wi-Fi station status.
pub async fn discover_wifi(config: &DiscoveryConfig) -> Result<Discovered<StaInfo>> {
    discover(&WifiProbe, config).await
}

/// Scans for energy-meter readings. Devices without a meter are left out.
pub async fn discover_emeter(config: &DiscoveryConfig) -> Result<Discovered<EmeterRealtime>> {
    discover(&EmeterProbe, config).await
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn run_prober(
    socket: Arc<UdpSocket>,
    payload: Bytes,
    mut targets: Vec<Ipv4Addr>,
    config: DiscoveryConfig,
) {
    let interval = config.probe_interval();

    for round in 0..config.probes {
        if round > 0 {
            // Interfaces may have come and gone since the last round.
            targets = match config.probe_targets() {
                Ok(targets) => targets,
                Err(err) => {
                    warn!(%err, round, "stopping prober");
                    return;
                }
            };
        }

        for ip in &targets {
            let addr = SocketAddr::from((*ip, config.port));
            if let Err(err) = socket.send_to(&payload, addr).await {
                warn!(%addr, %err, round, "probe send failed, stopping prober");
                return;
            }
        }
        trace!(round, targets = targets.len(), "probe round sent");

        time::sleep(interval).await;
    }
}

async fn collect<P: Probe>(
    probe: &P,
    socket: &UdpSocket,
    deadline: Instant,
    buffer_size: usize,
) -> Discovered<P::Output> {
    let mut found = Discovered::new();
    let mut buf = vec![0u8; buffer_size.max(1)];

    loop {
        let (n, from) = match time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
            Err(_elapsed) => break,
            Ok(Ok(received)) => received,
            // ICMP unreachable from an earlier probe, reported on some platforms.
            Ok(Err(err))
                if matches!(
                    err.kind(),
                    io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused
                ) =>
            {
                continue;
            }
            Ok(Err(err)) => {
                warn!(%err, "discovery receive failed");
                break;
            }
        };

        let datagram = &mut buf[..n];
        unscramble_in_place(datagram);

        let envelope = match Envelope::parse(datagram) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(%from, %err, "skipping malformed reply");
                continue;
            }
        };

        match probe.extract(envelope) {
            Some(output) => {
                trace!(%from, "reply accepted");
                found.insert(from.ip().to_string(), output);
            }
            None => debug!(%from, "skipping reply without a usable result"),
        }
    }

    found
}
