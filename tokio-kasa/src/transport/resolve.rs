use std::net::{IpAddr, Ipv4Addr};

use tokio::net::lookup_host;

use crate::error::{KasaError, Result};

/// Resolves a literal address or hostname to its first IPv4 address.
///
/// Devices only speak IPv4, so AAAA results are skipped.
pub async fn resolve_ipv4(host: &str) -> Result<Ipv4Addr> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }

    let addrs = lookup_host((host, 0))
        .await
        .map_err(|source| KasaError::Resolve {
            host: host.to_string(),
            source,
        })?;

    addrs
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| KasaError::NoIpv4Address(host.to_string()))
}
