//! Broadcast address enumeration for every attached IPv4 subnet.

use std::net::Ipv4Addr;

use crate::error::Result;

/// Computes the directed broadcast address of `ip` within `netmask`.
pub fn broadcast_address(ip: Ipv4Addr, netmask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) | !u32::from(netmask))
}

/// Returns the broadcast address of every up, non-loopback IPv4 address.
///
/// Interfaces sharing a subnet yield duplicates; probing one twice is
/// harmless. Failure to enumerate is returned, since discovery would
/// otherwise probe nothing.
#[cfg(unix)]
pub fn broadcast_addresses() -> Result<Vec<Ipv4Addr>> {
    use nix::ifaddrs::getifaddrs;
    use nix::net::if_::InterfaceFlags;

    use crate::error::KasaError;

    let interfaces = getifaddrs().map_err(|errno| KasaError::Interfaces(errno.into()))?;

    let mut broadcasts = Vec::new();
    for ifaddr in interfaces {
        if !ifaddr.flags.contains(InterfaceFlags::IFF_UP) {
            continue;
        }
        let (Some(address), Some(netmask)) = (ifaddr.address, ifaddr.netmask) else {
            continue;
        };
        let (Some(address), Some(netmask)) = (address.as_sockaddr_in(), netmask.as_sockaddr_in())
        else {
            continue;
        };

        let ip = address.ip();
        if ip.is_loopback() {
            continue;
        }
        broadcasts.push(broadcast_address(ip, netmask.ip()));
    }

    tracing::trace!(?broadcasts, "enumerated broadcast addresses");
    Ok(broadcasts)
}

#[cfg(not(unix))]
pub fn broadcast_addresses() -> Result<Vec<Ipv4Addr>> {
    Err(crate::error::KasaError::Interfaces(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "interface enumeration is only implemented on unix",
    )))
}
