//! Client-address helpers: binary encoding and address-range policy.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Encodes an address in the 16-byte form the audit log stores.
/// IPv4 addresses are stored IPv4-mapped.
pub fn to_binary16(ip: IpAddr) -> [u8; 16] {
    match ip {
        IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
        IpAddr::V6(v6) => v6.octets(),
    }
}

/// Decodes the audit log's 16-byte form, mapping IPv4-mapped addresses
/// back to IPv4. Returns `None` for slices of the wrong length.
pub fn from_binary16(bytes: &[u8]) -> Option<IpAddr> {
    let octets: [u8; 16] = bytes.try_into().ok()?;
    let v6 = Ipv6Addr::from(octets);
    Some(match v6.to_ipv4_mapped() {
        Some(v4) => IpAddr::V4(v4),
        None => IpAddr::V6(v6),
    })
}

/// Addresses the outbound redirect policy refuses as destinations:
/// 127.0.0.0/8, 10.0.0.0/8, 192.168.0.0/16 and 172.16.0.0/12.
pub fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private()
}

/// IPv6 destinations treated the same way: loopback, unique-local
/// (fc00::/7), link-local (fe80::/10), and IPv4-mapped forms of the
/// blocked IPv4 ranges.
pub fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if ip.is_loopback() {
        return true;
    }
    let first = ip.segments()[0];
    if first & 0xfe00 == 0xfc00 || first & 0xffc0 == 0xfe80 {
        return true;
    }
    ip.to_ipv4_mapped().is_some_and(is_blocked_ipv4)
}

/// Whether an address may be handed to the external geolocation service.
pub fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_documentation()
                || v4.is_unspecified())
        }
        IpAddr::V6(v6) => !(is_blocked_ipv6(v6) || v6.is_unspecified()),
    }
}
