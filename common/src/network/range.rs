//! # IPv4 Range Model
//!
//! An inclusive range of IPv4 addresses as submitted to a discovery agent,
//! together with the target count computation used to seed job progress.

use std::fmt;
use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::RangeError;

/// An inclusive IPv4 range. `start_addr` may be numerically above `end_addr`;
/// such a range is kept as given and sized by absolute difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl IpRange {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn single(addr: Ipv4Addr) -> Self {
        Self::new(addr, addr)
    }

    /// Number of addresses covered, always at least 1.
    pub fn size(&self) -> u64 {
        range_size(self.start_addr, self.end_addr)
    }

    pub fn is_reversed(&self) -> bool {
        u32::from(self.start_addr) > u32::from(self.end_addr)
    }

    /// Numerically lowest address of the range.
    pub fn lower(&self) -> Ipv4Addr {
        self.start_addr.min(self.end_addr)
    }

    /// Numerically highest address of the range.
    pub fn upper(&self) -> Ipv4Addr {
        self.start_addr.max(self.end_addr)
    }

    /// The address `offset` positions after the lower bound, clamped to the
    /// upper bound.
    pub fn addr_at(&self, offset: u64) -> Ipv4Addr {
        let lower = u64::from(u32::from(self.lower()));
        let upper = u64::from(u32::from(self.upper()));
        let addr = lower.saturating_add(offset).min(upper);
        Ipv4Addr::from(addr as u32)
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_addr == self.end_addr {
            write!(f, "{}", self.start_addr)
        } else {
            write!(f, "{}-{}", self.start_addr, self.end_addr)
        }
    }
}

/// Size of the inclusive range between two addresses, in either order.
///
/// Addresses sharing their first three octets take the last-octet shortcut;
/// everything else goes through the 32-bit integer form. The result is a
/// `u64` so that `0.0.0.0-255.255.255.255` (2^32 addresses) fits.
pub fn range_size(start: Ipv4Addr, end: Ipv4Addr) -> u64 {
    let (s, e) = (start.octets(), end.octets());
    if s[..3] == e[..3] {
        return u64::from(s[3].abs_diff(e[3])) + 1;
    }

    let start_u32: u32 = start.into();
    let end_u32: u32 = end.into();
    u64::from(start_u32.abs_diff(end_u32)) + 1
}

/// Creates a range from an IP and a CIDR prefix (e.g., 192.168.1.0/24).
///
/// Returns the range covering the entire network block.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> Result<IpRange, RangeError> {
    let network = Ipv4Network::new(ip, prefix).map_err(|_| RangeError::InvalidPrefix {
        input: format!("{ip}/{prefix}"),
    })?;

    Ok(IpRange::new(network.network(), network.broadcast()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_same_subnet() {
        let start = Ipv4Addr::new(192, 168, 1, 10);
        let end = Ipv4Addr::new(192, 168, 1, 14);
        assert_eq!(range_size(start, end), 5);
        assert_eq!(IpRange::new(start, end).size(), 5);
    }

    #[test]
    fn test_size_single_address() {
        let ip = Ipv4Addr::new(10, 0, 0, 5);
        assert_eq!(range_size(ip, ip), 1);
        assert_eq!(IpRange::single(ip).size(), 1);
    }

    #[test]
    fn test_size_across_octets() {
        let start = Ipv4Addr::new(10, 0, 0, 250);
        let end = Ipv4Addr::new(10, 0, 1, 5);
        assert_eq!(range_size(start, end), 12);

        let start = Ipv4Addr::new(10, 0, 0, 0);
        let end = Ipv4Addr::new(10, 0, 255, 255);
        assert_eq!(range_size(start, end), 65_536);
    }

    #[test]
    fn test_size_matches_integer_form() {
        let pairs = [
            (Ipv4Addr::new(1, 2, 3, 4), Ipv4Addr::new(1, 2, 3, 200)),
            (Ipv4Addr::new(172, 16, 0, 1), Ipv4Addr::new(172, 31, 255, 254)),
            (Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(8, 8, 4, 4)),
        ];
        for (start, end) in pairs {
            let expected = u64::from(u32::from(start).abs_diff(u32::from(end))) + 1;
            assert_eq!(range_size(start, end), expected, "{start}-{end}");
        }
    }

    #[test]
    fn test_size_reversed_range() {
        let start = Ipv4Addr::new(192, 168, 1, 14);
        let end = Ipv4Addr::new(192, 168, 1, 10);
        let range = IpRange::new(start, end);
        assert!(range.is_reversed());
        assert_eq!(range.size(), 5);
        assert_eq!(range.lower(), end);
        assert_eq!(range.upper(), start);
    }

    #[test]
    fn test_size_full_address_space() {
        let range = IpRange::new(Ipv4Addr::new(0, 0, 0, 0), Ipv4Addr::BROADCAST);
        assert_eq!(range.size(), 1 << 32);
    }

    #[test]
    fn test_addr_at_clamps_to_upper() {
        let range = IpRange::new(Ipv4Addr::new(10, 0, 0, 250), Ipv4Addr::new(10, 0, 1, 2));
        assert_eq!(range.addr_at(0), Ipv4Addr::new(10, 0, 0, 250));
        assert_eq!(range.addr_at(6), Ipv4Addr::new(10, 0, 1, 0));
        assert_eq!(range.addr_at(500), Ipv4Addr::new(10, 0, 1, 2));
        assert_eq!(range.addr_at(range.size() - 1), range.upper());
    }

    #[test]
    fn test_cidr_range() {
        let range = cidr_range(Ipv4Addr::new(192, 168, 1, 77), 24).unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(range.end_addr, Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(range.size(), 256);
        assert!(cidr_range(Ipv4Addr::new(10, 0, 0, 0), 33).is_err());
    }
}
