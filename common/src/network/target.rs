//! # Range Parsing
//!
//! Turns user input into an [`IpRange`]. Accepted forms:
//! * A single IPv4 address (`192.168.1.5`).
//! * A full range (`192.168.1.1-192.168.1.50`).
//! * An abbreviated range (`192.168.1.1-50`, `192.168.1.1-2.50`).
//! * A CIDR block (`192.168.1.0/24`).

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::RangeError;
use crate::network::range::{self, IpRange};

impl FromStr for IpRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RangeError::Empty);
        }

        if let Some(range) = parse_ip_range(s)? {
            return Ok(range);
        }

        if let Some(range) = parse_cidr_range(s)? {
            return Ok(range);
        }

        parse_addr(s).map(IpRange::single)
    }
}

/// Builds a range from its start and (possibly abbreviated) end.
fn parse_bounds(start: &str, end: &str) -> Result<IpRange, RangeError> {
    let start_addr = parse_addr(start.trim())?;
    let end_addr = parse_range_end_addr(end.trim(), &start_addr)?;
    Ok(IpRange::new(start_addr, end_addr))
}

fn parse_addr(s: &str) -> Result<Ipv4Addr, RangeError> {
    s.parse::<Ipv4Addr>()
        .map_err(|e| RangeError::InvalidAddress {
            input: s.to_string(),
            reason: e.to_string(),
        })
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(s: &str) -> Result<Option<IpRange>, RangeError> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    parse_bounds(start_str, end_str).map(Some)
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(end_str: &str, start_addr: &Ipv4Addr) -> Result<Ipv4Addr, RangeError> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    let invalid = |reason: String| RangeError::InvalidEnd {
        input: end_str.to_string(),
        reason,
    };

    if end_str.is_empty() {
        return Err(invalid("end of range cannot be empty".into()));
    }

    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| invalid(e.to_string()))?;

    if partial_octets.len() > 4 {
        return Err(invalid("too many octets".into()));
    }

    let mut end_octets = start_addr.octets();
    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr_range(s: &str) -> Result<Option<IpRange>, RangeError> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let ipv4_addr = parse_addr(ip_str.trim())?;
    let prefix = prefix_str
        .trim()
        .parse::<u8>()
        .map_err(|_| RangeError::InvalidPrefix {
            input: s.to_string(),
        })?;

    range::cidr_range(ipv4_addr, prefix).map(Some)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
