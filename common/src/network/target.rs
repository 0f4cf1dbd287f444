//! # Scan Target Model
//!
//! Parses the target half of an inventory entry into something we can count
//! hosts on. The engine receives the original text untouched; this model only
//! exists to validate it and to know how many machines a unit covers.
//!
//! Supported forms:
//! * A single IPv4/IPv6 address (e.g. `10.0.0.5`, `::1`).
//! * A hostname (e.g. `mail.example.org`).
//! * A CIDR block (e.g. `192.168.1.0/24`, `2001:db8::/120`, `scanme.example.org/28`).
//! * A dash range (e.g. `192.168.1.1-100`, `192.168.1.1-192.168.1.100`).
//! * An octet pattern (e.g. `10.0-3.1.1-254`, `10.0.0.1,5,9`, `10.0.*.1`).

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use pnet::ipnetwork::Ipv6Network;
use std::str::FromStr;

use crate::network::range::{self, Ipv4Range};

/// Represents a distinct target handed to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A single specific host.
    Host { target_addr: IpAddr },
    /// A host known only by name.
    Hostname { name: String },
    /// A contiguous range of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
    /// An IPv6 CIDR block.
    Ipv6Block { network: Ipv6Network },
    /// A hostname with a prefix; the engine resolves it and scans the block
    /// around the IPv4 address.
    NamedBlock { name: String, prefix: u8 },
    /// An nmap style pattern where each octet may hold lists and ranges.
    Octets { counts: [u16; 4] },
}

impl Target {
    /// Number of machines the engine will probe for this target.
    pub fn host_count(&self) -> u64 {
        match self {
            Target::Host { .. } | Target::Hostname { .. } => 1,
            Target::Range { ipv4_range } => ipv4_range.len(),
            Target::Ipv6Block { network } => {
                let host_bits = 128 - u32::from(network.prefix());
                1u128
                    .checked_shl(host_bits)
                    .and_then(|n| u64::try_from(n).ok())
                    .unwrap_or(u64::MAX)
            }
            Target::NamedBlock { prefix, .. } => 1u64 << (32 - u32::from(*prefix)),
            Target::Octets { counts } => counts.iter().map(|c| u64::from(*c)).product(),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty target".to_string());
        }

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_octets(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_hostname(s) {
            return Ok(target);
        }

        Err(format!("invalid target: {s}"))
    }
}

/// Splits an inventory entry into its target and an optional inline port spec.
///
/// `10.0.0.0/24:22,80` yields `("10.0.0.0/24", Some("22,80"))`. A bare IPv6
/// address or the address of an IPv6 block keeps its colons.
pub fn split_port_spec(entry: &str) -> (&str, Option<&str>) {
    let entry = entry.trim();
    if entry.parse::<IpAddr>().is_ok() {
        return (entry, None);
    }

    let search_from = match entry.split_once('/') {
        Some((addr, _)) if addr.parse::<IpAddr>().is_ok() => addr.len(),
        _ => 0,
    };

    match entry[search_from..].find(':') {
        Some(at) => {
            let (target, ports) = entry.split_at(search_from + at);
            let ports = ports[1..].trim();
            (target.trim(), (!ports.is_empty()).then_some(ports))
        }
        None => (entry, None),
    }
}

fn parse_host(s: &str) -> Option<Target> {
    s.parse::<IpAddr>()
        .ok()
        .map(|target_addr| Target::Host { target_addr })
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
///
/// Returns `Ok(None)` when the start is not a full address, leaving the
/// string to the octet pattern parser.
fn parse_ip_range(s: &str) -> Result<Option<Target>, String> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let Ok(start_addr) = start_str.parse::<Ipv4Addr>() else {
        return Ok(None);
    };

    let end_addr = parse_range_end_addr(end_str, &start_addr, s)?;
    if u32::from(end_addr) < u32::from(start_addr) {
        return Err(format!("Range ends before it starts: {s}"));
    }

    let ipv4_range = Ipv4Range::new(start_addr, end_addr);
    Ok(Some(Target::Range { ipv4_range }))
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    original_s: &str,
) -> Result<Ipv4Addr, String> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(format!("End range cannot be empty: {original_s}"));
    }

    let mut end_octets = start_addr.octets();
    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| format!("Invalid end range '{end_str}': {e}"))?;

    if partial_octets.len() > 4 {
        return Err(format!("End range has too many octets: {end_str}"));
    }

    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "192.168.1.0/24", "2001:db8::/120" or
/// "scanme.example.org/28".
fn parse_cidr_range(s: &str) -> Result<Option<Target>, String> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|e| format!("Invalid prefix in CIDR '{prefix_str}': {e}"))?;

    if let Ok(ipv4_addr) = ip_str.parse::<Ipv4Addr>() {
        let ipv4_range = range::cidr_range(ipv4_addr, prefix).map_err(|e| e.to_string())?;
        return Ok(Some(Target::Range { ipv4_range }));
    }

    if let Ok(ipv6_addr) = ip_str.parse::<Ipv6Addr>() {
        let network = Ipv6Network::new(ipv6_addr, prefix).map_err(|e| e.to_string())?;
        return Ok(Some(Target::Ipv6Block { network }));
    }

    match parse_hostname(ip_str) {
        Some(Target::Hostname { name }) if prefix <= 32 => {
            Ok(Some(Target::NamedBlock { name, prefix }))
        }
        Some(_) => Err(format!("Invalid prefix in CIDR '{prefix_str}': more than 32 bits")),
        None => Err(format!("Invalid host in CIDR '{ip_str}'")),
    }
}

/// Parses nmap octet patterns like "10.0-3.1.1,5,9-12".
///
/// Anything that does not have four dot separated, digit-only octets is left
/// to the hostname parser.
fn parse_octets(s: &str) -> Result<Option<Target>, String> {
    let parts: Vec<&str> = s.split('.').collect();
    let looks_numeric = parts.iter().all(|p| {
        !p.is_empty()
            && p
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '-' | ',' | '*'))
    });
    if parts.len() != 4 || !looks_numeric {
        return Ok(None);
    }

    let mut counts = [0u16; 4];
    for (count, part) in counts.iter_mut().zip(&parts) {
        *count = octet_count(part).map_err(|e| format!("Invalid octet '{part}' in '{s}': {e}"))?;
    }

    Ok(Some(Target::Octets { counts }))
}

/// Counts the distinct values a single octet pattern selects.
fn octet_count(part: &str) -> Result<u16, String> {
    let mut selected = [false; 256];

    for item in part.split(',') {
        let (low, high) = match item {
            "*" => (0, 255),
            _ => match item.split_once('-') {
                Some((a, b)) => {
                    let low = if a.is_empty() { 0 } else { parse_octet(a)? };
                    let high = if b.is_empty() { 255 } else { parse_octet(b)? };
                    (low, high)
                }
                None => {
                    let v = parse_octet(item)?;
                    (v, v)
                }
            },
        };

        if high < low {
            return Err(format!("{low}-{high} is reversed"));
        }
        for v in low..=high {
            selected[usize::from(v)] = true;
        }
    }

    Ok(selected.iter().filter(|s| **s).count() as u16)
}

fn parse_octet(s: &str) -> Result<u8, String> {
    s.parse::<u8>().map_err(|e| e.to_string())
}

fn parse_hostname(s: &str) -> Option<Target> {
    let valid_chars = s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));
    let has_letter = s.chars().any(|c| c.is_ascii_alphabetic());

    (valid_chars && has_letter && !s.starts_with(['-', '.'])).then(|| Target::Hostname {
        name: s.to_string(),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
