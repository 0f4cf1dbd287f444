use std::net::Ipv4Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Number of addresses covered, both ends included.
    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start {
            return 0;
        }
        u64::from(end - start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = pnet::ipnetwork::Ipv4Network::new(ip, prefix)?;
    let start = network.network();
    let end = network.broadcast();

    Ok(Ipv4Range::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_range_covers_whole_block() {
        let range = cidr_range(Ipv4Addr::new(10, 0, 0, 5), 24).unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(range.end_addr, Ipv4Addr::new(10, 0, 0, 255));
        assert_eq!(range.len(), 256);

        let single = cidr_range(Ipv4Addr::new(10, 0, 0, 5), 32).unwrap();
        assert_eq!(single.len(), 1);

        assert!(cidr_range(Ipv4Addr::new(10, 0, 0, 0), 33).is_err());
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 9), Ipv4Addr::new(10, 0, 0, 1));
        assert!(range.is_empty());
    }

    #[test]
    fn whole_address_space_does_not_overflow() {
        let range = cidr_range(Ipv4Addr::UNSPECIFIED, 0).unwrap();
        assert_eq!(range.len(), 1 << 32);
    }
}
