use std::net::{Ipv4Addr, Ipv6Addr};

// BSD sockaddr layout: byte 0 is the record length, byte 1 the address
// family. Discovered-service records on the wire use the Darwin family
// constants.
const AF_INET: u8 = 2;
const AF_INET6: u8 = 30;

const INET_ADDR_OFFSET: usize = 4;
const INET6_ADDR_OFFSET: usize = 8;

/// Translates a raw discovered-service socket-address record into its numeric
/// host string. Malformed records and unsupported address families yield
/// `None`; this never panics. Stateless, safe to call from any thread.
pub fn numeric_host(record: &[u8]) -> Option<String> {
    if record.len() < 2 {
        return None;
    }

    match record[1] {
        AF_INET => {
            let octets: [u8; 4] = record
                .get(INET_ADDR_OFFSET..INET_ADDR_OFFSET + 4)?
                .try_into()
                .ok()?;
            Some(Ipv4Addr::from(octets).to_string())
        }
        AF_INET6 => {
            let octets: [u8; 16] = record
                .get(INET6_ADDR_OFFSET..INET6_ADDR_OFFSET + 16)?
                .try_into()
                .ok()?;
            Some(Ipv6Addr::from(octets).to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inet_record(addr: [u8; 4]) -> Vec<u8> {
        let mut record = vec![16u8, AF_INET, 0x1f, 0x90]; // len, family, port 8080
        record.extend_from_slice(&addr);
        record.extend_from_slice(&[0u8; 8]); // sin_zero
        record
    }

    #[test]
    fn empty_record_is_absent() {
        assert_eq!(numeric_host(&[]), None);
    }

    #[test]
    fn ipv4_record_resolves() {
        assert_eq!(
            numeric_host(&inet_record([192, 168, 1, 42])),
            Some("192.168.1.42".to_string())
        );
    }

    #[test]
    fn ipv6_record_resolves() {
        let mut record = vec![28u8, AF_INET6, 0, 0, 0, 0, 0, 0];
        let mut addr = [0u8; 16];
        addr[15] = 1;
        record.extend_from_slice(&addr);
        assert_eq!(numeric_host(&record), Some("::1".to_string()));
    }

    #[test]
    fn unsupported_family_is_absent() {
        assert_eq!(numeric_host(&[16, 17, 0, 0, 10, 0, 0, 1]), None);
    }

    #[test]
    fn truncated_ipv4_record_is_absent() {
        assert_eq!(numeric_host(&[16, AF_INET, 0x1f, 0x90, 192, 168]), None);
    }
}
