use std::net::IpAddr;

use crate::error::ParserError;
use crate::models::{AttributeValue, NextHopAddress};
use crate::parser::primitives::parse_rd;
use crate::parser::ReadUtils;

pub fn parse_next_hop(input: &mut &[u8]) -> Result<AttributeValue, ParserError> {
    let addr = match input.remaining() {
        4 => IpAddr::V4(input.read_ipv4_address()?),
        16 => IpAddr::V6(input.read_ipv6_address()?),
        n => {
            return Err(ParserError::InvalidField(format!(
                "next hop of {} bytes",
                n
            )))
        }
    };
    Ok(AttributeValue::NextHop(addr))
}

/// Next hop field of an MP_REACH attribute. VPN address families prefix
/// the address with a route distinguisher that carries no information in
/// a next hop and is discarded after validation; IPv6 next hops of 32
/// bytes carry a link-local companion.
pub fn parse_mp_next_hop(mut input: &[u8]) -> Result<Option<NextHopAddress>, ParserError> {
    let next_hop = match input.remaining() {
        0 => None,
        4 => Some(NextHopAddress::Ipv4(input.read_ipv4_address()?)),
        16 => Some(NextHopAddress::Ipv6(input.read_ipv6_address()?)),
        32 => Some(NextHopAddress::Ipv6LinkLocal(
            input.read_ipv6_address()?,
            input.read_ipv6_address()?,
        )),
        12 => {
            parse_rd(&mut input)?;
            Some(NextHopAddress::Ipv4(input.read_ipv4_address()?))
        }
        24 => {
            parse_rd(&mut input)?;
            Some(NextHopAddress::Ipv6(input.read_ipv6_address()?))
        }
        n => {
            return Err(ParserError::InvalidField(format!(
                "multiprotocol next hop of {} bytes",
                n
            )))
        }
    };
    Ok(next_hop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_plain_next_hop() {
        let mut data: &[u8] = &[192, 0, 2, 1];
        assert_eq!(
            parse_next_hop(&mut data).unwrap(),
            AttributeValue::NextHop(IpAddr::from_str("192.0.2.1").unwrap())
        );
    }

    #[test]
    fn test_mp_next_hop_vpn() {
        // zero RD + 10.0.0.9
        let data = [0u8, 0, 0, 0, 0, 0, 0, 0, 10, 0, 0, 9];
        let nh = parse_mp_next_hop(&data).unwrap().unwrap();
        assert_eq!(nh.addr(), IpAddr::from_str("10.0.0.9").unwrap());
    }

    #[test]
    fn test_mp_next_hop_link_local() {
        let mut data = Vec::new();
        data.extend_from_slice(&std::net::Ipv6Addr::from_str("2001:db8::1").unwrap().octets());
        data.extend_from_slice(&std::net::Ipv6Addr::from_str("fe80::1").unwrap().octets());
        let nh = parse_mp_next_hop(&data).unwrap().unwrap();
        assert!(matches!(nh, NextHopAddress::Ipv6LinkLocal(_, _)));
    }

    #[test]
    fn test_mp_next_hop_bad_length() {
        let data = [0u8; 7];
        assert!(parse_mp_next_hop(&data).is_err());
    }
}
