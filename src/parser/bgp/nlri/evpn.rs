//! EVPN NLRI decoding (RFC 7432, RFC 9136).
//!
//! Each route shares an envelope of one route-type byte and one length
//! byte; the bodies differ per type and are handed to per-type
//! subparsers. A body shorter than its declared length is a fatal error
//! for the enclosing UPDATE.

use std::net::IpAddr;

use crate::error::ParserError;
use crate::models::{
    EthernetAutoDiscovery, EthernetSegmentRoute, EvpnIpPrefix, EvpnRoute, EvpnRouteType,
    InclusiveMulticastEthernetTag, MacIpAdvertisement, MplsLabel,
};
use crate::parser::primitives::{parse_esi, parse_label, parse_mac, parse_rd};
use crate::parser::ReadUtils;

/// Parse a run of EVPN routes filling `input` exactly.
pub fn parse_evpn_routes(mut input: &[u8]) -> Result<Vec<EvpnRoute>, ParserError> {
    let mut routes = Vec::new();
    while !input.is_empty() {
        let route_type = input.read_u8()?;
        let length = input.read_u8()? as usize;
        let mut body = input.split_to(length)?;

        let route_type = EvpnRouteType::try_from(route_type).map_err(|_| {
            ParserError::UnsupportedFamily {
                afi: 25,
                safi: route_type,
            }
        })?;

        let route = match route_type {
            EvpnRouteType::EthernetAutoDiscovery => parse_auto_discovery(&mut body)?,
            EvpnRouteType::MacIpAdvertisement => parse_mac_ip_advertisement(&mut body)?,
            EvpnRouteType::InclusiveMulticastEthernetTag => parse_inclusive_multicast(&mut body)?,
            EvpnRouteType::EthernetSegment => parse_ethernet_segment(&mut body)?,
            EvpnRouteType::IpPrefix => parse_ip_prefix(&mut body)?,
        };
        routes.push(route);
    }
    Ok(routes)
}

/// Trailing label stack of an EVPN body: three-byte entries until the
/// body runs out. EVPN labels do not reliably set bottom-of-stack, so
/// exhaustion of the body drives the loop.
fn read_trailing_labels(input: &mut &[u8]) -> Result<Vec<MplsLabel>, ParserError> {
    let mut labels = Vec::new();
    while input.remaining() >= 3 {
        labels.push(parse_label(input)?);
    }
    if !input.is_empty() {
        return Err(ParserError::Truncated {
            name: "EVPN label stack",
            expected: 3,
            found: input.remaining(),
        });
    }
    Ok(labels)
}

/// Length-prefixed IP field used by types 2 and 5: 0, 32 or 128 bits.
fn read_ip_field(input: &mut &[u8]) -> Result<Option<IpAddr>, ParserError> {
    let bits = input.read_u8()?;
    match bits {
        0 => Ok(None),
        32 => Ok(Some(IpAddr::V4(input.read_ipv4_address()?))),
        128 => Ok(Some(IpAddr::V6(input.read_ipv6_address()?))),
        n => Err(ParserError::InvalidField(format!(
            "EVPN IP field length {} bits",
            n
        ))),
    }
}

fn parse_auto_discovery(input: &mut &[u8]) -> Result<EvpnRoute, ParserError> {
    let rd = parse_rd(input)?;
    let esi = parse_esi(input)?;
    let eth_tag = input.read_u32()?;
    let labels = read_trailing_labels(input)?;
    Ok(EvpnRoute::EthernetAutoDiscovery(EthernetAutoDiscovery {
        rd,
        esi,
        eth_tag,
        labels,
    }))
}

fn parse_mac_ip_advertisement(input: &mut &[u8]) -> Result<EvpnRoute, ParserError> {
    let rd = parse_rd(input)?;
    let esi = parse_esi(input)?;
    let eth_tag = input.read_u32()?;

    let mac_bits = input.read_u8()?;
    if mac_bits != 48 {
        return Err(ParserError::InvalidField(format!(
            "MAC address length {} bits",
            mac_bits
        )));
    }
    let mac = parse_mac(input)?;
    let ip = read_ip_field(input)?;
    let labels = read_trailing_labels(input)?;

    Ok(EvpnRoute::MacIpAdvertisement(MacIpAdvertisement {
        rd,
        esi,
        eth_tag,
        mac,
        ip,
        labels,
    }))
}

fn parse_inclusive_multicast(input: &mut &[u8]) -> Result<EvpnRoute, ParserError> {
    let rd = parse_rd(input)?;
    let eth_tag = input.read_u32()?;
    let originator = read_ip_field(input)?.ok_or_else(|| {
        ParserError::InvalidField("inclusive multicast route without originator".to_string())
    })?;
    Ok(EvpnRoute::InclusiveMulticastEthernetTag(
        InclusiveMulticastEthernetTag {
            rd,
            eth_tag,
            originator,
        },
    ))
}

fn parse_ethernet_segment(input: &mut &[u8]) -> Result<EvpnRoute, ParserError> {
    let rd = parse_rd(input)?;
    let esi = parse_esi(input)?;
    let originator = read_ip_field(input)?.ok_or_else(|| {
        ParserError::InvalidField("ethernet segment route without originator".to_string())
    })?;
    Ok(EvpnRoute::EthernetSegment(EthernetSegmentRoute {
        rd,
        esi,
        originator,
    }))
}

fn parse_ip_prefix(input: &mut &[u8]) -> Result<EvpnRoute, ParserError> {
    let rd = parse_rd(input)?;
    let esi = parse_esi(input)?;
    let eth_tag = input.read_u32()?;
    let prefix_len = input.read_u8()?;

    // body length decides the address family: 34 bytes for IPv4 (two
    // 4-byte addresses + label), 58 for IPv6
    let (prefix, gateway) = match input.remaining() {
        11 => {
            let p = IpAddr::V4(input.read_ipv4_address()?);
            let g = IpAddr::V4(input.read_ipv4_address()?);
            (p, g)
        }
        35 => {
            let p = IpAddr::V6(input.read_ipv6_address()?);
            let g = IpAddr::V6(input.read_ipv6_address()?);
            (p, g)
        }
        n => {
            return Err(ParserError::InvalidField(format!(
                "IP prefix route body of {} remaining bytes",
                n
            )))
        }
    };
    let max_bits = if prefix.is_ipv4() { 32 } else { 128 };
    if prefix_len > max_bits {
        return Err(ParserError::InvalidField(format!(
            "IP prefix route length {} bits",
            prefix_len
        )));
    }

    let labels = read_trailing_labels(input)?;
    let gateway = match gateway {
        IpAddr::V4(ip) if ip.is_unspecified() => None,
        IpAddr::V6(ip) if ip.is_unspecified() => None,
        other => Some(other),
    };

    Ok(EvpnRoute::IpPrefix(EvpnIpPrefix {
        rd,
        esi,
        eth_tag,
        prefix,
        prefix_len,
        gateway,
        labels,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac_ip_body() -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&[0, 0, 0, 100, 0, 0, 0, 1]); // RD 0:100:1
        body.extend_from_slice(&[0; 10]); // zero ESI
        body.extend_from_slice(&[0, 0, 0, 0]); // eth tag
        body.push(48);
        body.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        body.push(32);
        body.extend_from_slice(&[10, 0, 0, 5]);
        body.extend_from_slice(&[0x00, 0x00, 0xa1]); // label 10
        body
    }

    #[test]
    fn test_mac_ip_advertisement() {
        let body = mac_ip_body();
        let mut nlri = vec![2u8, body.len() as u8];
        nlri.extend_from_slice(&body);

        let routes = parse_evpn_routes(&nlri).unwrap();
        assert_eq!(routes.len(), 1);
        let EvpnRoute::MacIpAdvertisement(route) = &routes[0] else {
            panic!("wrong route type: {:?}", routes[0]);
        };
        assert_eq!(route.rd.to_string(), "0:100:1");
        assert!(route.esi.is_zero());
        assert_eq!(route.eth_tag, 0);
        assert_eq!(route.mac.to_string(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(route.ip, Some("10.0.0.5".parse().unwrap()));
        assert_eq!(route.labels.len(), 1);
        assert_eq!(route.labels[0].value, 10);
    }

    #[test]
    fn test_mac_ip_advertisement_no_ip() {
        let mut body = Vec::new();
        body.extend_from_slice(&[0, 0, 0, 100, 0, 0, 0, 1]);
        body.extend_from_slice(&[0; 10]);
        body.extend_from_slice(&[0, 0, 0, 0]);
        body.push(48);
        body.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        body.push(0); // no IP
        body.extend_from_slice(&[0x00, 0x00, 0xa1]);

        let mut nlri = vec![2u8, body.len() as u8];
        nlri.extend_from_slice(&body);
        let routes = parse_evpn_routes(&nlri).unwrap();
        let EvpnRoute::MacIpAdvertisement(route) = &routes[0] else {
            panic!("wrong route type");
        };
        assert_eq!(route.ip, None);
    }

    #[test]
    fn test_body_shorter_than_declared() {
        // declares 30 bytes but only 4 present
        let nlri = [2u8, 30, 0, 0, 0, 100];
        assert!(matches!(
            parse_evpn_routes(&nlri),
            Err(ParserError::Truncated { .. })
        ));
    }

    #[test]
    fn test_unknown_route_type() {
        let nlri = [9u8, 2, 0, 0];
        assert!(matches!(
            parse_evpn_routes(&nlri),
            Err(ParserError::UnsupportedFamily { .. })
        ));
    }

    #[test]
    fn test_inclusive_multicast() {
        let mut body = Vec::new();
        body.extend_from_slice(&[0, 0, 0, 100, 0, 0, 0, 2]);
        body.extend_from_slice(&[0, 0, 0, 5]); // eth tag 5
        body.push(32);
        body.extend_from_slice(&[192, 0, 2, 9]);

        let mut nlri = vec![3u8, body.len() as u8];
        nlri.extend_from_slice(&body);
        let routes = parse_evpn_routes(&nlri).unwrap();
        let EvpnRoute::InclusiveMulticastEthernetTag(route) = &routes[0] else {
            panic!("wrong route type");
        };
        assert_eq!(route.eth_tag, 5);
        assert_eq!(route.originator, "192.0.2.9".parse::<IpAddr>().unwrap());
    }
}
