//! BGP-LS path attribute (type 29) decoding - RFC 7752, RFC 9085,
//! RFC 9514.
//!
//! The body is a flat run of TLVs from the node, link, and prefix
//! attribute spaces. Understood types become typed fields on
//! [`LsAttribute`]; everything else is echoed raw under `unknown`.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::ParserError;
use crate::models::{AdjacencySid, AttributeValue, LsAttribute, LsAttributeType, PrefixSid, SrCapability};
use crate::parser::tlv::{walk_tlvs, RawTlv};

pub fn parse_link_state_attribute(input: &[u8]) -> Result<AttributeValue, ParserError> {
    let mut attr = LsAttribute::default();

    for tlv in walk_tlvs(input)? {
        match LsAttributeType::from(tlv.tlv_type) {
            LsAttributeType::NodeFlagBits => match tlv.value.first() {
                Some(flags) => attr.node_flags = Some(*flags),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::NodeName => {
                attr.node_name = Some(String::from_utf8_lossy(&tlv.value).into_owned());
            }
            LsAttributeType::IsisAreaIdentifier => attr.isis_area_id = Some(tlv.value),
            LsAttributeType::Ipv4RouterIdOfLocalNode => match read_u32(&tlv) {
                Some(v) => attr.local_router_id = Some(IpAddr::V4(Ipv4Addr::from(v))),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::Ipv6RouterIdOfLocalNode => match read_ipv6(&tlv) {
                Some(ip) => attr.local_router_id = Some(IpAddr::V6(ip)),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::Ipv4RouterIdOfRemoteNode => match read_u32(&tlv) {
                Some(v) => attr.remote_router_id = Some(IpAddr::V4(Ipv4Addr::from(v))),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::Ipv6RouterIdOfRemoteNode => match read_ipv6(&tlv) {
                Some(ip) => attr.remote_router_id = Some(IpAddr::V6(ip)),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::SrCapabilities => match parse_sr_capabilities(&tlv.value) {
                Some(cap) => attr.sr_capabilities = Some(cap),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::SrAlgorithm => attr.sr_algorithms = tlv.value,
            LsAttributeType::AdministrativeGroup => match read_u32(&tlv) {
                Some(v) => attr.admin_group = Some(v),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::MaximumLinkBandwidth => match read_f32(&tlv) {
                Some(v) => attr.max_link_bandwidth = Some(v),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::MaxReservableLinkBandwidth => match read_f32(&tlv) {
                Some(v) => attr.max_reservable_bandwidth = Some(v),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::UnreservedBandwidth => {
                if tlv.value.len() == 32 {
                    attr.unreserved_bandwidth = Some(
                        tlv.value
                            .chunks_exact(4)
                            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                            .collect(),
                    );
                } else {
                    attr.unknown_tlvs.push(tlv);
                }
            }
            LsAttributeType::TeDefaultMetric => match read_u32(&tlv) {
                Some(v) => attr.te_default_metric = Some(v),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::IgpMetric => {
                // one, two, or three bytes depending on the IGP
                attr.igp_metric = match tlv.value.len() {
                    1 => Some(tlv.value[0] as u32),
                    2 => Some(u16::from_be_bytes([tlv.value[0], tlv.value[1]]) as u32),
                    3 => Some(
                        ((tlv.value[0] as u32) << 16)
                            | ((tlv.value[1] as u32) << 8)
                            | tlv.value[2] as u32,
                    ),
                    _ => {
                        attr.unknown_tlvs.push(tlv);
                        continue;
                    }
                };
            }
            LsAttributeType::LinkName => {
                attr.link_name = Some(String::from_utf8_lossy(&tlv.value).into_owned());
            }
            LsAttributeType::SrAdjacencySid | LsAttributeType::SrLanAdjacencySid => {
                match parse_adjacency_sid(&tlv.value) {
                    Some(sid) => attr.adjacency_sids.push(sid),
                    None => attr.unknown_tlvs.push(tlv),
                }
            }
            LsAttributeType::IgpFlags => match tlv.value.first() {
                Some(flags) => attr.igp_flags = Some(*flags),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::PrefixMetric => match read_u32(&tlv) {
                Some(v) => attr.prefix_metric = Some(v),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::OspfForwardingAddress => match tlv.value.len() {
                4 => {
                    attr.ospf_forwarding_address =
                        read_u32(&tlv).map(|v| IpAddr::V4(Ipv4Addr::from(v)))
                }
                16 => attr.ospf_forwarding_address = read_ipv6(&tlv).map(IpAddr::V6),
                _ => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::PrefixSid => match parse_prefix_sid(&tlv.value) {
                Some(sid) => attr.prefix_sids.push(sid),
                None => attr.unknown_tlvs.push(tlv),
            },
            LsAttributeType::Srv6Locator => {
                // flags(1) algorithm(1) reserved(2) metric(4) ... locator
                if tlv.value.len() >= 24 {
                    let mut bytes = [0u8; 16];
                    bytes.copy_from_slice(&tlv.value[8..24]);
                    attr.srv6_locator = Some((Ipv6Addr::from(bytes), tlv.value[1]));
                } else {
                    attr.unknown_tlvs.push(tlv);
                }
            }
            LsAttributeType::Srv6EndpointBehavior => {
                if tlv.value.len() >= 2 {
                    attr.srv6_endpoint_behavior =
                        Some(u16::from_be_bytes([tlv.value[0], tlv.value[1]]));
                } else {
                    attr.unknown_tlvs.push(tlv);
                }
            }
            _ => attr.unknown_tlvs.push(tlv),
        }
    }

    Ok(AttributeValue::LinkState(attr))
}

fn read_u32(tlv: &RawTlv) -> Option<u32> {
    let bytes: [u8; 4] = tlv.value.as_slice().try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

fn read_f32(tlv: &RawTlv) -> Option<f32> {
    let bytes: [u8; 4] = tlv.value.as_slice().try_into().ok()?;
    Some(f32::from_be_bytes(bytes))
}

fn read_ipv6(tlv: &RawTlv) -> Option<Ipv6Addr> {
    let bytes: [u8; 16] = tlv.value.as_slice().try_into().ok()?;
    Some(Ipv6Addr::from(bytes))
}

/// SID/label field: three bytes hold a label, four hold an index.
fn read_sid_value(bytes: &[u8]) -> Option<u32> {
    match bytes.len() {
        3 => Some(((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32),
        4 => Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        _ => None,
    }
}

fn parse_adjacency_sid(value: &[u8]) -> Option<AdjacencySid> {
    if value.len() < 4 {
        return None;
    }
    Some(AdjacencySid {
        flags: value[0],
        weight: value[1],
        sid: read_sid_value(&value[4..])?,
    })
}

fn parse_prefix_sid(value: &[u8]) -> Option<PrefixSid> {
    if value.len() < 4 {
        return None;
    }
    Some(PrefixSid {
        flags: value[0],
        algorithm: value[1],
        sid: read_sid_value(&value[4..])?,
    })
}

/// SR capabilities TLV: flags, reserved, then (range, SID/label sub-TLV)
/// pairs.
fn parse_sr_capabilities(value: &[u8]) -> Option<SrCapability> {
    if value.len() < 2 {
        return None;
    }
    let flags = value[0];
    let mut ranges = Vec::new();
    let mut rest = &value[2..];
    while rest.len() >= 3 {
        let range = ((rest[0] as u32) << 16) | ((rest[1] as u32) << 8) | rest[2] as u32;
        rest = &rest[3..];
        // nested SID/label sub-TLV: type(2) length(2) value
        if rest.len() < 4 {
            return None;
        }
        let sub_len = u16::from_be_bytes([rest[2], rest[3]]) as usize;
        if rest.len() < 4 + sub_len {
            return None;
        }
        let base = read_sid_value(&rest[4..4 + sub_len])?;
        ranges.push((range, base));
        rest = &rest[4 + sub_len..];
    }
    Some(SrCapability { flags, ranges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_node_attributes() {
        let mut data = BytesMut::new();
        data.put_u16(1026);
        data.put_u16(7);
        data.put_slice(b"router1");
        data.put_u16(1028);
        data.put_u16(4);
        data.put_slice(&[1, 1, 1, 1]);

        let AttributeValue::LinkState(attr) =
            parse_link_state_attribute(&data.freeze()).unwrap()
        else {
            panic!("wrong attribute value");
        };
        assert_eq!(attr.node_name.as_deref(), Some("router1"));
        assert_eq!(
            attr.local_router_id,
            Some(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)))
        );
        assert!(attr.unknown_tlvs.is_empty());
    }

    #[test]
    fn test_igp_metric_widths() {
        for (value, expected) in [
            (vec![0x2a], 42u32),
            (vec![0x01, 0x00], 256),
            (vec![0x01, 0x00, 0x00], 65536),
        ] {
            let mut data = BytesMut::new();
            data.put_u16(1095);
            data.put_u16(value.len() as u16);
            data.put_slice(&value);
            let AttributeValue::LinkState(attr) =
                parse_link_state_attribute(&data.freeze()).unwrap()
            else {
                panic!("wrong attribute value");
            };
            assert_eq!(attr.igp_metric, Some(expected));
        }
    }

    #[test]
    fn test_prefix_sid() {
        let mut data = BytesMut::new();
        data.put_u16(1158);
        data.put_u16(8);
        data.put_slice(&[0x40, 0x00, 0x00, 0x00]); // flags, algo, reserved
        data.put_u32(1001); // index

        let AttributeValue::LinkState(attr) =
            parse_link_state_attribute(&data.freeze()).unwrap()
        else {
            panic!("wrong attribute value");
        };
        assert_eq!(attr.prefix_sids.len(), 1);
        assert_eq!(attr.prefix_sids[0].sid, 1001);
        assert_eq!(attr.prefix_sids[0].flags, 0x40);
    }

    #[test]
    fn test_unknown_tlv_echoed() {
        let mut data = BytesMut::new();
        data.put_u16(1999);
        data.put_u16(2);
        data.put_slice(&[0xbe, 0xef]);

        let AttributeValue::LinkState(attr) =
            parse_link_state_attribute(&data.freeze()).unwrap()
        else {
            panic!("wrong attribute value");
        };
        assert_eq!(attr.unknown_tlvs.len(), 1);
        assert_eq!(attr.unknown_tlvs[0].tlv_type, 1999);
        assert_eq!(attr.unknown_tlvs[0].value, vec![0xbe, 0xef]);
    }

    #[test]
    fn test_truncated_tlv_is_error() {
        let mut data = BytesMut::new();
        data.put_u16(1026);
        data.put_u16(50);
        data.put_slice(b"short");
        assert!(parse_link_state_attribute(&data.freeze()).is_err());
    }
}
