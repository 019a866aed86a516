//! BGP-LS NLRI decoding (RFC 7752, RFC 9514).
//!
//! Each NLRI is a two-byte type and two-byte length, then a protocol-id
//! byte, a 64-bit identifier, and a tree of descriptor TLVs. Node
//! descriptors arrive wrapped in container TLVs (256 local, 257 remote)
//! whose values are sub-TLV runs; link, prefix and SRv6 SID descriptors
//! sit directly at the top level. Type 263 means multi-topology in both
//! the link and prefix contexts, so dispatch is always per NLRI type.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::ParserError;
use crate::models::{
    LinkDescriptor, LinkDescriptorType, LsNlri, LsNlriType, LsProtocolId, NetworkPrefix,
    NodeDescriptor, NodeDescriptorType, PrefixDescriptor, PrefixDescriptorType, Srv6SidDescriptor,
};
use crate::parser::tlv::{walk_tlvs, RawTlv};
use crate::parser::ReadUtils;

const TLV_LOCAL_NODE_DESCRIPTORS: u16 = 256;
const TLV_REMOTE_NODE_DESCRIPTORS: u16 = 257;
const TLV_SRV6_SID_INFORMATION: u16 = 518;

/// Parse a run of BGP-LS NLRI entries filling `input` exactly.
pub fn parse_ls_nlris(mut input: &[u8]) -> Result<Vec<LsNlri>, ParserError> {
    let mut nlris = Vec::new();
    while !input.is_empty() {
        input.require_n_remaining(4, "link-state NLRI header")?;
        let nlri_type = input.read_u16()?;
        let length = input.read_u16()? as usize;
        let body = input.split_to(length)?;
        nlris.push(parse_one_ls_nlri(LsNlriType::from(nlri_type), body)?);
    }
    Ok(nlris)
}

fn parse_one_ls_nlri(nlri_type: LsNlriType, mut body: &[u8]) -> Result<LsNlri, ParserError> {
    body.require_n_remaining(9, "link-state NLRI body")?;
    let protocol_id = LsProtocolId::from(body.read_u8()?);
    let identifier = body.read_u64()?;

    let tlvs = walk_tlvs(body)?;

    let mut local_node = NodeDescriptor::default();
    let mut remote_node = None;
    let mut link = LinkDescriptor::default();
    let mut prefix = PrefixDescriptor::default();
    let mut srv6_sid = Srv6SidDescriptor::default();

    for tlv in tlvs {
        match tlv.tlv_type {
            TLV_LOCAL_NODE_DESCRIPTORS => local_node = parse_node_descriptors(&tlv.value)?,
            TLV_REMOTE_NODE_DESCRIPTORS => remote_node = Some(parse_node_descriptors(&tlv.value)?),
            _ => match nlri_type {
                LsNlriType::Link => apply_link_descriptor(&mut link, tlv),
                LsNlriType::Ipv4Prefix => apply_prefix_descriptor(&mut prefix, tlv, false)?,
                LsNlriType::Ipv6Prefix => apply_prefix_descriptor(&mut prefix, tlv, true)?,
                LsNlriType::Srv6Sid => apply_srv6_descriptor(&mut srv6_sid, tlv)?,
                _ => local_node.unknown_tlvs.push(tlv),
            },
        }
    }

    Ok(match nlri_type {
        LsNlriType::Node => LsNlri::node(protocol_id, identifier, local_node),
        LsNlriType::Link => {
            let remote = remote_node.ok_or_else(|| {
                ParserError::InvalidField("link NLRI without remote node descriptors".to_string())
            })?;
            LsNlri::link(protocol_id, identifier, local_node, remote, link)
        }
        LsNlriType::Ipv4Prefix | LsNlriType::Ipv6Prefix => {
            LsNlri::prefix(nlri_type, protocol_id, identifier, local_node, prefix)
        }
        LsNlriType::Srv6Sid => LsNlri::srv6_sid(protocol_id, identifier, local_node, srv6_sid),
        LsNlriType::Reserved => {
            return Err(ParserError::InvalidField(
                "reserved link-state NLRI type".to_string(),
            ))
        }
    })
}

/// Walk the sub-TLVs inside a node descriptor container.
fn parse_node_descriptors(value: &[u8]) -> Result<NodeDescriptor, ParserError> {
    let mut desc = NodeDescriptor::default();
    for sub in walk_tlvs(value)? {
        match NodeDescriptorType::from(sub.tlv_type) {
            NodeDescriptorType::AutonomousSystem => desc.autonomous_system = read_u32_tlv(&sub),
            NodeDescriptorType::BgpLsIdentifier => desc.bgp_ls_identifier = read_u32_tlv(&sub),
            NodeDescriptorType::OspfAreaId => desc.ospf_area_id = read_u32_tlv(&sub),
            NodeDescriptorType::IgpRouterId => desc.igp_router_id = Some(sub.value),
            NodeDescriptorType::BgpRouterId => {
                desc.bgp_router_id = read_u32_tlv(&sub).map(Ipv4Addr::from)
            }
            NodeDescriptorType::MemberAsn => desc.member_asn = read_u32_tlv(&sub),
            NodeDescriptorType::Unknown => desc.unknown_tlvs.push(sub),
        }
    }
    Ok(desc)
}

fn apply_link_descriptor(desc: &mut LinkDescriptor, tlv: RawTlv) {
    match LinkDescriptorType::from(tlv.tlv_type) {
        LinkDescriptorType::LinkLocalRemoteIdentifiers => {
            if let [a, b, c, d, e, f, g, h] = tlv.value[..] {
                desc.link_local_remote_identifiers = Some((
                    u32::from_be_bytes([a, b, c, d]),
                    u32::from_be_bytes([e, f, g, h]),
                ));
                return;
            }
            desc.unknown_tlvs.push(tlv);
        }
        LinkDescriptorType::Ipv4InterfaceAddress => match read_ipv4_tlv(&tlv) {
            Some(ip) => desc.ipv4_interface_address = Some(ip),
            None => desc.unknown_tlvs.push(tlv),
        },
        LinkDescriptorType::Ipv4NeighborAddress => match read_ipv4_tlv(&tlv) {
            Some(ip) => desc.ipv4_neighbor_address = Some(ip),
            None => desc.unknown_tlvs.push(tlv),
        },
        LinkDescriptorType::Ipv6InterfaceAddress => match read_ipv6_tlv(&tlv) {
            Some(ip) => desc.ipv6_interface_address = Some(ip),
            None => desc.unknown_tlvs.push(tlv),
        },
        LinkDescriptorType::Ipv6NeighborAddress => match read_ipv6_tlv(&tlv) {
            Some(ip) => desc.ipv6_neighbor_address = Some(ip),
            None => desc.unknown_tlvs.push(tlv),
        },
        LinkDescriptorType::MultiTopologyId => match read_u16_tlv(&tlv) {
            Some(id) => desc.multi_topology_id = Some(id),
            None => desc.unknown_tlvs.push(tlv),
        },
        LinkDescriptorType::Unknown => desc.unknown_tlvs.push(tlv),
    }
}

fn apply_prefix_descriptor(
    desc: &mut PrefixDescriptor,
    tlv: RawTlv,
    v6: bool,
) -> Result<(), ParserError> {
    match PrefixDescriptorType::from(tlv.tlv_type) {
        PrefixDescriptorType::MultiTopologyId => match read_u16_tlv(&tlv) {
            Some(id) => desc.multi_topology_id = Some(id),
            None => desc.unknown_tlvs.push(tlv),
        },
        PrefixDescriptorType::OspfRouteType => match tlv.value.first() {
            Some(ty) => desc.ospf_route_type = Some(*ty),
            None => desc.unknown_tlvs.push(tlv),
        },
        PrefixDescriptorType::IpReachability => {
            desc.ip_reachability = Some(parse_ip_reachability(&tlv.value, v6)?);
        }
        PrefixDescriptorType::Unknown => desc.unknown_tlvs.push(tlv),
    }
    Ok(())
}

fn apply_srv6_descriptor(desc: &mut Srv6SidDescriptor, tlv: RawTlv) -> Result<(), ParserError> {
    match tlv.tlv_type {
        TLV_SRV6_SID_INFORMATION => {
            if tlv.value.len() != 16 {
                return Err(ParserError::InvalidField(format!(
                    "SRv6 SID information TLV of {} bytes",
                    tlv.value.len()
                )));
            }
            let mut bytes = [0u8; 16];
            bytes.copy_from_slice(&tlv.value);
            desc.sids.push(Ipv6Addr::from(bytes));
        }
        263 => match read_u16_tlv(&tlv) {
            Some(id) => desc.multi_topology_id = Some(id),
            None => desc.unknown_tlvs.push(tlv),
        },
        _ => desc.unknown_tlvs.push(tlv),
    }
    Ok(())
}

/// IP reachability TLV value: one prefix-length byte plus the minimal
/// number of packed address bytes. The address family comes from the
/// enclosing NLRI type.
fn parse_ip_reachability(value: &[u8], v6: bool) -> Result<NetworkPrefix, ParserError> {
    let mut input = value;
    let bits = input.read_u8()?;
    let byte_len = (bits as usize).div_ceil(8);
    input.require_n_remaining(byte_len, "IP reachability prefix")?;

    let prefix = if !v6 {
        if bits > 32 {
            return Err(ParserError::InvalidField(format!(
                "IP reachability prefix length {} bits",
                bits
            )));
        }
        let mut buff = [0u8; 4];
        buff[..byte_len].copy_from_slice(&input[..byte_len]);
        ipnet::IpNet::V4(ipnet::Ipv4Net::new(Ipv4Addr::from(buff), bits)?)
    } else {
        if bits > 128 {
            return Err(ParserError::InvalidField(format!(
                "IP reachability prefix length {} bits",
                bits
            )));
        }
        let mut buff = [0u8; 16];
        buff[..byte_len].copy_from_slice(&input[..byte_len]);
        ipnet::IpNet::V6(ipnet::Ipv6Net::new(Ipv6Addr::from(buff), bits)?)
    };
    Ok(NetworkPrefix::new(prefix, 0))
}

fn read_u32_tlv(tlv: &RawTlv) -> Option<u32> {
    let bytes: [u8; 4] = tlv.value.as_slice().try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

fn read_u16_tlv(tlv: &RawTlv) -> Option<u16> {
    let bytes: [u8; 2] = tlv.value.as_slice().try_into().ok()?;
    Some(u16::from_be_bytes(bytes))
}

fn read_ipv4_tlv(tlv: &RawTlv) -> Option<Ipv4Addr> {
    read_u32_tlv(tlv).map(Ipv4Addr::from)
}

fn read_ipv6_tlv(tlv: &RawTlv) -> Option<Ipv6Addr> {
    let bytes: [u8; 16] = tlv.value.as_slice().try_into().ok()?;
    Some(Ipv6Addr::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    fn node_descriptors(asn: u32, router_id: &[u8]) -> BytesMut {
        let mut sub = BytesMut::new();
        sub.put_u16(512);
        sub.put_u16(4);
        sub.put_u32(asn);
        sub.put_u16(516);
        sub.put_u16(router_id.len() as u16);
        sub.put_slice(router_id);

        let mut container = BytesMut::new();
        container.put_u16(TLV_LOCAL_NODE_DESCRIPTORS);
        container.put_u16(sub.len() as u16);
        container.put_slice(&sub);
        container
    }

    #[test]
    fn test_node_nlri() {
        let descriptors = node_descriptors(65000, &[1, 1, 1, 1]);

        let mut nlri = BytesMut::new();
        nlri.put_u16(1); // node NLRI
        nlri.put_u16(9 + descriptors.len() as u16);
        nlri.put_u8(3); // OSPFv2
        nlri.put_u64(0);
        nlri.put_slice(&descriptors);

        let parsed = parse_ls_nlris(&nlri.freeze()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].nlri_type, LsNlriType::Node);
        assert_eq!(parsed[0].protocol_id, LsProtocolId::Ospfv2);
        assert_eq!(parsed[0].identifier, 0);
        assert_eq!(parsed[0].local_node.autonomous_system, Some(65000));
        assert_eq!(
            parsed[0].local_node.bgp_router_id,
            Some(Ipv4Addr::new(1, 1, 1, 1))
        );
    }

    #[test]
    fn test_node_nlri_zero_descriptors() {
        let mut nlri = BytesMut::new();
        nlri.put_u16(1);
        nlri.put_u16(9);
        nlri.put_u8(1); // IS-IS L1
        nlri.put_u64(7);

        let parsed = parse_ls_nlris(&nlri.freeze()).unwrap();
        assert_eq!(parsed[0].local_node, NodeDescriptor::default());
        assert_eq!(parsed[0].identifier, 7);
    }

    #[test]
    fn test_link_nlri() {
        let local = node_descriptors(65000, &[1, 1, 1, 1]);
        let mut remote_body = BytesMut::new();
        remote_body.put_u16(512);
        remote_body.put_u16(4);
        remote_body.put_u32(65001);
        let mut remote = BytesMut::new();
        remote.put_u16(TLV_REMOTE_NODE_DESCRIPTORS);
        remote.put_u16(remote_body.len() as u16);
        remote.put_slice(&remote_body);

        let mut link_desc = BytesMut::new();
        link_desc.put_u16(259); // IPv4 interface address
        link_desc.put_u16(4);
        link_desc.put_slice(&[10, 0, 0, 1]);

        let body_len = 9 + local.len() + remote.len() + link_desc.len();
        let mut nlri = BytesMut::new();
        nlri.put_u16(2); // link NLRI
        nlri.put_u16(body_len as u16);
        nlri.put_u8(2); // IS-IS L2
        nlri.put_u64(0);
        nlri.put_slice(&local);
        nlri.put_slice(&remote);
        nlri.put_slice(&link_desc);

        let parsed = parse_ls_nlris(&nlri.freeze()).unwrap();
        assert_eq!(parsed[0].nlri_type, LsNlriType::Link);
        let remote = parsed[0].remote_node.as_ref().unwrap();
        assert_eq!(remote.autonomous_system, Some(65001));
        let link = parsed[0].link.as_ref().unwrap();
        assert_eq!(link.ipv4_interface_address, Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_prefix_nlri() {
        let local = node_descriptors(65000, &[1, 1, 1, 1]);

        let mut prefix_desc = BytesMut::new();
        prefix_desc.put_u16(265); // IP reachability
        prefix_desc.put_u16(4);
        prefix_desc.put_slice(&[24, 172, 16, 1]);

        let body_len = 9 + local.len() + prefix_desc.len();
        let mut nlri = BytesMut::new();
        nlri.put_u16(3);
        nlri.put_u16(body_len as u16);
        nlri.put_u8(3);
        nlri.put_u64(0);
        nlri.put_slice(&local);
        nlri.put_slice(&prefix_desc);

        let parsed = parse_ls_nlris(&nlri.freeze()).unwrap();
        let prefix = parsed[0].prefix.as_ref().unwrap();
        assert_eq!(
            prefix.ip_reachability.unwrap().to_string(),
            "172.16.1.0/24"
        );
    }

    #[test]
    fn test_truncated_inner_tlv_is_fatal() {
        // inner TLV declares 100 bytes with 10 remaining
        let mut body = BytesMut::new();
        body.put_u8(3);
        body.put_u64(0);
        body.put_u16(256);
        body.put_u16(100);
        body.put_slice(&[0u8; 10]);

        let mut nlri = BytesMut::new();
        nlri.put_u16(1);
        nlri.put_u16(body.len() as u16);
        nlri.put_slice(&body);

        assert!(matches!(
            parse_ls_nlris(&nlri.freeze()),
            Err(ParserError::Truncated { .. })
        ));
    }

    #[test]
    fn test_srv6_sid_nlri() {
        let local = node_descriptors(65000, &[9, 9, 9, 9]);
        let sid: Ipv6Addr = "fc00::1".parse().unwrap();

        let mut sid_tlv = BytesMut::new();
        sid_tlv.put_u16(TLV_SRV6_SID_INFORMATION);
        sid_tlv.put_u16(16);
        sid_tlv.put_slice(&sid.octets());

        let body_len = 9 + local.len() + sid_tlv.len();
        let mut nlri = BytesMut::new();
        nlri.put_u16(6);
        nlri.put_u16(body_len as u16);
        nlri.put_u8(2);
        nlri.put_u64(0);
        nlri.put_slice(&local);
        nlri.put_slice(&sid_tlv);

        let parsed = parse_ls_nlris(&nlri.freeze()).unwrap();
        assert_eq!(parsed[0].nlri_type, LsNlriType::Srv6Sid);
        assert_eq!(parsed[0].srv6_sid.as_ref().unwrap().sids, vec![sid]);
    }
}
