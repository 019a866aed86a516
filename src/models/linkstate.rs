//! BGP Link-State data model (RFC 7752 and the IANA BGP-LS registry).

use crate::models::network::NetworkPrefix;
use crate::parser::tlv::RawTlv;
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// BGP-LS NLRI types.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive, Serialize)]
#[repr(u16)]
pub enum LsNlriType {
    #[num_enum(default)]
    Reserved = 0,
    Node = 1,
    Link = 2,
    Ipv4Prefix = 3,
    Ipv6Prefix = 4,
    Srv6Sid = 6,
}

/// Protocol that originated the topology object.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive, Serialize)]
#[repr(u8)]
pub enum LsProtocolId {
    #[num_enum(default)]
    Reserved = 0,
    IsisL1 = 1,
    IsisL2 = 2,
    Ospfv2 = 3,
    Direct = 4,
    Static = 5,
    Ospfv3 = 6,
    Bgp = 7,
}

/// Node descriptor sub-TLV types (RFC 7752 section 3.2.1, RFC 9086).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum NodeDescriptorType {
    #[num_enum(default)]
    Unknown = 0,
    AutonomousSystem = 512,
    BgpLsIdentifier = 513,
    OspfAreaId = 514,
    IgpRouterId = 515,
    BgpRouterId = 516,
    MemberAsn = 517,
}

/// Link descriptor TLV types (RFC 7752 section 3.2.2).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum LinkDescriptorType {
    #[num_enum(default)]
    Unknown = 0,
    LinkLocalRemoteIdentifiers = 258,
    Ipv4InterfaceAddress = 259,
    Ipv4NeighborAddress = 260,
    Ipv6InterfaceAddress = 261,
    Ipv6NeighborAddress = 262,
    MultiTopologyId = 263,
}

/// Prefix descriptor TLV types (RFC 7752 section 3.2.3).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum PrefixDescriptorType {
    #[num_enum(default)]
    Unknown = 0,
    MultiTopologyId = 263,
    OspfRouteType = 264,
    IpReachability = 265,
}

/// BGP-LS attribute TLV types (the 1024–1174 assignments the collector
/// decodes structurally; everything else is echoed raw).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum LsAttributeType {
    #[num_enum(default)]
    Unknown = 0,
    NodeFlagBits = 1024,
    NodeName = 1026,
    IsisAreaIdentifier = 1027,
    Ipv4RouterIdOfLocalNode = 1028,
    Ipv6RouterIdOfLocalNode = 1029,
    Ipv4RouterIdOfRemoteNode = 1030,
    Ipv6RouterIdOfRemoteNode = 1031,
    SrCapabilities = 1034,
    SrAlgorithm = 1035,
    SrLocalBlock = 1036,
    Srv6Capabilities = 1038,
    AdministrativeGroup = 1088,
    MaximumLinkBandwidth = 1089,
    MaxReservableLinkBandwidth = 1090,
    UnreservedBandwidth = 1091,
    TeDefaultMetric = 1092,
    IgpMetric = 1095,
    SharedRiskLinkGroups = 1096,
    LinkName = 1098,
    SrAdjacencySid = 1099,
    SrLanAdjacencySid = 1100,
    Srv6EndXSid = 1106,
    IgpFlags = 1152,
    PrefixMetric = 1155,
    OspfForwardingAddress = 1156,
    PrefixSid = 1158,
    Srv6Locator = 1162,
    Srv6EndpointBehavior = 1250,
    Srv6SidStructure = 1252,
}

/// Node descriptors: the sub-TLVs that identify one IGP node.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct NodeDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autonomous_system: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgp_ls_identifier: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ospf_area_id: Option<u32>,
    /// IGP router ID: 4 octets for OSPF, 6 or 7 for IS-IS.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::serialize_opt_hex"
    )]
    pub igp_router_id: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgp_router_id: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_asn: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", rename = "unknown")]
    pub unknown_tlvs: Vec<RawTlv>,
}

impl NodeDescriptor {
    /// The bytes identifying this node for record keying: the IGP router
    /// ID when present, the BGP router ID otherwise.
    pub fn router_id_bytes(&self) -> Vec<u8> {
        if let Some(id) = &self.igp_router_id {
            return id.clone();
        }
        if let Some(id) = &self.bgp_router_id {
            return id.octets().to_vec();
        }
        Vec::new()
    }
}

/// Link descriptors: the TLVs that pin down one link between two nodes.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct LinkDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_local_remote_identifiers: Option<(u32, u32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_interface_address: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_neighbor_address: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6_interface_address: Option<Ipv6Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6_neighbor_address: Option<Ipv6Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_topology_id: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty", rename = "unknown")]
    pub unknown_tlvs: Vec<RawTlv>,
}

/// Prefix descriptors for prefix NLRI.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct PrefixDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_topology_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ospf_route_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_reachability: Option<NetworkPrefix>,
    #[serde(skip_serializing_if = "Vec::is_empty", rename = "unknown")]
    pub unknown_tlvs: Vec<RawTlv>,
}

/// SRv6 SID descriptor for the SRv6 SID NLRI (RFC 9514).
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct Srv6SidDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_topology_id: Option<u16>,
    pub sids: Vec<Ipv6Addr>,
    #[serde(skip_serializing_if = "Vec::is_empty", rename = "unknown")]
    pub unknown_tlvs: Vec<RawTlv>,
}

/// One decoded BGP-LS NLRI.
///
/// Every variant carries the protocol ID and 64-bit identifier that
/// precede the descriptors on the wire.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct LsNlri {
    pub nlri_type: LsNlriType,
    pub protocol_id: LsProtocolId,
    pub identifier: u64,
    pub local_node: NodeDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_node: Option<NodeDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PrefixDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srv6_sid: Option<Srv6SidDescriptor>,
}

impl LsNlri {
    pub fn node(protocol_id: LsProtocolId, identifier: u64, local_node: NodeDescriptor) -> Self {
        LsNlri {
            nlri_type: LsNlriType::Node,
            protocol_id,
            identifier,
            local_node,
            remote_node: None,
            link: None,
            prefix: None,
            srv6_sid: None,
        }
    }

    pub fn link(
        protocol_id: LsProtocolId,
        identifier: u64,
        local_node: NodeDescriptor,
        remote_node: NodeDescriptor,
        link: LinkDescriptor,
    ) -> Self {
        LsNlri {
            nlri_type: LsNlriType::Link,
            protocol_id,
            identifier,
            local_node,
            remote_node: Some(remote_node),
            link: Some(link),
            prefix: None,
            srv6_sid: None,
        }
    }

    pub fn prefix(
        nlri_type: LsNlriType,
        protocol_id: LsProtocolId,
        identifier: u64,
        local_node: NodeDescriptor,
        prefix: PrefixDescriptor,
    ) -> Self {
        LsNlri {
            nlri_type,
            protocol_id,
            identifier,
            local_node,
            remote_node: None,
            link: None,
            prefix: Some(prefix),
            srv6_sid: None,
        }
    }

    pub fn srv6_sid(
        protocol_id: LsProtocolId,
        identifier: u64,
        local_node: NodeDescriptor,
        srv6_sid: Srv6SidDescriptor,
    ) -> Self {
        LsNlri {
            nlri_type: LsNlriType::Srv6Sid,
            protocol_id,
            identifier,
            local_node,
            remote_node: None,
            link: None,
            prefix: None,
            srv6_sid: Some(srv6_sid),
        }
    }
}

/// Adjacency or LAN-adjacency SID from the link attribute space.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct AdjacencySid {
    pub flags: u8,
    pub weight: u8,
    pub sid: u32,
}

/// Prefix SID (RFC 9085 section 2.3.1).
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct PrefixSid {
    pub flags: u8,
    pub algorithm: u8,
    pub sid: u32,
}

/// SR capability range advertised by a node.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct SrCapability {
    pub flags: u8,
    pub ranges: Vec<(u32, u32)>,
}

/// Decoded values from the BGP-LS path attribute (type 29).
///
/// Only the TLVs the collector understands become typed fields; the rest
/// are preserved under `unknown`.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct LsAttribute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_flags: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::serialize_opt_hex"
    )]
    pub isis_area_id: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_router_id: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_router_id: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sr_capabilities: Option<SrCapability>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sr_algorithms: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_group: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_link_bandwidth: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reservable_bandwidth: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unreserved_bandwidth: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub te_default_metric: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub igp_metric: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adjacency_sids: Vec<AdjacencySid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub igp_flags: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_metric: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ospf_forwarding_address: Option<IpAddr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefix_sids: Vec<PrefixSid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srv6_locator: Option<(Ipv6Addr, u8)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srv6_endpoint_behavior: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty", rename = "unknown")]
    pub unknown_tlvs: Vec<RawTlv>,
}
