/*!
The eight typed output streams.

Every decoded entity becomes one [`Record`]: a tagged variant carrying
the originating peer identity, the timestamp from the enclosing BMP
per-peer header, and the family-specific payload. The classifier maps a
record to its [`Topic`] and derives a routing key that is a pure
function of the record's contents, so downstream consumers can partition
deterministically.
*/
mod compose;

pub use compose::*;

use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr};

use crate::models::{
    AfiSafi, Community, EthernetSegmentId, EvpnRouteType, ExtendedCommunity, LargeCommunity,
    LsAttribute, LsNlriType, LsProtocolId, LinkDescriptor, MacAddress, MplsLabel, NetworkPrefix,
    NodeDescriptor, Origin, PrefixDescriptor, RouteDistinguisher, Srv6SidDescriptor,
};
use crate::parser::bmp::messages::{BmpPeerType, BmpPerPeerHeader};

/// The fixed set of output streams.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Topic {
    Peer,
    UnicastPrefix,
    LsNode,
    LsLink,
    LsPrefix,
    LsSrv6Sid,
    L3Vpn,
    Evpn,
}

impl Topic {
    pub const ALL: [Topic; 8] = [
        Topic::Peer,
        Topic::UnicastPrefix,
        Topic::LsNode,
        Topic::LsLink,
        Topic::LsPrefix,
        Topic::LsSrv6Sid,
        Topic::L3Vpn,
        Topic::Evpn,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Topic::Peer => "parsed.peer",
            Topic::UnicastPrefix => "parsed.unicast_prefix",
            Topic::LsNode => "parsed.ls_node",
            Topic::LsLink => "parsed.ls_link",
            Topic::LsPrefix => "parsed.ls_prefix",
            Topic::LsSrv6Sid => "parsed.ls_srv6_sid",
            Topic::L3Vpn => "parsed.l3vpn",
            Topic::Evpn => "parsed.evpn",
        }
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Announce or withdraw.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteAction {
    Add,
    Del,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerAction {
    Up,
    Down,
}

/// Peer identity stamped onto every record.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct PeerHeader {
    pub peer_ip: IpAddr,
    pub peer_asn: u32,
    pub peer_bgp_id: Ipv4Addr,
    pub peer_type: BmpPeerType,
    /// Eight distinguisher bytes from the per-peer header, hex encoded.
    pub peer_distinguisher: String,
    pub timestamp: f64,
    pub is_post_policy: bool,
}

impl PeerHeader {
    pub fn from_bmp(peer: &BmpPerPeerHeader) -> PeerHeader {
        PeerHeader {
            peer_ip: peer.peer_ip,
            peer_asn: peer.peer_asn,
            peer_bgp_id: peer.peer_bgp_id,
            peer_type: peer.peer_type,
            peer_distinguisher: hex::encode(peer.peer_distinguisher.to_be_bytes()),
            timestamp: peer.timestamp,
            is_post_policy: peer.is_post_policy(),
        }
    }
}

/// Path attributes shared by every prefix of one UPDATE.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct SharedAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub as_path: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_asn: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nexthop: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub med: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_pref: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub communities: Vec<Community>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ext_communities: Vec<ExtendedCommunity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub large_communities: Vec<LargeCommunity>,
    /// Attributes without a structured decoder, echoed as raw TLVs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown: Vec<UnknownAttribute>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct UnknownAttribute {
    #[serde(rename = "type")]
    pub type_code: u8,
    pub value: String,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct PeerStateChange {
    pub action: PeerAction,
    #[serde(flatten)]
    pub peer: PeerHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_port: Option<u16>,
    /// Address families negotiated in the captured OPEN.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub afi_safi: Vec<AfiSafi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct UnicastPrefixRecord {
    pub action: RouteAction,
    #[serde(flatten)]
    pub peer: PeerHeader,
    pub prefix: NetworkPrefix,
    pub prefix_len: u8,
    #[serde(skip_serializing_if = "is_zero")]
    pub path_id: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<MplsLabel>,
    #[serde(flatten)]
    pub attrs: SharedAttributes,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct L3VpnRecord {
    pub action: RouteAction,
    #[serde(flatten)]
    pub peer: PeerHeader,
    pub rd: RouteDistinguisher,
    pub prefix: NetworkPrefix,
    pub prefix_len: u8,
    #[serde(skip_serializing_if = "is_zero")]
    pub path_id: u32,
    pub labels: Vec<MplsLabel>,
    #[serde(flatten)]
    pub attrs: SharedAttributes,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct EvpnRecord {
    pub action: RouteAction,
    #[serde(flatten)]
    pub peer: PeerHeader,
    pub route_type: EvpnRouteType,
    pub rd: RouteDistinguisher,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub esi: Option<EthernetSegmentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eth_tag: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<MacAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_len: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originator: Option<IpAddr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<MplsLabel>,
    #[serde(flatten)]
    pub attrs: SharedAttributes,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct LsNodeRecord {
    pub action: RouteAction,
    #[serde(flatten)]
    pub peer: PeerHeader,
    pub protocol_id: LsProtocolId,
    pub identifier: u64,
    pub node: NodeDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<LsAttribute>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct LsLinkRecord {
    pub action: RouteAction,
    #[serde(flatten)]
    pub peer: PeerHeader,
    pub protocol_id: LsProtocolId,
    pub identifier: u64,
    pub local_node: NodeDescriptor,
    pub remote_node: NodeDescriptor,
    pub link: LinkDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<LsAttribute>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct LsPrefixRecord {
    pub action: RouteAction,
    #[serde(flatten)]
    pub peer: PeerHeader,
    pub nlri_type: LsNlriType,
    pub protocol_id: LsProtocolId,
    pub identifier: u64,
    pub local_node: NodeDescriptor,
    pub prefix: PrefixDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<LsAttribute>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct LsSrv6SidRecord {
    pub action: RouteAction,
    #[serde(flatten)]
    pub peer: PeerHeader,
    pub protocol_id: LsProtocolId,
    pub identifier: u64,
    pub local_node: NodeDescriptor,
    pub sid: Srv6SidDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<LsAttribute>,
}

/// One record bound for the bus.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(untagged)]
pub enum Record {
    PeerStateChange(PeerStateChange),
    UnicastPrefix(UnicastPrefixRecord),
    L3Vpn(L3VpnRecord),
    Evpn(EvpnRecord),
    LsNode(LsNodeRecord),
    LsLink(LsLinkRecord),
    LsPrefix(LsPrefixRecord),
    LsSrv6Sid(LsSrv6SidRecord),
}

impl Record {
    pub const fn topic(&self) -> Topic {
        match self {
            Record::PeerStateChange(_) => Topic::Peer,
            Record::UnicastPrefix(_) => Topic::UnicastPrefix,
            Record::L3Vpn(_) => Topic::L3Vpn,
            Record::Evpn(_) => Topic::Evpn,
            Record::LsNode(_) => Topic::LsNode,
            Record::LsLink(_) => Topic::LsLink,
            Record::LsPrefix(_) => Topic::LsPrefix,
            Record::LsSrv6Sid(_) => Topic::LsSrv6Sid,
        }
    }

    /// Deterministic routing key: a pure function of the record contents,
    /// stable for downstream partitioning.
    pub fn key(&self) -> Vec<u8> {
        match self {
            Record::PeerStateChange(r) => r.peer.peer_bgp_id.octets().to_vec(),
            Record::UnicastPrefix(r) => {
                let mut key = r.peer.peer_bgp_id.octets().to_vec();
                key.extend_from_slice(format!("{:?}", r.prefix).as_bytes());
                key
            }
            Record::L3Vpn(r) => {
                let mut key = r.peer.peer_bgp_id.octets().to_vec();
                key.extend_from_slice(format!("{:?}", r.prefix).as_bytes());
                key
            }
            Record::Evpn(r) => {
                let mut key = r.rd.to_bytes().to_vec();
                match (&r.mac, &r.esi) {
                    (Some(mac), _) => key.extend_from_slice(&mac.0),
                    (None, Some(esi)) => key.extend_from_slice(&esi.to_bytes()),
                    (None, None) => {}
                }
                key
            }
            Record::LsNode(r) => r.node.router_id_bytes(),
            Record::LsLink(r) => {
                let mut key = r.local_node.router_id_bytes();
                key.extend_from_slice(&r.remote_node.router_id_bytes());
                key
            }
            Record::LsPrefix(r) => {
                let mut key = r.local_node.router_id_bytes();
                if let Some(prefix) = &r.prefix.ip_reachability {
                    key.extend_from_slice(prefix.to_string().as_bytes());
                }
                key
            }
            Record::LsSrv6Sid(r) => {
                let mut key = r.local_node.router_id_bytes();
                for sid in &r.sid.sids {
                    key.extend_from_slice(&sid.octets());
                }
                key
            }
        }
    }

    /// The JSON body shipped on the bus: a structural mirror of the data
    /// model, byte fields hex encoded, addresses in canonical text form.
    pub fn body(&self) -> Vec<u8> {
        // serialization of these shapes cannot fail
        serde_json::to_vec(self).expect("record serialization")
    }
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn test_peer() -> PeerHeader {
        PeerHeader {
            peer_ip: "192.168.80.103".parse().unwrap(),
            peer_asn: 5070,
            peer_bgp_id: Ipv4Addr::new(192, 168, 8, 8),
            peer_type: BmpPeerType::Global,
            peer_distinguisher: hex::encode(0u64.to_be_bytes()),
            timestamp: 1583459419.0,
            is_post_policy: false,
        }
    }

    #[test]
    fn test_topic_names() {
        assert_eq!(Topic::Peer.as_str(), "parsed.peer");
        assert_eq!(Topic::LsSrv6Sid.as_str(), "parsed.ls_srv6_sid");
        assert_eq!(Topic::ALL.len(), 8);
    }

    #[test]
    fn test_unicast_key_is_deterministic() {
        let record = Record::UnicastPrefix(UnicastPrefixRecord {
            action: RouteAction::Add,
            peer: test_peer(),
            prefix: NetworkPrefix::from_str("10.0.0.0/24").unwrap(),
            prefix_len: 24,
            path_id: 0,
            labels: vec![],
            attrs: SharedAttributes::default(),
        });
        assert_eq!(record.key(), record.key());
        assert_eq!(record.topic(), Topic::UnicastPrefix);

        let mut expected = vec![192, 168, 8, 8];
        expected.extend_from_slice(b"10.0.0.0/24");
        assert_eq!(record.key(), expected);
    }

    #[test]
    fn test_evpn_key_mac_fallback_esi() {
        let rd = RouteDistinguisher::As2 {
            asn: 100,
            assigned: 1,
        };
        let esi = EthernetSegmentId {
            esi_type: 0,
            value: [1; 9],
        };
        let with_mac = Record::Evpn(EvpnRecord {
            action: RouteAction::Add,
            peer: test_peer(),
            route_type: EvpnRouteType::MacIpAdvertisement,
            rd,
            esi: Some(esi),
            eth_tag: Some(0),
            mac: Some(MacAddress([0xaa; 6])),
            ip: None,
            prefix: None,
            prefix_len: None,
            gateway: None,
            originator: None,
            labels: vec![],
            attrs: SharedAttributes::default(),
        });

        let mut expected = rd.to_bytes().to_vec();
        expected.extend_from_slice(&[0xaa; 6]);
        assert_eq!(with_mac.key(), expected);

        let Record::Evpn(mut inner) = with_mac else {
            unreachable!()
        };
        inner.mac = None;
        let without_mac = Record::Evpn(inner);
        let mut expected = rd.to_bytes().to_vec();
        expected.extend_from_slice(&esi.to_bytes());
        assert_eq!(without_mac.key(), expected);
    }

    #[test]
    fn test_peer_record_body_shape() {
        let record = Record::PeerStateChange(PeerStateChange {
            action: PeerAction::Up,
            peer: test_peer(),
            local_ip: Some("192.168.80.128".parse().unwrap()),
            local_port: Some(179),
            remote_port: Some(33688),
            afi_safi: vec![AfiSafi { afi: 1, safi: 1 }],
            reason: None,
        });
        let body: serde_json::Value = serde_json::from_slice(&record.body()).unwrap();
        assert_eq!(body["action"], "up");
        assert_eq!(body["peer_asn"], 5070);
        assert_eq!(body["peer_bgp_id"], "192.168.8.8");
        assert_eq!(body["afi_safi"][0]["afi"], 1);
        assert!(body.get("reason").is_none());
    }
}
