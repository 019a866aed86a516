use crate::models::label::MplsLabel;
use crate::models::rd::RouteDistinguisher;
use num_enum::TryFromPrimitive;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::net::IpAddr;

/// EVPN route types (RFC 7432 section 7).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, TryFromPrimitive, Serialize)]
#[repr(u8)]
pub enum EvpnRouteType {
    EthernetAutoDiscovery = 1,
    MacIpAdvertisement = 2,
    InclusiveMulticastEthernetTag = 3,
    EthernetSegment = 4,
    IpPrefix = 5,
}

/// A 48-bit Ethernet MAC address.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct MacAddress(pub [u8; 6]);

impl Display for MacAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl Serialize for MacAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Ethernet Segment Identifier (RFC 7432 section 5).
///
/// One type byte plus nine value bytes; the value layout depends on the
/// type, but the collector stores the raw nine bytes untouched.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct EthernetSegmentId {
    pub esi_type: u8,
    pub value: [u8; 9],
}

impl EthernetSegmentId {
    pub fn to_bytes(&self) -> [u8; 10] {
        let mut buf = [0u8; 10];
        buf[0] = self.esi_type;
        buf[1..].copy_from_slice(&self.value);
        buf
    }

    pub fn is_zero(&self) -> bool {
        self.esi_type == 0 && self.value.iter().all(|b| *b == 0)
    }
}

impl Display for EthernetSegmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}:{}", self.esi_type, hex::encode(self.value))
    }
}

impl Serialize for EthernetSegmentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(hex::encode(self.to_bytes()).as_str())
    }
}

/// Ethernet Auto-Discovery route (type 1).
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct EthernetAutoDiscovery {
    pub rd: RouteDistinguisher,
    pub esi: EthernetSegmentId,
    pub eth_tag: u32,
    pub labels: Vec<MplsLabel>,
}

/// MAC/IP Advertisement route (type 2).
///
/// MAC and IP parts are both length-prefixed in bits; a zero IP length is
/// legal and leaves `ip` empty.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct MacIpAdvertisement {
    pub rd: RouteDistinguisher,
    pub esi: EthernetSegmentId,
    pub eth_tag: u32,
    pub mac: MacAddress,
    pub ip: Option<IpAddr>,
    pub labels: Vec<MplsLabel>,
}

/// Inclusive Multicast Ethernet Tag route (type 3).
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct InclusiveMulticastEthernetTag {
    pub rd: RouteDistinguisher,
    pub eth_tag: u32,
    pub originator: IpAddr,
}

/// Ethernet Segment route (type 4).
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct EthernetSegmentRoute {
    pub rd: RouteDistinguisher,
    pub esi: EthernetSegmentId,
    pub originator: IpAddr,
}

/// IP Prefix route (type 5, RFC 9136).
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct EvpnIpPrefix {
    pub rd: RouteDistinguisher,
    pub esi: EthernetSegmentId,
    pub eth_tag: u32,
    pub prefix: IpAddr,
    pub prefix_len: u8,
    pub gateway: Option<IpAddr>,
    pub labels: Vec<MplsLabel>,
}

/// One decoded EVPN route, dispatched by route type.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
#[serde(untagged)]
pub enum EvpnRoute {
    EthernetAutoDiscovery(EthernetAutoDiscovery),
    MacIpAdvertisement(MacIpAdvertisement),
    InclusiveMulticastEthernetTag(InclusiveMulticastEthernetTag),
    EthernetSegment(EthernetSegmentRoute),
    IpPrefix(EvpnIpPrefix),
}

impl EvpnRoute {
    pub const fn route_type(&self) -> EvpnRouteType {
        match self {
            EvpnRoute::EthernetAutoDiscovery(_) => EvpnRouteType::EthernetAutoDiscovery,
            EvpnRoute::MacIpAdvertisement(_) => EvpnRouteType::MacIpAdvertisement,
            EvpnRoute::InclusiveMulticastEthernetTag(_) => {
                EvpnRouteType::InclusiveMulticastEthernetTag
            }
            EvpnRoute::EthernetSegment(_) => EvpnRouteType::EthernetSegment,
            EvpnRoute::IpPrefix(_) => EvpnRouteType::IpPrefix,
        }
    }

    pub const fn rd(&self) -> &RouteDistinguisher {
        match self {
            EvpnRoute::EthernetAutoDiscovery(r) => &r.rd,
            EvpnRoute::MacIpAdvertisement(r) => &r.rd,
            EvpnRoute::InclusiveMulticastEthernetTag(r) => &r.rd,
            EvpnRoute::EthernetSegment(r) => &r.rd,
            EvpnRoute::IpPrefix(r) => &r.rd,
        }
    }

    pub const fn mac(&self) -> Option<&MacAddress> {
        match self {
            EvpnRoute::MacIpAdvertisement(r) => Some(&r.mac),
            _ => None,
        }
    }

    pub const fn esi(&self) -> Option<&EthernetSegmentId> {
        match self {
            EvpnRoute::EthernetAutoDiscovery(r) => Some(&r.esi),
            EvpnRoute::MacIpAdvertisement(r) => Some(&r.esi),
            EvpnRoute::EthernetSegment(r) => Some(&r.esi),
            EvpnRoute::IpPrefix(r) => Some(&r.esi),
            EvpnRoute::InclusiveMulticastEthernetTag(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_display() {
        let mac = MacAddress([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(
            serde_json::to_string(&mac).unwrap(),
            "\"aa:bb:cc:dd:ee:ff\""
        );
    }

    #[test]
    fn test_esi_zero() {
        let esi = EthernetSegmentId {
            esi_type: 0,
            value: [0; 9],
        };
        assert!(esi.is_zero());
        assert_eq!(esi.to_bytes(), [0u8; 10]);

        let esi = EthernetSegmentId {
            esi_type: 1,
            value: [0; 9],
        };
        assert!(!esi.is_zero());
    }

    #[test]
    fn test_route_type_mapping() {
        let route = EvpnRoute::MacIpAdvertisement(MacIpAdvertisement {
            rd: RouteDistinguisher::As2 {
                asn: 100,
                assigned: 1,
            },
            esi: EthernetSegmentId {
                esi_type: 0,
                value: [0; 9],
            },
            eth_tag: 0,
            mac: MacAddress([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            ip: None,
            labels: vec![],
        });
        assert_eq!(route.route_type(), EvpnRouteType::MacIpAdvertisement);
        assert_eq!(route.rd().to_string(), "0:100:1");
        assert!(route.mac().is_some());
        assert!(route.esi().is_some());
    }
}
