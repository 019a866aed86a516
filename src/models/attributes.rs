use crate::models::community::{Community, ExtendedCommunity, LargeCommunity};
use crate::models::label::MplsLabel;
use crate::models::linkstate::LsAttribute;
use crate::models::nlri::MpNlri;
use crate::parser::tlv::RawTlv;
use bitflags::bitflags;
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr};

bitflags! {
    /// BGP path attribute flags (RFC 4271 section 4.3).
    ///
    /// The extended-length bit selects a one- or two-byte attribute
    /// length on the wire.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct AttrFlags: u8 {
        const OPTIONAL   = 0b1000_0000;
        const TRANSITIVE = 0b0100_0000;
        const PARTIAL    = 0b0010_0000;
        const EXTENDED   = 0b0001_0000;
    }
}

/// Path attribute type codes.
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-2>
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum AttrType {
    ORIGIN = 1,
    AS_PATH = 2,
    NEXT_HOP = 3,
    MULTI_EXIT_DISCRIMINATOR = 4,
    LOCAL_PREFERENCE = 5,
    ATOMIC_AGGREGATE = 6,
    AGGREGATOR = 7,
    COMMUNITIES = 8,
    ORIGINATOR_ID = 9,
    CLUSTER_LIST = 10,
    MP_REACHABLE_NLRI = 14,
    MP_UNREACHABLE_NLRI = 15,
    EXTENDED_COMMUNITIES = 16,
    AS4_PATH = 17,
    AS4_AGGREGATOR = 18,
    PMSI_TUNNEL = 22,
    BGP_LS_ATTRIBUTE = 29,
    LARGE_COMMUNITIES = 32,
    BGP_PREFIX_SID = 40,

    /// Catch all for type codes without a structured decoder; the value
    /// bytes are preserved verbatim.
    #[num_enum(catch_all)]
    Unknown(u8) = 254,
}

/// ORIGIN attribute value.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Origin {
    Igp = 0,
    Egp = 1,
    #[num_enum(default)]
    Incomplete = 2,
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Igp => write!(f, "igp"),
            Origin::Egp => write!(f, "egp"),
            Origin::Incomplete => write!(f, "incomplete"),
        }
    }
}

impl Serialize for Origin {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// One AS_PATH segment.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub enum AsPathSegment {
    AsSequence(Vec<u32>),
    AsSet(Vec<u32>),
}

/// AS_PATH attribute: an ordered list of segments.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct AsPath {
    pub segments: Vec<AsPathSegment>,
}

impl AsPath {
    pub fn new() -> AsPath {
        AsPath::default()
    }

    /// Flatten into the plain ASN list records carry. Sets contribute
    /// their members in wire order.
    pub fn to_asn_vec(&self) -> Vec<u32> {
        let mut asns = Vec::new();
        for segment in &self.segments {
            match segment {
                AsPathSegment::AsSequence(seq) | AsPathSegment::AsSet(seq) => {
                    asns.extend_from_slice(seq)
                }
            }
        }
        asns
    }

    /// The origin ASN, i.e. the last ASN of the last sequence segment.
    pub fn origin_asn(&self) -> Option<u32> {
        match self.segments.last()? {
            AsPathSegment::AsSequence(seq) => seq.last().copied(),
            AsPathSegment::AsSet(_) => None,
        }
    }
}

/// PMSI tunnel attribute (RFC 6514 section 5), carried by EVPN
/// inclusive-multicast routes.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct PmsiTunnel {
    pub flags: u8,
    pub tunnel_type: u8,
    pub label: Option<MplsLabel>,
    #[serde(serialize_with = "super::serialize_hex")]
    pub tunnel_id: Vec<u8>,
}

/// A raw attribute the collector has no structured decoder for.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct AttrRaw {
    pub type_code: u8,
    pub flags: u8,
    #[serde(serialize_with = "super::serialize_hex")]
    pub bytes: Vec<u8>,
}

/// Decoded value of one path attribute.
#[derive(Debug, PartialEq, Clone)]
pub enum AttributeValue {
    Origin(Origin),
    AsPath { path: AsPath, is_as4: bool },
    NextHop(IpAddr),
    MultiExitDiscriminator(u32),
    LocalPreference(u32),
    AtomicAggregate,
    Aggregator { asn: u32, id: Ipv4Addr },
    Communities(Vec<Community>),
    ExtendedCommunities(Vec<ExtendedCommunity>),
    LargeCommunities(Vec<LargeCommunity>),
    OriginatorId(Ipv4Addr),
    Clusters(Vec<u32>),
    MpReachNlri(MpNlri),
    MpUnreachNlri(MpNlri),
    LinkState(LsAttribute),
    PmsiTunnel(PmsiTunnel),
    PrefixSid(Vec<RawTlv>),
    Unknown(AttrRaw),
}

/// One attribute together with its wire flags.
#[derive(Debug, PartialEq, Clone)]
pub struct Attribute {
    pub value: AttributeValue,
    pub flags: AttrFlags,
}

/// The attributes of one UPDATE, with typed accessors for the fields
/// records need.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Attributes {
    inner: Vec<Attribute>,
}

impl Attributes {
    pub fn push(&mut self, attr: Attribute) {
        self.inner.push(attr);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.inner.iter()
    }

    pub fn origin(&self) -> Option<Origin> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::Origin(o) => Some(*o),
            _ => None,
        })
    }

    /// Prefer the AS4_PATH when both encodings are present.
    pub fn as_path(&self) -> Option<&AsPath> {
        self.inner.iter().rev().find_map(|a| match &a.value {
            AttributeValue::AsPath { path, .. } => Some(path),
            _ => None,
        })
    }

    pub fn next_hop(&self) -> Option<IpAddr> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::NextHop(addr) => Some(*addr),
            _ => None,
        })
    }

    pub fn med(&self) -> Option<u32> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::MultiExitDiscriminator(v) => Some(*v),
            _ => None,
        })
    }

    pub fn local_pref(&self) -> Option<u32> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::LocalPreference(v) => Some(*v),
            _ => None,
        })
    }

    pub fn communities(&self) -> Option<&[Community]> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::Communities(c) => Some(c.as_slice()),
            _ => None,
        })
    }

    pub fn extended_communities(&self) -> Option<&[ExtendedCommunity]> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::ExtendedCommunities(c) => Some(c.as_slice()),
            _ => None,
        })
    }

    pub fn large_communities(&self) -> Option<&[LargeCommunity]> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::LargeCommunities(c) => Some(c.as_slice()),
            _ => None,
        })
    }

    pub fn reach_nlri(&self) -> Option<&MpNlri> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::MpReachNlri(n) => Some(n),
            _ => None,
        })
    }

    pub fn unreach_nlri(&self) -> Option<&MpNlri> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::MpUnreachNlri(n) => Some(n),
            _ => None,
        })
    }

    pub fn link_state(&self) -> Option<&LsAttribute> {
        self.inner.iter().find_map(|a| match &a.value {
            AttributeValue::LinkState(ls) => Some(ls),
            _ => None,
        })
    }

    pub fn unknown(&self) -> Vec<&AttrRaw> {
        self.inner
            .iter()
            .filter_map(|a| match &a.value {
                AttributeValue::Unknown(raw) => Some(raw),
                _ => None,
            })
            .collect()
    }
}

impl From<Vec<Attribute>> for Attributes {
    fn from(inner: Vec<Attribute>) -> Self {
        Attributes { inner }
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        Attributes {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_type_catch_all() {
        assert_eq!(AttrType::from(1u8), AttrType::ORIGIN);
        assert_eq!(AttrType::from(29u8), AttrType::BGP_LS_ATTRIBUTE);
        assert_eq!(AttrType::from(99u8), AttrType::Unknown(99));
    }

    #[test]
    fn test_as_path_flatten() {
        let path = AsPath {
            segments: vec![
                AsPathSegment::AsSequence(vec![65001, 65002]),
                AsPathSegment::AsSet(vec![65003]),
            ],
        };
        assert_eq!(path.to_asn_vec(), vec![65001, 65002, 65003]);
        // a set at the end hides the origin
        assert_eq!(path.origin_asn(), None);

        let path = AsPath {
            segments: vec![AsPathSegment::AsSequence(vec![65001, 65002])],
        };
        assert_eq!(path.origin_asn(), Some(65002));
    }

    #[test]
    fn test_accessors() {
        let mut attrs = Attributes::default();
        attrs.push(Attribute {
            value: AttributeValue::Origin(Origin::Igp),
            flags: AttrFlags::TRANSITIVE,
        });
        attrs.push(Attribute {
            value: AttributeValue::LocalPreference(200),
            flags: AttrFlags::TRANSITIVE,
        });
        attrs.push(Attribute {
            value: AttributeValue::Unknown(AttrRaw {
                type_code: 77,
                flags: 0xc0,
                bytes: vec![1, 2, 3],
            }),
            flags: AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE,
        });

        assert_eq!(attrs.origin(), Some(Origin::Igp));
        assert_eq!(attrs.local_pref(), Some(200));
        assert_eq!(attrs.med(), None);
        assert_eq!(attrs.unknown().len(), 1);
    }

    #[test]
    fn test_as4_path_preferred() {
        let mut attrs = Attributes::default();
        attrs.push(Attribute {
            value: AttributeValue::AsPath {
                path: AsPath {
                    segments: vec![AsPathSegment::AsSequence(vec![23456])],
                },
                is_as4: false,
            },
            flags: AttrFlags::TRANSITIVE,
        });
        attrs.push(Attribute {
            value: AttributeValue::AsPath {
                path: AsPath {
                    segments: vec![AsPathSegment::AsSequence(vec![4200000000])],
                },
                is_as4: true,
            },
            flags: AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE,
        });

        assert_eq!(attrs.as_path().unwrap().to_asn_vec(), vec![4200000000]);
    }
}
