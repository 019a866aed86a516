use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Plain community attribute value (RFC 1997).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Community {
    NoExport,
    NoAdvertise,
    NoExportSubConfed,
    Custom(u16, u16),
}

impl Display for Community {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Community::NoExport => write!(f, "no-export"),
            Community::NoAdvertise => write!(f, "no-advertise"),
            Community::NoExportSubConfed => write!(f, "no-export-sub-confed"),
            Community::Custom(asn, value) => write!(f, "{}:{}", asn, value),
        }
    }
}

impl Serialize for Community {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Extended community (RFC 4360): eight octets, one or two type bytes
/// followed by the value. The collector decodes the four common AS/IPv4
/// specific layouts and keeps everything else raw.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum ExtendedCommunity {
    TwoOctetAsSpecific {
        transitive: bool,
        subtype: u8,
        asn: u16,
        local: u32,
    },
    Ipv4AddressSpecific {
        transitive: bool,
        subtype: u8,
        ip: std::net::Ipv4Addr,
        local: u16,
    },
    FourOctetAsSpecific {
        transitive: bool,
        subtype: u8,
        asn: u32,
        local: u16,
    },
    Opaque {
        transitive: bool,
        subtype: u8,
        value: [u8; 6],
    },
    Raw([u8; 8]),
}

impl Display for ExtendedCommunity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtendedCommunity::TwoOctetAsSpecific {
                subtype, asn, local, ..
            } => write!(f, "ecas2:{}:{}:{}", subtype, asn, local),
            ExtendedCommunity::Ipv4AddressSpecific {
                subtype, ip, local, ..
            } => write!(f, "ecv4:{}:{}:{}", subtype, ip, local),
            ExtendedCommunity::FourOctetAsSpecific {
                subtype, asn, local, ..
            } => write!(f, "ecas4:{}:{}:{}", subtype, asn, local),
            ExtendedCommunity::Opaque { subtype, value, .. } => {
                write!(f, "ecop:{}:{}", subtype, hex::encode(value))
            }
            ExtendedCommunity::Raw(bytes) => write!(f, "ecraw:{}", hex::encode(bytes)),
        }
    }
}

impl Serialize for ExtendedCommunity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Large community (RFC 8092).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct LargeCommunity {
    pub global_administrator: u32,
    pub local_data: [u32; 2],
}

impl Display for LargeCommunity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.global_administrator, self.local_data[0], self.local_data[1]
        )
    }
}

impl Serialize for LargeCommunity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}
