use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

/// Route Distinguisher (RFC 4364 section 4.2).
///
/// Eight bytes: a two-byte type followed by a six-byte value whose split
/// between administrator and assigned number depends on the type.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum RouteDistinguisher {
    /// Type 0: 2-byte ASN administrator, 4-byte assigned number.
    As2 { asn: u16, assigned: u32 },
    /// Type 1: IPv4 administrator, 2-byte assigned number.
    Ipv4 { ip: Ipv4Addr, assigned: u16 },
    /// Type 2: 4-byte ASN administrator, 2-byte assigned number.
    As4 { asn: u32, assigned: u16 },
}

impl RouteDistinguisher {
    pub const fn type_code(&self) -> u16 {
        match self {
            RouteDistinguisher::As2 { .. } => 0,
            RouteDistinguisher::Ipv4 { .. } => 1,
            RouteDistinguisher::As4 { .. } => 2,
        }
    }

    /// The eight raw bytes, as they appeared on the wire.
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        buf[..2].copy_from_slice(&self.type_code().to_be_bytes());
        match self {
            RouteDistinguisher::As2 { asn, assigned } => {
                buf[2..4].copy_from_slice(&asn.to_be_bytes());
                buf[4..8].copy_from_slice(&assigned.to_be_bytes());
            }
            RouteDistinguisher::Ipv4 { ip, assigned } => {
                buf[2..6].copy_from_slice(&ip.octets());
                buf[6..8].copy_from_slice(&assigned.to_be_bytes());
            }
            RouteDistinguisher::As4 { asn, assigned } => {
                buf[2..6].copy_from_slice(&asn.to_be_bytes());
                buf[6..8].copy_from_slice(&assigned.to_be_bytes());
            }
        }
        buf
    }
}

/// Canonical text form `type:administrator:assigned`, e.g. `0:65000:1`.
impl Display for RouteDistinguisher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteDistinguisher::As2 { asn, assigned } => write!(f, "0:{}:{}", asn, assigned),
            RouteDistinguisher::Ipv4 { ip, assigned } => write!(f, "1:{}:{}", ip, assigned),
            RouteDistinguisher::As4 { asn, assigned } => write!(f, "2:{}:{}", asn, assigned),
        }
    }
}

impl Serialize for RouteDistinguisher {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}
