use ipnet::IpNet;
use num_enum::TryFromPrimitive;
use serde::{Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// AFI -- Address Family Identifier
///
/// <https://www.iana.org/assignments/address-family-numbers/address-family-numbers.xhtml>
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, TryFromPrimitive, Serialize)]
#[repr(u16)]
pub enum Afi {
    Ipv4 = 1,
    Ipv6 = 2,
    L2vpn = 25,
    LinkState = 16388,
}

/// SAFI -- Subsequent Address Family Identifier
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, TryFromPrimitive, Serialize)]
#[repr(u8)]
pub enum Safi {
    Unicast = 1,
    Multicast = 2,
    LabeledUnicast = 4,
    Evpn = 70,
    LinkState = 71,
    LinkStateVpn = 72,
    MplsVpn = 128,
}

/// AS number length on the wire: 16 or 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsnLength {
    Bits16,
    Bits32,
}

/// A network prefix with its optional add-path identifier.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct NetworkPrefix {
    pub prefix: IpNet,
    pub path_id: u32,
}

impl NetworkPrefix {
    pub fn new(prefix: IpNet, path_id: u32) -> NetworkPrefix {
        NetworkPrefix { prefix, path_id }
    }
}

impl Debug for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.path_id == 0 {
            write!(f, "{}", self.prefix)
        } else {
            write!(f, "{}#{}", self.prefix, self.path_id)
        }
    }
}

impl Display for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

impl Serialize for NetworkPrefix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl FromStr for NetworkPrefix {
    type Err = ipnet::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = IpNet::from_str(s)?;
        Ok(NetworkPrefix { prefix, path_id: 0 })
    }
}

/// Next hop carried in an MP_REACH_NLRI attribute.
///
/// IPv6 next hops may carry a link-local address next to the global one.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize)]
#[serde(untagged)]
pub enum NextHopAddress {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Ipv6LinkLocal(Ipv6Addr, Ipv6Addr),
}

impl NextHopAddress {
    /// The address used for routing decisions (the global one, if paired).
    pub const fn addr(&self) -> IpAddr {
        match self {
            NextHopAddress::Ipv4(addr) => IpAddr::V4(*addr),
            NextHopAddress::Ipv6(addr) => IpAddr::V6(*addr),
            NextHopAddress::Ipv6LinkLocal(addr, _) => IpAddr::V6(*addr),
        }
    }
}

impl Display for NextHopAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NextHopAddress::Ipv4(addr) => write!(f, "{}", addr),
            NextHopAddress::Ipv6(addr) => write!(f, "{}", addr),
            NextHopAddress::Ipv6LinkLocal(addr, _) => write!(f, "{}", addr),
        }
    }
}
