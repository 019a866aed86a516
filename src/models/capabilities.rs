use num_enum::{FromPrimitive, IntoPrimitive};
use serde::Serialize;

/// BGP capability codes (RFC 5492 and the IANA capability registry).
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum BgpCapabilityType {
    MULTIPROTOCOL_EXTENSIONS = 1,
    ROUTE_REFRESH = 2,
    OUTBOUND_ROUTE_FILTERING = 3,
    EXTENDED_NEXT_HOP_ENCODING = 5,
    BGP_EXTENDED_MESSAGE = 6,
    GRACEFUL_RESTART = 64,
    FOUR_OCTET_AS_NUMBER = 65,
    ADD_PATH = 69,
    ENHANCED_ROUTE_REFRESH = 70,
    FQDN = 73,

    /// Catch-all for deprecated, unassigned, or reserved codes.
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// ADD-PATH direction for one address family (RFC 7911 section 4).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive, Serialize)]
#[repr(u8)]
pub enum AddPathDirection {
    #[num_enum(default)]
    None = 0,
    Receive = 1,
    Send = 2,
    SendReceive = 3,
}

impl AddPathDirection {
    /// True when the advertising speaker will prepend path identifiers to
    /// the NLRI it sends.
    pub const fn sends_path_id(&self) -> bool {
        matches!(self, AddPathDirection::Send | AddPathDirection::SendReceive)
    }
}

/// One negotiated address family.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize)]
pub struct AfiSafi {
    pub afi: u16,
    pub safi: u8,
}

/// What a peer negotiated in the OPEN captured by a Peer Up notification.
///
/// A Peer Up with no captured OPEN bytes is legal; the defaults apply
/// (no multiprotocol families, 2-byte ASNs, no add-path).
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PeerCapabilities {
    pub families: Vec<AfiSafi>,
    pub add_paths: Vec<(AfiSafi, AddPathDirection)>,
    pub four_octet_as: bool,
}

impl PeerCapabilities {
    /// Add-path state for one family; families absent from the capability
    /// default to no path identifiers.
    pub fn add_path(&self, afi: u16, safi: u8) -> AddPathDirection {
        self.add_paths
            .iter()
            .find(|(fam, _)| fam.afi == afi && fam.safi == safi)
            .map(|(_, dir)| *dir)
            .unwrap_or(AddPathDirection::None)
    }

    pub fn supports_family(&self, afi: u16, safi: u8) -> bool {
        self.families.iter().any(|f| f.afi == afi && f.safi == safi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_codes() {
        assert_eq!(
            BgpCapabilityType::from(1u8),
            BgpCapabilityType::MULTIPROTOCOL_EXTENSIONS
        );
        assert_eq!(BgpCapabilityType::from(69u8), BgpCapabilityType::ADD_PATH);
        assert_eq!(BgpCapabilityType::from(200u8), BgpCapabilityType::Unknown(200));
    }

    #[test]
    fn test_add_path_lookup() {
        let caps = PeerCapabilities {
            families: vec![AfiSafi { afi: 1, safi: 1 }],
            add_paths: vec![(AfiSafi { afi: 1, safi: 1 }, AddPathDirection::SendReceive)],
            four_octet_as: true,
        };
        assert!(caps.add_path(1, 1).sends_path_id());
        assert_eq!(caps.add_path(2, 1), AddPathDirection::None);
        assert!(caps.supports_family(1, 1));
        assert!(!caps.supports_family(1, 128));
    }
}
