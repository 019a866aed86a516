//! MP_REACH_NLRI / MP_UNREACH_NLRI (RFC 4760).
//!
//! The attribute shares one envelope across address families and
//! dispatches the NLRI payload by AFI/SAFI:
//!
//! ```text
//! +---------------------------------------------------------+
//! | Address Family Identifier (2 octets)                    |
//! +---------------------------------------------------------+
//! | Subsequent Address Family Identifier (1 octet)          |
//! +---------------------------------------------------------+
//! | Length of Next Hop Network Address (1 octet)            |  reach only
//! +---------------------------------------------------------+
//! | Network Address of Next Hop (variable)                  |  reach only
//! +---------------------------------------------------------+
//! | Reserved (1 octet)                                      |  reach only
//! +---------------------------------------------------------+
//! | Network Layer Reachability Information (variable)       |
//! +---------------------------------------------------------+
//! ```

use log::warn;

use crate::error::ParserError;
use crate::models::{Afi, AttributeValue, MpNlri, MpRoutes, PeerCapabilities, Safi};
use crate::parser::bgp::nlri::evpn::parse_evpn_routes;
use crate::parser::bgp::nlri::linkstate::parse_ls_nlris;
use crate::parser::bgp::nlri::vpn::{parse_labeled_prefixes, parse_vpn_prefixes};
use crate::parser::bgp::attributes::attr_03_next_hop::parse_mp_next_hop;
use crate::parser::{parse_nlri_list, ReadUtils};

/// Parse one MP_REACH (`reachable`) or MP_UNREACH attribute body.
///
/// Add-path framing comes from the peer's captured capability; with no
/// capability on file the plain/add-path choice falls back to the layout
/// heuristic in [`parse_nlri_list`].
pub fn parse_mp_nlri(
    mut input: &[u8],
    reachable: bool,
    caps: Option<&PeerCapabilities>,
) -> Result<AttributeValue, ParserError> {
    let afi_code = input.read_u16()?;
    let safi_code = input.read_u8()?;

    let afi = Afi::try_from(afi_code).map_err(|_| ParserError::UnsupportedFamily {
        afi: afi_code,
        safi: safi_code,
    })?;
    let safi = Safi::try_from(safi_code).map_err(|_| ParserError::UnsupportedFamily {
        afi: afi_code,
        safi: safi_code,
    })?;

    let mut next_hop = None;
    if reachable {
        let next_hop_len = input.read_u8()? as usize;
        let next_hop_bytes = input.split_to(next_hop_len)?;
        next_hop = parse_mp_next_hop(next_hop_bytes)?;

        // reserved byte
        if input.read_u8()? != 0 {
            warn!("MP_REACH reserved byte not zero");
        }
    }

    let add_path = caps.map(|c| c.add_path(afi_code, safi_code).sends_path_id());

    let routes = match (afi, safi) {
        (Afi::Ipv4 | Afi::Ipv6, Safi::Unicast | Safi::Multicast) => {
            MpRoutes::Unicast(parse_nlri_list(input, add_path, afi)?)
        }
        (Afi::Ipv4 | Afi::Ipv6, Safi::LabeledUnicast) => MpRoutes::LabeledUnicast(
            parse_labeled_prefixes(input, afi, add_path.unwrap_or(false))?,
        ),
        (Afi::Ipv4 | Afi::Ipv6, Safi::MplsVpn) => {
            MpRoutes::Vpn(parse_vpn_prefixes(input, afi, add_path.unwrap_or(false))?)
        }
        (_, Safi::Evpn) => MpRoutes::Evpn(parse_evpn_routes(input)?),
        (Afi::LinkState, Safi::LinkState | Safi::LinkStateVpn) => {
            MpRoutes::LinkState(parse_ls_nlris(input)?)
        }
        _ => {
            return Err(ParserError::UnsupportedFamily {
                afi: afi_code,
                safi: safi_code,
            })
        }
    };

    let nlri = MpNlri {
        afi,
        safi,
        next_hop,
        routes,
    };
    Ok(match reachable {
        true => AttributeValue::MpReachNlri(nlri),
        false => AttributeValue::MpUnreachNlri(nlri),
    })
}
