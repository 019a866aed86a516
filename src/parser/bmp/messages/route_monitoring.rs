use crate::error::ParserError;
use crate::models::PeerCapabilities;
use crate::parser::bgp::messages::{parse_bgp_message, BgpMessage};
use crate::parser::bmp::messages::headers::BmpPerPeerHeader;

/// Route Monitoring (RFC 7854 section 4.6): exactly one BGP message,
/// almost always an UPDATE, decoded with the peer's negotiated
/// capabilities.
#[derive(Debug, PartialEq, Clone)]
pub struct RouteMonitoring {
    pub bgp_message: BgpMessage,
}

impl RouteMonitoring {
    pub fn is_end_of_rib(&self) -> bool {
        match &self.bgp_message {
            BgpMessage::Update(update) => update.is_end_of_rib(),
            _ => false,
        }
    }
}

pub fn parse_route_monitoring(
    data: &mut &[u8],
    peer: &BmpPerPeerHeader,
    caps: Option<&PeerCapabilities>,
) -> Result<RouteMonitoring, ParserError> {
    let bgp_message = parse_bgp_message(data, peer.asn_len(), caps)?;
    Ok(RouteMonitoring { bgp_message })
}
