use std::net::IpAddr;

use crate::error::ParserError;
use crate::models::PeerCapabilities;
use crate::parser::bgp::messages::{parse_bgp_message, BgpMessage, BgpOpenMessage};
use crate::parser::bmp::messages::headers::BmpPerPeerHeader;
use crate::parser::bmp::messages::initiation_message::{parse_information_tlvs, InformationTlv};
use crate::parser::ReadUtils;

/// Peer Up notification (RFC 7854 section 4.10): the local side of the
/// monitored session plus the OPEN messages captured in both directions.
#[derive(Debug, PartialEq, Clone)]
pub struct PeerUpNotification {
    pub local_addr: IpAddr,
    pub local_port: u16,
    pub remote_port: u16,
    pub sent_open: Option<BgpOpenMessage>,
    pub received_open: Option<BgpOpenMessage>,
    pub tlvs: Vec<InformationTlv>,
}

impl PeerUpNotification {
    /// Capabilities that govern decoding of this peer's route monitoring
    /// stream. The OPEN the router sent reflects what the router will
    /// encode; with no captured OPEN the defaults apply.
    pub fn negotiated_capabilities(&self) -> PeerCapabilities {
        self.sent_open
            .as_ref()
            .map(|open| open.capabilities.clone())
            .unwrap_or_default()
    }
}

pub fn parse_peer_up_notification(
    data: &mut &[u8],
    peer: &BmpPerPeerHeader,
) -> Result<PeerUpNotification, ParserError> {
    let local_addr: IpAddr = if peer.peer_ip.is_ipv6() {
        data.read_ipv6_address()?.into()
    } else {
        data.advance(12)?;
        data.read_ipv4_address()?.into()
    };
    let local_port = data.read_u16()?;
    let remote_port = data.read_u16()?;

    // zero captured OPEN bytes is legal; default capabilities apply
    let mut sent_open = None;
    let mut received_open = None;
    if !data.is_empty() {
        if let BgpMessage::Open(open) = parse_bgp_message(data, peer.asn_len(), None)? {
            sent_open = Some(open);
        }
    }
    if !data.is_empty() {
        if let BgpMessage::Open(open) = parse_bgp_message(data, peer.asn_len(), None)? {
            received_open = Some(open);
        }
    }

    let tlvs = parse_information_tlvs(data)?;

    Ok(PeerUpNotification {
        local_addr,
        local_port,
        remote_port,
        sent_open,
        received_open,
        tlvs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::bmp::messages::headers::BmpPeerType;
    use bytes::{BufMut, BytesMut};

    fn v4_peer() -> BmpPerPeerHeader {
        BmpPerPeerHeader {
            peer_type: BmpPeerType::Global,
            peer_flags: 0,
            peer_distinguisher: 0,
            peer_ip: "192.168.80.103".parse().unwrap(),
            peer_asn: 5070,
            peer_bgp_id: "192.168.8.8".parse().unwrap(),
            timestamp: 0.0,
        }
    }

    fn open_frame(asn: u16, caps: &[u8]) -> Vec<u8> {
        let mut body = vec![4u8];
        body.extend_from_slice(&asn.to_be_bytes());
        body.extend_from_slice(&90u16.to_be_bytes());
        body.extend_from_slice(&[192, 168, 8, 8]);
        body.push(caps.len() as u8);
        body.extend_from_slice(caps);

        let mut frame = vec![0xff; 16];
        frame.extend_from_slice(&((19 + body.len()) as u16).to_be_bytes());
        frame.push(1); // OPEN
        frame.extend_from_slice(&body);
        frame
    }

    #[test]
    fn test_peer_up_with_opens() {
        let mut data = BytesMut::new();
        data.put_slice(&[0u8; 12]);
        data.put_slice(&[192, 168, 80, 128]); // local address
        data.put_u16(179);
        data.put_u16(33688);
        // multiprotocol ipv4 unicast + vpnv4
        data.put_slice(&open_frame(
            5070,
            &[2, 6, 1, 4, 0, 1, 0, 1, 2, 6, 1, 4, 0, 1, 0, 128],
        ));
        data.put_slice(&open_frame(5070, &[2, 6, 1, 4, 0, 1, 0, 1]));

        let frozen = data.freeze();
        let mut input = frozen.as_ref();
        let peer_up = parse_peer_up_notification(&mut input, &v4_peer()).unwrap();
        assert_eq!(peer_up.local_addr.to_string(), "192.168.80.128");
        assert_eq!(peer_up.local_port, 179);
        assert_eq!(peer_up.remote_port, 33688);

        let caps = peer_up.negotiated_capabilities();
        assert!(caps.supports_family(1, 1));
        assert!(caps.supports_family(1, 128));
    }

    #[test]
    fn test_peer_up_without_opens() {
        let mut data = BytesMut::new();
        data.put_slice(&[0u8; 12]);
        data.put_slice(&[10, 0, 0, 1]);
        data.put_u16(179);
        data.put_u16(50000);

        let frozen = data.freeze();
        let mut input = frozen.as_ref();
        let peer_up = parse_peer_up_notification(&mut input, &v4_peer()).unwrap();
        assert_eq!(peer_up.sent_open, None);
        assert_eq!(peer_up.negotiated_capabilities(), PeerCapabilities::default());
    }
}
