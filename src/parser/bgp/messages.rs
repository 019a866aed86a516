use log::warn;
use num_enum::TryFromPrimitive;
use std::net::Ipv4Addr;

use crate::error::ParserError;
use crate::models::{
    AddPathDirection, AfiSafi, AsnLength, Attributes, BgpCapabilityType, NetworkPrefix,
    PeerCapabilities,
};
use crate::parser::bgp::attributes::parse_attributes;
use crate::parser::{parse_nlri_list, ReadUtils};

/// BGP message types (RFC 4271 section 4.1).
#[derive(Debug, PartialEq, Eq, Copy, Clone, TryFromPrimitive)]
#[repr(u8)]
pub enum BgpMessageType {
    Open = 1,
    Update = 2,
    Notification = 3,
    KeepAlive = 4,
}

#[derive(Debug, PartialEq, Clone)]
pub enum BgpMessage {
    Open(BgpOpenMessage),
    Update(BgpUpdateMessage),
    Notification(BgpNotificationMessage),
    KeepAlive,
}

/// A BGP OPEN as captured by a BMP Peer Up notification.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BgpOpenMessage {
    pub version: u8,
    pub asn: u32,
    pub hold_time: u16,
    pub bgp_id: Ipv4Addr,
    pub capabilities: PeerCapabilities,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BgpUpdateMessage {
    pub withdrawn_prefixes: Vec<NetworkPrefix>,
    pub attributes: Attributes,
    pub announced_prefixes: Vec<NetworkPrefix>,
}

impl BgpUpdateMessage {
    /// An UPDATE with no withdrawals, no attributes and no NLRI is the
    /// End-of-RIB marker (RFC 4724 section 2).
    pub fn is_end_of_rib(&self) -> bool {
        self.withdrawn_prefixes.is_empty()
            && self.announced_prefixes.is_empty()
            && self.attributes.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BgpNotificationMessage {
    pub error_code: u8,
    pub error_subcode: u8,
    pub data: Vec<u8>,
}

/// Parse one BGP message, 19-byte header included.
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Marker (16 octets)                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Length               |      Type     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
pub fn parse_bgp_message(
    data: &mut &[u8],
    asn_len: AsnLength,
    caps: Option<&PeerCapabilities>,
) -> Result<BgpMessage, ParserError> {
    data.require_n_remaining(19, "BGP message header")?;
    data.advance(16)?;

    let length = data.read_u16()? as usize;
    if !(19..=4096).contains(&length) {
        return Err(ParserError::Protocol(format!(
            "BGP message length {} out of range",
            length
        )));
    }
    let msg_type = data.read_u8()?;
    let msg_type = BgpMessageType::try_from(msg_type).map_err(|_| {
        ParserError::Protocol(format!("BGP message type {} out of range", msg_type))
    })?;

    let mut body = data.split_to(length - 19)?;

    Ok(match msg_type {
        BgpMessageType::Open => BgpMessage::Open(parse_bgp_open_message(&mut body)?),
        BgpMessageType::Update => {
            BgpMessage::Update(parse_bgp_update_message(body, asn_len, caps)?)
        }
        BgpMessageType::Notification => {
            BgpMessage::Notification(parse_bgp_notification_message(&mut body)?)
        }
        BgpMessageType::KeepAlive => BgpMessage::KeepAlive,
    })
}

/// Parse a BGP OPEN body and fold its capability parameters into a
/// [`PeerCapabilities`] set.
pub fn parse_bgp_open_message(input: &mut &[u8]) -> Result<BgpOpenMessage, ParserError> {
    input.require_n_remaining(10, "BGP open header")?;
    let version = input.read_u8()?;
    let mut asn = input.read_u16()? as u32;
    let hold_time = input.read_u16()?;
    let bgp_id = input.read_ipv4_address()?;

    let opt_params_len = input.read_u8()? as usize;
    let mut params = input.split_to(opt_params_len.min(input.remaining()))?;
    if params.remaining() != opt_params_len {
        warn!(
            "OPEN declares {} parameter bytes, {} present",
            opt_params_len,
            params.remaining()
        );
    }

    let mut capabilities = PeerCapabilities::default();
    while params.remaining() >= 2 {
        let param_type = params.read_u8()?;
        let param_len = params.read_u8()? as usize;
        let mut value = params.split_to(param_len)?;

        // only parameter type 2 (capabilities) is defined today
        if param_type != 2 {
            continue;
        }
        while value.remaining() >= 2 {
            let code = BgpCapabilityType::from(value.read_u8()?);
            let cap_len = value.read_u8()? as usize;
            let mut cap = value.split_to(cap_len)?;
            apply_capability(&mut capabilities, code, &mut cap, &mut asn)?;
        }
    }

    Ok(BgpOpenMessage {
        version,
        asn,
        hold_time,
        bgp_id,
        capabilities,
    })
}

fn apply_capability(
    caps: &mut PeerCapabilities,
    code: BgpCapabilityType,
    value: &mut &[u8],
    asn: &mut u32,
) -> Result<(), ParserError> {
    match code {
        BgpCapabilityType::MULTIPROTOCOL_EXTENSIONS => {
            let afi = value.read_u16()?;
            value.advance(1)?; // reserved
            let safi = value.read_u8()?;
            caps.families.push(AfiSafi { afi, safi });
        }
        BgpCapabilityType::FOUR_OCTET_AS_NUMBER => {
            caps.four_octet_as = true;
            let wide_asn = value.read_u32()?;
            // AS_TRANS in the fixed header means the real ASN is here
            if *asn == 23456 || *asn == 0 {
                *asn = wide_asn;
            }
        }
        BgpCapabilityType::ADD_PATH => {
            while value.remaining() >= 4 {
                let afi = value.read_u16()?;
                let safi = value.read_u8()?;
                let direction = AddPathDirection::from(value.read_u8()?);
                caps.add_paths.push((AfiSafi { afi, safi }, direction));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn parse_bgp_notification_message(
    input: &mut &[u8],
) -> Result<BgpNotificationMessage, ParserError> {
    let error_code = input.read_u8()?;
    let error_subcode = input.read_u8()?;
    let data = input.read_n_bytes(input.remaining())?;
    Ok(BgpNotificationMessage {
        error_code,
        error_subcode,
        data,
    })
}

/// Parse a BGP UPDATE body (header already stripped).
///
/// RFC 4271 section 4.3: withdrawn-routes length and prefixes, total
/// path attribute length and attributes, then the remaining bytes as
/// IPv4 unicast NLRI. Empty withdrawals and empty NLRI are both legal.
pub fn parse_bgp_update_message(
    mut input: &[u8],
    asn_len: AsnLength,
    caps: Option<&PeerCapabilities>,
) -> Result<BgpUpdateMessage, ParserError> {
    let add_path = caps.map(|c| c.add_path(1, 1).sends_path_id());

    let withdrawn_len = input.read_u16()? as usize;
    let withdrawn_bytes = input.split_to(withdrawn_len)?;
    let withdrawn_prefixes = parse_nlri_list(withdrawn_bytes, add_path, crate::models::Afi::Ipv4)?;

    let attr_len = input.read_u16()? as usize;
    let attr_bytes = input.split_to(attr_len)?;
    let attributes = parse_attributes(attr_bytes, asn_len, caps)?;

    let announced_prefixes = parse_nlri_list(input, add_path, crate::models::Afi::Ipv4)?;

    Ok(BgpUpdateMessage {
        withdrawn_prefixes,
        attributes,
        announced_prefixes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgp_header(body_len: usize, msg_type: u8) -> Vec<u8> {
        let mut data = vec![0xff; 16];
        data.extend_from_slice(&((19 + body_len) as u16).to_be_bytes());
        data.push(msg_type);
        data
    }

    #[test]
    fn test_end_of_rib() {
        let body = [0u8, 0, 0, 0];
        let mut frame = bgp_header(body.len(), 2);
        frame.extend_from_slice(&body);

        let mut data = frame.as_slice();
        let BgpMessage::Update(update) =
            parse_bgp_message(&mut data, AsnLength::Bits32, None).unwrap()
        else {
            panic!("wrong message type");
        };
        assert!(update.is_end_of_rib());
        assert!(update.withdrawn_prefixes.is_empty());
        assert!(update.announced_prefixes.is_empty());
    }

    #[test]
    fn test_update_with_nlri() {
        let mut body = vec![0u8, 0]; // no withdrawals
        let attrs: Vec<u8> = vec![
            0x40, 0x01, 0x01, 0x00, // ORIGIN IGP
            0x40, 0x03, 0x04, 0xc0, 0x00, 0x02, 0x01, // NEXT_HOP
        ];
        body.extend_from_slice(&(attrs.len() as u16).to_be_bytes());
        body.extend_from_slice(&attrs);
        body.extend_from_slice(&[24, 10, 0, 0]); // 10.0.0.0/24

        let mut frame = bgp_header(body.len(), 2);
        frame.extend_from_slice(&body);

        let mut data = frame.as_slice();
        let BgpMessage::Update(update) =
            parse_bgp_message(&mut data, AsnLength::Bits32, None).unwrap()
        else {
            panic!("wrong message type");
        };
        assert_eq!(update.announced_prefixes.len(), 1);
        assert_eq!(update.announced_prefixes[0].to_string(), "10.0.0.0/24");
        assert_eq!(
            update.attributes.next_hop(),
            Some("192.0.2.1".parse().unwrap())
        );
    }

    #[test]
    fn test_bad_message_type() {
        let frame = bgp_header(0, 9);
        let mut data = frame.as_slice();
        assert!(matches!(
            parse_bgp_message(&mut data, AsnLength::Bits32, None),
            Err(ParserError::Protocol(_))
        ));
    }

    #[test]
    fn test_open_with_capabilities() {
        let mut body = vec![4u8]; // version
        body.extend_from_slice(&5070u16.to_be_bytes());
        body.extend_from_slice(&90u16.to_be_bytes()); // hold time
        body.extend_from_slice(&[192, 168, 8, 8]); // bgp id

        let mut caps: Vec<u8> = Vec::new();
        // multiprotocol: ipv4 unicast
        caps.extend_from_slice(&[2, 6, 1, 4, 0, 1, 0, 1]);
        // multiprotocol: vpnv4
        caps.extend_from_slice(&[2, 6, 1, 4, 0, 1, 0, 128]);
        // four-octet AS
        caps.extend_from_slice(&[2, 6, 65, 4, 0, 0, 0x13, 0xce]);
        // add-path: ipv4 unicast, send/receive
        caps.extend_from_slice(&[2, 6, 69, 4, 0, 1, 1, 3]);

        body.push(caps.len() as u8);
        body.extend_from_slice(&caps);

        let mut data = body.as_slice();
        let open = parse_bgp_open_message(&mut data).unwrap();
        assert_eq!(open.asn, 5070);
        assert_eq!(open.bgp_id, Ipv4Addr::new(192, 168, 8, 8));
        assert!(open.capabilities.supports_family(1, 1));
        assert!(open.capabilities.supports_family(1, 128));
        assert!(open.capabilities.four_octet_as);
        assert!(open.capabilities.add_path(1, 1).sends_path_id());
    }

    #[test]
    fn test_open_without_capabilities() {
        let mut body = vec![4u8];
        body.extend_from_slice(&65001u16.to_be_bytes());
        body.extend_from_slice(&180u16.to_be_bytes());
        body.extend_from_slice(&[10, 0, 0, 1]);
        body.push(0);

        let mut data = body.as_slice();
        let open = parse_bgp_open_message(&mut data).unwrap();
        assert_eq!(open.capabilities, PeerCapabilities::default());
    }
}
