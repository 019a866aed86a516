use crate::error::ParserError;
use crate::parser::ReadUtils;

const MIRROR_TLV_BGP_MESSAGE: u16 = 0;
const MIRROR_TLV_INFORMATION: u16 = 1;

/// Route Mirroring (RFC 7854 section 4.7). The collector preserves the
/// mirrored PDUs without decoding them; mirroring is diagnostic traffic.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RouteMirroring {
    pub mirrored_pdus: Vec<Vec<u8>>,
    pub information: Vec<u16>,
}

pub fn parse_route_mirroring(data: &mut &[u8]) -> Result<RouteMirroring, ParserError> {
    let mut mirrored_pdus = Vec::new();
    let mut information = Vec::new();

    while data.remaining() >= 4 {
        let tlv_type = data.read_u16()?;
        let tlv_len = data.read_u16()? as usize;
        let mut value = data.split_to(tlv_len)?;
        match tlv_type {
            MIRROR_TLV_BGP_MESSAGE => mirrored_pdus.push(value.to_vec()),
            MIRROR_TLV_INFORMATION => information.push(value.read_u16()?),
            _ => {}
        }
    }

    Ok(RouteMirroring {
        mirrored_pdus,
        information,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mirroring() {
        let mut data: Vec<u8> = Vec::new();
        data.extend_from_slice(&MIRROR_TLV_INFORMATION.to_be_bytes());
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(&1u16.to_be_bytes()); // messages lost

        let mut input = data.as_slice();
        let msg = parse_route_mirroring(&mut input).unwrap();
        assert_eq!(msg.information, vec![1]);
        assert!(msg.mirrored_pdus.is_empty());
    }
}
