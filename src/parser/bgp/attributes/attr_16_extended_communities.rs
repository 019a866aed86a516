use crate::error::ParserError;
use crate::models::{AttributeValue, ExtendedCommunity};
use crate::parser::ReadUtils;

pub fn parse_extended_communities(input: &mut &[u8]) -> Result<AttributeValue, ParserError> {
    let mut communities = Vec::with_capacity(input.remaining() / 8);
    while !input.is_empty() {
        let mut raw = [0u8; 8];
        input.read_exact(&mut raw)?;

        let type_high = raw[0];
        let transitive = type_high & 0x40 == 0;
        let subtype = raw[1];

        communities.push(match type_high & 0x3f {
            0x00 => ExtendedCommunity::TwoOctetAsSpecific {
                transitive,
                subtype,
                asn: u16::from_be_bytes([raw[2], raw[3]]),
                local: u32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]),
            },
            0x01 => ExtendedCommunity::Ipv4AddressSpecific {
                transitive,
                subtype,
                ip: std::net::Ipv4Addr::new(raw[2], raw[3], raw[4], raw[5]),
                local: u16::from_be_bytes([raw[6], raw[7]]),
            },
            0x02 => ExtendedCommunity::FourOctetAsSpecific {
                transitive,
                subtype,
                asn: u32::from_be_bytes([raw[2], raw[3], raw[4], raw[5]]),
                local: u16::from_be_bytes([raw[6], raw[7]]),
            },
            0x03 => ExtendedCommunity::Opaque {
                transitive,
                subtype,
                value: [raw[2], raw[3], raw[4], raw[5], raw[6], raw[7]],
            },
            _ => ExtendedCommunity::Raw(raw),
        });
    }
    Ok(AttributeValue::ExtendedCommunities(communities))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_target() {
        // transitive two-octet AS specific, subtype 2 (route target), 65000:100
        let mut data: &[u8] = &[0x00, 0x02, 0xfd, 0xe8, 0x00, 0x00, 0x00, 0x64];
        let AttributeValue::ExtendedCommunities(communities) =
            parse_extended_communities(&mut data).unwrap()
        else {
            panic!("wrong attribute value");
        };
        assert_eq!(
            communities[0],
            ExtendedCommunity::TwoOctetAsSpecific {
                transitive: true,
                subtype: 2,
                asn: 65000,
                local: 100,
            }
        );
    }

    #[test]
    fn test_unrecognized_kept_raw() {
        let mut data: &[u8] = &[0x06, 0x02, 1, 2, 3, 4, 5, 6];
        let AttributeValue::ExtendedCommunities(communities) =
            parse_extended_communities(&mut data).unwrap()
        else {
            panic!("wrong attribute value");
        };
        assert_eq!(
            communities[0],
            ExtendedCommunity::Raw([0x06, 0x02, 1, 2, 3, 4, 5, 6])
        );
    }
}
