use crate::error::ParserError;
use crate::models::{AttributeValue, Community};
use crate::parser::ReadUtils;

const COMMUNITY_NO_EXPORT: u32 = 0xFFFF_FF01;
const COMMUNITY_NO_ADVERTISE: u32 = 0xFFFF_FF02;
const COMMUNITY_NO_EXPORT_SUBCONFED: u32 = 0xFFFF_FF03;

pub fn parse_regular_communities(input: &mut &[u8]) -> Result<AttributeValue, ParserError> {
    let mut communities = Vec::with_capacity(input.remaining() / 4);
    while !input.is_empty() {
        let value = input.read_u32()?;
        communities.push(match value {
            COMMUNITY_NO_EXPORT => Community::NoExport,
            COMMUNITY_NO_ADVERTISE => Community::NoAdvertise,
            COMMUNITY_NO_EXPORT_SUBCONFED => Community::NoExportSubConfed,
            value => Community::Custom((value >> 16) as u16, (value & 0xffff) as u16),
        });
    }
    Ok(AttributeValue::Communities(communities))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_communities() {
        let mut data: &[u8] = &[
            0xFF, 0xFF, 0xFF, 0x01, // no-export
            0x00, 0x7B, 0x01, 0xC8, // 123:456
        ];
        let AttributeValue::Communities(communities) =
            parse_regular_communities(&mut data).unwrap()
        else {
            panic!("wrong attribute value");
        };
        assert_eq!(communities[0], Community::NoExport);
        assert_eq!(communities[1], Community::Custom(123, 456));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut data: &[u8] = &[0xFF, 0xFF];
        assert!(parse_regular_communities(&mut data).is_err());
    }
}
