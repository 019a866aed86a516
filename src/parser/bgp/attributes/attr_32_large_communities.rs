use crate::error::ParserError;
use crate::models::{AttributeValue, LargeCommunity};
use crate::parser::ReadUtils;

pub fn parse_large_communities(input: &mut &[u8]) -> Result<AttributeValue, ParserError> {
    let mut communities = Vec::with_capacity(input.remaining() / 12);
    while !input.is_empty() {
        communities.push(LargeCommunity {
            global_administrator: input.read_u32()?,
            local_data: [input.read_u32()?, input.read_u32()?],
        });
    }
    Ok(AttributeValue::LargeCommunities(communities))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_large_communities() {
        let mut data: &[u8] = &[
            0x00, 0x00, 0xfd, 0xe8, // 65000
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02,
        ];
        let AttributeValue::LargeCommunities(communities) =
            parse_large_communities(&mut data).unwrap()
        else {
            panic!("wrong attribute value");
        };
        assert_eq!(communities[0].to_string(), "65000:1:2");
    }
}
