use crate::error::ParserError;
use crate::models::AttributeValue;
use crate::parser::tlv::RawTlv;

/// BGP Prefix-SID attribute (RFC 8669): a TLV tree whose members the
/// collector carries through without interpretation. Its envelope uses a
/// one-byte type with a two-byte length, so it cannot reuse the shared
/// 2+2 walker; the validation rules are the same.
pub fn parse_prefix_sid(input: &[u8]) -> Result<AttributeValue, ParserError> {
    let mut tlvs = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        if rest.len() < 3 {
            return Err(ParserError::Truncated {
                name: "prefix SID TLV header",
                expected: 3,
                found: rest.len(),
            });
        }
        let tlv_type = rest[0] as u16;
        let length = u16::from_be_bytes([rest[1], rest[2]]) as usize;
        if rest.len() < 3 + length {
            return Err(ParserError::Truncated {
                name: "prefix SID TLV value",
                expected: length,
                found: rest.len() - 3,
            });
        }
        tlvs.push(RawTlv::new(tlv_type, rest[3..3 + length].to_vec()));
        rest = &rest[3 + length..];
    }
    Ok(AttributeValue::PrefixSid(tlvs))
}
