use crate::error::ParserError;
use crate::models::{AsPath, AsPathSegment, AsnLength};
use crate::parser::ReadUtils;

const SEGMENT_AS_SET: u8 = 1;
const SEGMENT_AS_SEQUENCE: u8 = 2;

pub fn parse_as_path(input: &mut &[u8], asn_len: AsnLength) -> Result<AsPath, ParserError> {
    let mut segments = Vec::new();
    while !input.is_empty() {
        let segment_type = input.read_u8()?;
        let count = input.read_u8()? as usize;

        let mut asns = Vec::with_capacity(count);
        for _ in 0..count {
            asns.push(input.read_asn(asn_len)?);
        }

        segments.push(match segment_type {
            SEGMENT_AS_SET => AsPathSegment::AsSet(asns),
            SEGMENT_AS_SEQUENCE => AsPathSegment::AsSequence(asns),
            t => {
                return Err(ParserError::InvalidField(format!(
                    "AS path segment type {}",
                    t
                )))
            }
        });
    }
    Ok(AsPath { segments })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_32bit() {
        let mut data: &[u8] = &[2, 2, 0x00, 0x00, 0xfd, 0xe9, 0x00, 0x00, 0xfd, 0xea];
        let path = parse_as_path(&mut data, AsnLength::Bits32).unwrap();
        assert_eq!(path.to_asn_vec(), vec![65001, 65002]);
        assert_eq!(path.origin_asn(), Some(65002));
    }

    #[test]
    fn test_sequence_16bit() {
        let mut data: &[u8] = &[2, 1, 0xfd, 0xe9];
        let path = parse_as_path(&mut data, AsnLength::Bits16).unwrap();
        assert_eq!(path.to_asn_vec(), vec![65001]);
    }

    #[test]
    fn test_set_segment() {
        let mut data: &[u8] = &[1, 2, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        let path = parse_as_path(&mut data, AsnLength::Bits32).unwrap();
        assert_eq!(path.segments, vec![AsPathSegment::AsSet(vec![1, 2])]);
    }

    #[test]
    fn test_truncated_segment() {
        let mut data: &[u8] = &[2, 4, 0x00, 0x00];
        assert!(parse_as_path(&mut data, AsnLength::Bits32).is_err());
    }
}
