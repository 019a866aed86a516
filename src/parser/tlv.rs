/*!
Generic type/length/value walker.

Every TLV tree in BMP, BGP-LS and EVPN shares the same envelope: a
two-byte type, a two-byte length, then `length` value bytes. The walker
here is context-free; the caller picks the registry that gives the type
codes meaning. Unrecognized TLVs are never dropped — they round-trip
byte-for-byte through [`RawTlv`].
*/
use crate::error::ParserError;
use crate::parser::ReadUtils;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// One TLV as it appeared on the wire.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct RawTlv {
    pub tlv_type: u16,
    pub value: Vec<u8>,
}

impl RawTlv {
    pub fn new(tlv_type: u16, value: Vec<u8>) -> RawTlv {
        RawTlv { tlv_type, value }
    }

    pub fn length(&self) -> u16 {
        self.value.len() as u16
    }

    /// Size on the wire, header included.
    pub fn encoded_len(&self) -> usize {
        4 + self.value.len()
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.tlv_type.to_be_bytes());
        out.extend_from_slice(&self.length().to_be_bytes());
        out.extend_from_slice(&self.value);
    }
}

impl Serialize for RawTlv {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("RawTlv", 2)?;
        s.serialize_field("type", &self.tlv_type)?;
        s.serialize_field("value", &hex::encode(&self.value))?;
        s.end()
    }
}

/// Walk a buffer of TLVs, consuming it exactly.
///
/// A header shorter than four bytes or a declared length exceeding the
/// remaining buffer is `Truncated`; the caller treats that as fatal for
/// the enclosing NLRI while keeping siblings already returned elsewhere.
pub fn walk_tlvs(mut input: &[u8]) -> Result<Vec<RawTlv>, ParserError> {
    let mut tlvs = Vec::new();
    while !input.is_empty() {
        input.require_n_remaining(4, "TLV header")?;
        let tlv_type = input.read_u16()?;
        let length = input.read_u16()? as usize;
        if input.remaining() < length {
            return Err(ParserError::Truncated {
                name: "TLV value",
                expected: length,
                found: input.remaining(),
            });
        }
        let value = input.read_n_bytes(length)?;
        tlvs.push(RawTlv::new(tlv_type, value));
    }
    Ok(tlvs)
}

/// Re-serialize a TLV sequence. For input containing only unrecognized
/// types this reproduces the original buffer byte-for-byte.
pub fn encode_tlvs(tlvs: &[RawTlv]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tlvs.iter().map(RawTlv::encoded_len).sum());
    for tlv in tlvs {
        tlv.encode_into(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_walk_consumes_exactly() {
        let mut data = BytesMut::new();
        data.put_u16(512);
        data.put_u16(4);
        data.put_u32(65000);
        data.put_u16(9999);
        data.put_u16(2);
        data.put_u16(7);

        let input = data.freeze();
        let tlvs = walk_tlvs(&input).unwrap();
        assert_eq!(tlvs.len(), 2);
        assert_eq!(
            tlvs.iter().map(RawTlv::encoded_len).sum::<usize>(),
            input.len()
        );
        assert_eq!(tlvs[0].tlv_type, 512);
        assert_eq!(tlvs[0].value, vec![0, 0, 0xfd, 0xe8]);
        assert_eq!(tlvs[1].tlv_type, 9999);
    }

    #[test]
    fn test_walk_empty_input() {
        assert!(walk_tlvs(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_walk_truncated_header() {
        let data = [0x02, 0x00, 0x00];
        assert!(matches!(
            walk_tlvs(&data),
            Err(ParserError::Truncated { .. })
        ));
    }

    #[test]
    fn test_walk_overlong_declared_length() {
        let mut data = BytesMut::new();
        data.put_u16(1024);
        data.put_u16(100);
        data.put_slice(&[0u8; 10]);
        assert!(matches!(
            walk_tlvs(&data.freeze()),
            Err(ParserError::Truncated {
                expected: 100,
                found: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_opaque_round_trip() {
        let mut data = BytesMut::new();
        for (ty, len) in [(60000u16, 3usize), (60001, 0), (61000, 16)] {
            data.put_u16(ty);
            data.put_u16(len as u16);
            data.put_slice(&vec![0xab; len]);
        }
        let input = data.freeze().to_vec();
        let tlvs = walk_tlvs(&input).unwrap();
        assert_eq!(encode_tlvs(&tlvs), input);
    }

    #[test]
    fn test_raw_tlv_serializes_hex() {
        let tlv = RawTlv::new(1024, vec![0xde, 0xad]);
        assert_eq!(
            serde_json::to_string(&tlv).unwrap(),
            r#"{"type":1024,"value":"dead"}"#
        );
    }
}
