mod attr_01_origin;
mod attr_02_as_path;
mod attr_03_next_hop;
mod attr_04_med;
mod attr_05_local_pref;
mod attr_08_communities;
mod attr_14_15_nlri;
mod attr_16_extended_communities;
mod attr_22_pmsi_tunnel;
mod attr_29_linkstate;
mod attr_32_large_communities;
mod attr_40_prefix_sid;

use log::warn;

use crate::error::ParserError;
use crate::models::*;
use crate::parser::ReadUtils;

use attr_01_origin::parse_origin;
use attr_02_as_path::parse_as_path;
use attr_03_next_hop::parse_next_hop;
use attr_04_med::parse_med;
use attr_05_local_pref::parse_local_pref;
use attr_08_communities::parse_regular_communities;
use attr_14_15_nlri::parse_mp_nlri;
use attr_16_extended_communities::parse_extended_communities;
use attr_22_pmsi_tunnel::parse_pmsi_tunnel;
pub use attr_29_linkstate::parse_link_state_attribute;
use attr_32_large_communities::parse_large_communities;
use attr_40_prefix_sid::parse_prefix_sid;

/// Parse the path attribute section of one UPDATE.
///
/// `data` holds exactly the attribute bytes. Each attribute is flags,
/// type, then a one- or two-byte length selected by the extended-length
/// flag. Codes without a structured decoder are retained verbatim.
///
/// An attribute whose address family is outside the recognized set is
/// dropped with a warning and its siblings survive; any structural error
/// (truncation, bad field) aborts the whole UPDATE.
pub fn parse_attributes(
    mut data: &[u8],
    asn_len: AsnLength,
    caps: Option<&PeerCapabilities>,
) -> Result<Attributes, ParserError> {
    let mut attributes: Vec<Attribute> = Vec::with_capacity(8);

    while data.remaining() >= 3 {
        let flags = AttrFlags::from_bits_retain(data.read_u8()?);
        let type_code = data.read_u8()?;
        let length = match flags.contains(AttrFlags::EXTENDED) {
            false => data.read_u8()? as usize,
            true => data.read_u16()? as usize,
        };

        let mut attr_data = data.split_to(length)?;

        let attr_type = AttrType::from(type_code);
        if let AttrType::Unknown(code) = attr_type {
            attributes.push(Attribute {
                value: AttributeValue::Unknown(AttrRaw {
                    type_code: code,
                    flags: flags.bits(),
                    bytes: attr_data.to_vec(),
                }),
                flags,
            });
            continue;
        }

        let value = match attr_type {
            AttrType::ORIGIN => parse_origin(&mut attr_data),
            AttrType::AS_PATH => parse_as_path(&mut attr_data, asn_len)
                .map(|path| AttributeValue::AsPath { path, is_as4: false }),
            AttrType::AS4_PATH => parse_as_path(&mut attr_data, AsnLength::Bits32)
                .map(|path| AttributeValue::AsPath { path, is_as4: true }),
            AttrType::NEXT_HOP => parse_next_hop(&mut attr_data),
            AttrType::MULTI_EXIT_DISCRIMINATOR => parse_med(&mut attr_data),
            AttrType::LOCAL_PREFERENCE => parse_local_pref(&mut attr_data),
            AttrType::ATOMIC_AGGREGATE => Ok(AttributeValue::AtomicAggregate),
            AttrType::AGGREGATOR | AttrType::AS4_AGGREGATOR => {
                let wire_len = match attr_type {
                    AttrType::AGGREGATOR => asn_len,
                    _ => AsnLength::Bits32,
                };
                let asn = attr_data.read_asn(wire_len)?;
                let id = attr_data.read_ipv4_address()?;
                Ok(AttributeValue::Aggregator { asn, id })
            }
            AttrType::ORIGINATOR_ID => {
                Ok(AttributeValue::OriginatorId(attr_data.read_ipv4_address()?))
            }
            AttrType::CLUSTER_LIST => {
                let mut clusters = Vec::with_capacity(attr_data.remaining() / 4);
                while !attr_data.is_empty() {
                    clusters.push(attr_data.read_u32()?);
                }
                Ok(AttributeValue::Clusters(clusters))
            }
            AttrType::COMMUNITIES => parse_regular_communities(&mut attr_data),
            AttrType::EXTENDED_COMMUNITIES => parse_extended_communities(&mut attr_data),
            AttrType::LARGE_COMMUNITIES => parse_large_communities(&mut attr_data),
            AttrType::MP_REACHABLE_NLRI => parse_mp_nlri(attr_data, true, caps),
            AttrType::MP_UNREACHABLE_NLRI => parse_mp_nlri(attr_data, false, caps),
            AttrType::BGP_LS_ATTRIBUTE => parse_link_state_attribute(attr_data),
            AttrType::PMSI_TUNNEL => parse_pmsi_tunnel(&mut attr_data),
            AttrType::BGP_PREFIX_SID => parse_prefix_sid(attr_data),
            AttrType::Unknown(_) => unreachable!("handled above"),
        };

        match value {
            Ok(value) => attributes.push(Attribute { value, flags }),
            Err(e @ ParserError::UnsupportedFamily { .. }) => {
                warn!("dropping attribute type {}: {}", type_code, e);
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Attributes::from(attributes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_attribute_set() {
        let mut data: Vec<u8> = Vec::new();
        // ORIGIN: flags 0x40, type 1, len 1, IGP
        data.extend_from_slice(&[0x40, 0x01, 0x01, 0x00]);
        // AS_PATH: one sequence of [65001]
        data.extend_from_slice(&[0x50, 0x02, 0x00, 0x06, 0x02, 0x01, 0x00, 0x00, 0xfd, 0xe9]);
        // NEXT_HOP 192.0.2.1
        data.extend_from_slice(&[0x40, 0x03, 0x04, 0xc0, 0x00, 0x02, 0x01]);

        let attrs = parse_attributes(&data, AsnLength::Bits32, None).unwrap();
        assert_eq!(attrs.origin(), Some(Origin::Igp));
        assert_eq!(attrs.as_path().unwrap().to_asn_vec(), vec![65001]);
        assert_eq!(attrs.next_hop(), Some("192.0.2.1".parse().unwrap()));
    }

    #[test]
    fn test_unknown_attribute_preserved() {
        // type 77, flags optional transitive, 3 opaque bytes
        let data = [0xc0, 0x4d, 0x03, 0x01, 0x02, 0x03];
        let attrs = parse_attributes(&data, AsnLength::Bits32, None).unwrap();
        let unknown = attrs.unknown();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].type_code, 77);
        assert_eq!(unknown[0].bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_attribute_overrun_is_structural() {
        // declares 10 value bytes, provides 2
        let data = [0x40, 0x01, 0x0a, 0x00, 0x00];
        assert!(parse_attributes(&data, AsnLength::Bits32, None).is_err());
    }

    #[test]
    fn test_extended_length_attribute() {
        // extended-length unknown attribute with 300-byte body
        let mut data = vec![0xd0, 0x4d, 0x01, 0x2c];
        data.extend_from_slice(&[0xee; 300]);
        let attrs = parse_attributes(&data, AsnLength::Bits32, None).unwrap();
        assert_eq!(attrs.unknown()[0].bytes.len(), 300);
    }
}
