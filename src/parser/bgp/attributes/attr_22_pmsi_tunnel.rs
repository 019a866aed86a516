use crate::error::ParserError;
use crate::models::{AttributeValue, PmsiTunnel};
use crate::parser::primitives::parse_label;
use crate::parser::ReadUtils;

/// PMSI tunnel attribute (RFC 6514 section 5): flags, tunnel type, a
/// three-byte MPLS label field, then the type-specific tunnel identifier.
/// An all-zero label field means no label was assigned.
pub fn parse_pmsi_tunnel(input: &mut &[u8]) -> Result<AttributeValue, ParserError> {
    let flags = input.read_u8()?;
    let tunnel_type = input.read_u8()?;

    input.require_n_remaining(3, "PMSI tunnel label")?;
    let label = if input[..3] == [0, 0, 0] {
        input.advance(3)?;
        None
    } else {
        Some(parse_label(input)?)
    };

    let tunnel_id = input.read_n_bytes(input.remaining())?;
    Ok(AttributeValue::PmsiTunnel(PmsiTunnel {
        flags,
        tunnel_type,
        label,
        tunnel_id,
    }))
}
