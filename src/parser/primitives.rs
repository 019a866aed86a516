/*!
Stateless decoders for the fixed-format fields shared across address
families: route distinguishers, MPLS label stacks, Ethernet segment
identifiers and MAC addresses.
*/
use crate::error::ParserError;
use crate::models::{EthernetSegmentId, MacAddress, MplsLabel, RouteDistinguisher};
use crate::parser::ReadUtils;

/// Read an eight-byte route distinguisher.
pub fn parse_rd(input: &mut &[u8]) -> Result<RouteDistinguisher, ParserError> {
    input.require_n_remaining(8, "route distinguisher")?;
    let rd_type = input.read_u16()?;
    match rd_type {
        0 => Ok(RouteDistinguisher::As2 {
            asn: input.read_u16()?,
            assigned: input.read_u32()?,
        }),
        1 => Ok(RouteDistinguisher::Ipv4 {
            ip: input.read_ipv4_address()?,
            assigned: input.read_u16()?,
        }),
        2 => Ok(RouteDistinguisher::As4 {
            asn: input.read_u32()?,
            assigned: input.read_u16()?,
        }),
        t => Err(ParserError::InvalidField(format!(
            "route distinguisher type {} out of range",
            t
        ))),
    }
}

/// Read one three-byte MPLS label stack entry.
pub fn parse_label(input: &mut &[u8]) -> Result<MplsLabel, ParserError> {
    input.require_n_remaining(3, "MPLS label")?;
    let b0 = input.read_u8()? as u32;
    let b1 = input.read_u8()? as u32;
    let b2 = input.read_u8()? as u32;
    let raw = (b0 << 16) | (b1 << 8) | b2;
    Ok(MplsLabel {
        value: raw >> 4,
        exp: ((raw >> 1) & 0x7) as u8,
        bottom: raw & 0x1 == 1,
    })
}

/// Read label stack entries until the bottom-of-stack bit.
///
/// `max_bytes` bounds how far into the buffer the stack may reach; a
/// stack that runs past it (or past the buffer) is `Truncated`.
pub fn parse_label_stack(
    input: &mut &[u8],
    max_bytes: usize,
) -> Result<Vec<MplsLabel>, ParserError> {
    let mut labels = Vec::new();
    let mut consumed = 0;
    loop {
        if consumed + 3 > max_bytes {
            return Err(ParserError::Truncated {
                name: "label stack",
                expected: consumed + 3,
                found: max_bytes,
            });
        }
        let label = parse_label(input)?;
        consumed += 3;
        let bottom = label.bottom;
        labels.push(label);
        if bottom {
            return Ok(labels);
        }
    }
}

/// Read a ten-byte Ethernet segment identifier: type byte plus nine raw
/// value bytes kept untouched.
pub fn parse_esi(input: &mut &[u8]) -> Result<EthernetSegmentId, ParserError> {
    input.require_n_remaining(10, "ethernet segment identifier")?;
    let esi_type = input.read_u8()?;
    let mut value = [0u8; 9];
    input.read_exact(&mut value)?;
    Ok(EthernetSegmentId { esi_type, value })
}

/// Read a six-byte MAC address.
pub fn parse_mac(input: &mut &[u8]) -> Result<MacAddress, ParserError> {
    input.require_n_remaining(6, "MAC address")?;
    let mut octets = [0u8; 6];
    input.read_exact(&mut octets)?;
    Ok(MacAddress(octets))
}
