//! Labeled unicast (RFC 8277) and L3VPN (RFC 4364) NLRI decoding.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::ParserError;
use crate::models::{Afi, LabeledPrefix, MplsLabel, NetworkPrefix, VpnPrefix};
use crate::parser::primitives::{parse_label_stack, parse_rd};
use crate::parser::ReadUtils;

/// Read the packed prefix bytes that follow a label stack. The NLRI
/// length field counts bits of labels + RD + prefix together, so the
/// prefix length is whatever remains after the stack (and RD) are gone.
fn read_masked_prefix(
    input: &mut &[u8],
    afi: Afi,
    prefix_bits: usize,
) -> Result<NetworkPrefix, ParserError> {
    let byte_len = prefix_bits.div_ceil(8);
    let prefix = match afi {
        Afi::Ipv4 => {
            if prefix_bits > 32 {
                return Err(ParserError::InvalidField(format!(
                    "IPv4 prefix length {} out of range",
                    prefix_bits
                )));
            }
            let mut buff = [0; 4];
            input.read_exact(&mut buff[..byte_len])?;
            IpNet::V4(Ipv4Net::new(Ipv4Addr::from(buff), prefix_bits as u8)?)
        }
        _ => {
            if prefix_bits > 128 {
                return Err(ParserError::InvalidField(format!(
                    "IPv6 prefix length {} out of range",
                    prefix_bits
                )));
            }
            let mut buff = [0; 16];
            input.read_exact(&mut buff[..byte_len])?;
            IpNet::V6(Ipv6Net::new(Ipv6Addr::from(buff), prefix_bits as u8)?)
        }
    };
    Ok(NetworkPrefix::new(prefix, 0))
}

/// Withdrawals carry the compatibility value 0x800000 in place of a real
/// stack; it has no bottom-of-stack bit, so it is read as a single entry.
fn read_stack(input: &mut &[u8], max_bytes: usize) -> Result<Vec<MplsLabel>, ParserError> {
    if input.len() >= 3 && input[..3] == [0x80, 0x00, 0x00] {
        input.advance(3)?;
        return Ok(vec![MplsLabel::WITHDRAWN]);
    }
    parse_label_stack(input, max_bytes)
}

/// Parse a run of labeled-unicast NLRI entries filling `input` exactly.
pub fn parse_labeled_prefixes(
    mut input: &[u8],
    afi: Afi,
    add_path: bool,
) -> Result<Vec<LabeledPrefix>, ParserError> {
    let mut prefixes = Vec::new();
    while !input.is_empty() {
        let path_id = if add_path { input.read_u32()? } else { 0 };
        let total_bits = input.read_u8()? as usize;
        let total_bytes = total_bits.div_ceil(8);
        input.require_n_remaining(total_bytes, "labeled NLRI body")?;

        let labels = read_stack(&mut input, total_bytes)?;
        let label_bits = labels.len() * 24;
        if total_bits < label_bits {
            return Err(ParserError::InvalidField(format!(
                "labeled NLRI length {} shorter than its label stack",
                total_bits
            )));
        }
        let mut prefix = read_masked_prefix(&mut input, afi, total_bits - label_bits)?;
        prefix.path_id = path_id;
        prefixes.push(LabeledPrefix { prefix, labels });
    }
    Ok(prefixes)
}

/// Parse a run of L3VPN NLRI entries (labels + RD + prefix) filling
/// `input` exactly.
pub fn parse_vpn_prefixes(
    mut input: &[u8],
    afi: Afi,
    add_path: bool,
) -> Result<Vec<VpnPrefix>, ParserError> {
    let mut prefixes = Vec::new();
    while !input.is_empty() {
        let path_id = if add_path { input.read_u32()? } else { 0 };
        let total_bits = input.read_u8()? as usize;
        let total_bytes = total_bits.div_ceil(8);
        input.require_n_remaining(total_bytes, "VPN NLRI body")?;

        let labels = read_stack(&mut input, total_bytes)?;
        let label_bits = labels.len() * 24;
        if total_bits < label_bits + 64 {
            return Err(ParserError::InvalidField(format!(
                "VPN NLRI length {} cannot hold labels and a route distinguisher",
                total_bits
            )));
        }
        let rd = parse_rd(&mut input)?;
        let mut prefix = read_masked_prefix(&mut input, afi, total_bits - label_bits - 64)?;
        prefix.path_id = path_id;
        prefixes.push(VpnPrefix { rd, labels, prefix });
    }
    Ok(prefixes)
}
