use crate::error::ParserError;
use crate::parser::ReadUtils;

const TERM_TLV_STRING: u16 = 0;
const TERM_TLV_REASON: u16 = 1;

/// Reason codes from RFC 7854 section 4.5.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TerminationMessage {
    pub reason: Option<u16>,
    pub info: Vec<String>,
}

pub fn parse_termination_message(data: &mut &[u8]) -> Result<TerminationMessage, ParserError> {
    let mut reason = None;
    let mut info = Vec::new();

    while data.remaining() >= 4 {
        let info_type = data.read_u16()?;
        let info_len = data.read_u16()? as usize;
        match info_type {
            TERM_TLV_REASON => {
                let mut value = data.split_to(info_len)?;
                reason = Some(value.read_u16()?);
            }
            TERM_TLV_STRING => info.push(data.read_n_bytes_to_string(info_len)?),
            _ => {
                data.advance(info_len)?;
            }
        }
    }

    Ok(TerminationMessage { reason, info })
}
