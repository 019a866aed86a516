use crate::error::ParserError;
use crate::parser::ReadUtils;

pub const INFO_TLV_STRING: u16 = 0;
pub const INFO_TLV_SYS_DESCR: u16 = 1;
pub const INFO_TLV_SYS_NAME: u16 = 2;

/// Information TLV carried by initiation, termination and peer up
/// messages (RFC 7854 section 4.4).
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct InformationTlv {
    pub info_type: u16,
    pub value: String,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct InitiationMessage {
    pub tlvs: Vec<InformationTlv>,
}

impl InitiationMessage {
    pub fn sys_name(&self) -> Option<&str> {
        self.tlvs
            .iter()
            .find(|t| t.info_type == INFO_TLV_SYS_NAME)
            .map(|t| t.value.as_str())
    }

    pub fn sys_descr(&self) -> Option<&str> {
        self.tlvs
            .iter()
            .find(|t| t.info_type == INFO_TLV_SYS_DESCR)
            .map(|t| t.value.as_str())
    }
}

pub fn parse_information_tlvs(data: &mut &[u8]) -> Result<Vec<InformationTlv>, ParserError> {
    let mut tlvs = Vec::new();
    while data.remaining() >= 4 {
        let info_type = data.read_u16()?;
        let info_len = data.read_u16()? as usize;
        let value = data.read_n_bytes_to_string(info_len)?;
        tlvs.push(InformationTlv { info_type, value });
    }
    Ok(tlvs)
}

pub fn parse_initiation_message(data: &mut &[u8]) -> Result<InitiationMessage, ParserError> {
    Ok(InitiationMessage {
        tlvs: parse_information_tlvs(data)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_initiation() {
        let mut data: Vec<u8> = Vec::new();
        data.extend_from_slice(&INFO_TLV_SYS_NAME.to_be_bytes());
        data.extend_from_slice(&7u16.to_be_bytes());
        data.extend_from_slice(b"router1");
        data.extend_from_slice(&INFO_TLV_SYS_DESCR.to_be_bytes());
        data.extend_from_slice(&4u16.to_be_bytes());
        data.extend_from_slice(b"IOS!");

        let mut input = data.as_slice();
        let msg = parse_initiation_message(&mut input).unwrap();
        assert_eq!(msg.sys_name(), Some("router1"));
        assert_eq!(msg.sys_descr(), Some("IOS!"));
    }

    #[test]
    fn test_parse_empty() {
        let mut input: &[u8] = &[];
        let msg = parse_initiation_message(&mut input).unwrap();
        assert!(msg.tlvs.is_empty());
        assert_eq!(msg.sys_name(), None);
    }
}
