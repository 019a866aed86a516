use crate::error::ParserError;
use crate::models::{AttributeValue, Origin};
use crate::parser::ReadUtils;

pub fn parse_origin(input: &mut &[u8]) -> Result<AttributeValue, ParserError> {
    let code = input.read_u8()?;
    if code > 2 {
        return Err(ParserError::InvalidField(format!(
            "origin value {} out of range",
            code
        )));
    }
    Ok(AttributeValue::Origin(Origin::from(code)))
}
