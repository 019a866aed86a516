use crate::error::ParserError;
use crate::models::AttributeValue;
use crate::parser::ReadUtils;

pub fn parse_med(input: &mut &[u8]) -> Result<AttributeValue, ParserError> {
    Ok(AttributeValue::MultiExitDiscriminator(input.read_u32()?))
}
