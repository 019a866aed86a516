use crate::error::ParserError;
use crate::models::AttributeValue;
use crate::parser::ReadUtils;

pub fn parse_local_pref(input: &mut &[u8]) -> Result<AttributeValue, ParserError> {
    Ok(AttributeValue::LocalPreference(input.read_u32()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_pref() {
        let mut data: &[u8] = &[0, 0, 0, 200];
        assert_eq!(
            parse_local_pref(&mut data).unwrap(),
            AttributeValue::LocalPreference(200)
        );
    }
}
