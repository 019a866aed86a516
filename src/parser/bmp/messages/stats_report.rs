use crate::error::ParserError;
use crate::parser::ReadUtils;

/// One statistics counter (RFC 7854 section 4.8). 32-bit counters and
/// 64-bit gauges both widen to u64; unrecognized widths stay raw.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StatsCounter {
    pub stat_type: u16,
    pub value: StatsValue,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum StatsValue {
    Counter(u64),
    Raw(Vec<u8>),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StatsReport {
    pub counters: Vec<StatsCounter>,
}

pub fn parse_stats_report(data: &mut &[u8]) -> Result<StatsReport, ParserError> {
    let count = data.read_u32()? as usize;
    let mut counters = Vec::with_capacity(count);

    for _ in 0..count {
        let stat_type = data.read_u16()?;
        let stat_len = data.read_u16()? as usize;
        let mut value = data.split_to(stat_len)?;
        let value = match stat_len {
            4 => StatsValue::Counter(value.read_u32()? as u64),
            8 => StatsValue::Counter(value.read_u64()?),
            _ => StatsValue::Raw(value.to_vec()),
        };
        counters.push(StatsCounter { stat_type, value });
    }

    Ok(StatsReport { counters })
}
