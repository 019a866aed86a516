/*!
Byte-reader utilities shared by every decoder in the crate.
*/
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::ParserError;
use crate::models::{Afi, AsnLength, NetworkPrefix};

#[cold]
fn eof(name: &'static str, expected: usize, found: usize) -> ParserError {
    ParserError::Truncated {
        name,
        expected,
        found,
    }
}

/// Cursor-style reads over a `&[u8]`, advancing the slice in place.
///
/// All multi-byte integers are network byte order.
pub trait ReadUtils: Sized {
    fn remaining(&self) -> usize;
    fn advance(&mut self, n: usize) -> Result<(), ParserError>;
    fn split_to(&mut self, n: usize) -> Result<Self, ParserError>;
    fn read_u8(&mut self) -> Result<u8, ParserError>;
    fn read_u16(&mut self) -> Result<u16, ParserError>;
    fn read_u32(&mut self) -> Result<u32, ParserError>;
    fn read_u64(&mut self) -> Result<u64, ParserError>;
    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), ParserError>;

    /// Check that at least `n` bytes remain. Helps the compiler drop
    /// later bounds checks.
    #[inline(always)]
    fn require_n_remaining(&self, n: usize, target: &'static str) -> Result<(), ParserError> {
        if self.remaining() >= n {
            return Ok(());
        }
        Err(eof(target, n, self.remaining()))
    }

    fn read_n_bytes(&mut self, n: usize) -> Result<Vec<u8>, ParserError> {
        self.require_n_remaining(n, "raw bytes")?;
        let mut buffer = vec![0; n];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn read_n_bytes_to_string(&mut self, n: usize) -> Result<String, ParserError> {
        let buffer = self.read_n_bytes(n)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError> {
        self.require_n_remaining(4, "IPv4 address")?;
        Ok(Ipv4Addr::from(self.read_u32()?))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError> {
        self.require_n_remaining(16, "IPv6 address")?;
        let mut buffer = [0; 16];
        self.read_exact(&mut buffer)?;
        Ok(Ipv6Addr::from(buffer))
    }

    fn read_address(&mut self, afi: Afi) -> Result<IpAddr, ParserError> {
        match afi {
            Afi::Ipv4 => self.read_ipv4_address().map(IpAddr::V4),
            _ => self.read_ipv6_address().map(IpAddr::V6),
        }
    }

    #[inline]
    fn read_asn(&mut self, len: AsnLength) -> Result<u32, ParserError> {
        match len {
            AsnLength::Bits16 => self.read_u16().map(u32::from),
            AsnLength::Bits32 => self.read_u32(),
        }
    }

    /// Read one NLRI prefix: optional 4-byte path identifier, a length in
    /// bits, then the packed address bytes.
    fn read_nlri_prefix(&mut self, afi: Afi, add_path: bool) -> Result<NetworkPrefix, ParserError> {
        let path_id = if add_path { self.read_u32()? } else { 0 };

        let bit_len = self.read_u8()?;
        let byte_len = (bit_len as usize).div_ceil(8);

        let prefix = match afi {
            Afi::Ipv4 => {
                if bit_len > 32 {
                    return Err(ParserError::InvalidField(format!(
                        "IPv4 prefix length {} out of range",
                        bit_len
                    )));
                }
                let mut buff = [0; 4];
                self.read_exact(&mut buff[..byte_len])?;
                IpNet::V4(Ipv4Net::new(Ipv4Addr::from(buff), bit_len)?)
            }
            _ => {
                if bit_len > 128 {
                    return Err(ParserError::InvalidField(format!(
                        "IPv6 prefix length {} out of range",
                        bit_len
                    )));
                }
                let mut buff = [0; 16];
                self.read_exact(&mut buff[..byte_len])?;
                IpNet::V6(Ipv6Net::new(Ipv6Addr::from(buff), bit_len)?)
            }
        };

        Ok(NetworkPrefix::new(prefix, path_id))
    }
}

impl ReadUtils for &'_ [u8] {
    #[inline]
    fn remaining(&self) -> usize {
        self.len()
    }

    #[inline]
    fn advance(&mut self, n: usize) -> Result<(), ParserError> {
        if self.len() >= n {
            *self = &self[n..];
            return Ok(());
        }
        Err(eof("advance", n, self.len()))
    }

    #[inline]
    fn split_to(&mut self, n: usize) -> Result<Self, ParserError> {
        if self.len() >= n {
            let (head, tail) = self.split_at(n);
            *self = tail;
            return Ok(head);
        }
        Err(eof("split_to", n, self.len()))
    }

    #[inline(always)]
    fn read_u8(&mut self) -> Result<u8, ParserError> {
        if let Some((first, rest)) = self.split_first() {
            let value = *first;
            *self = rest;
            return Ok(value);
        }
        Err(eof("read_u8", 1, 0))
    }

    #[inline(always)]
    fn read_u16(&mut self) -> Result<u16, ParserError> {
        if self.len() >= 2 {
            let (bytes, rest) = self.split_at(2);
            *self = rest;
            return Ok(u16::from_be_bytes(bytes.try_into().unwrap()));
        }
        Err(eof("read_u16", 2, self.len()))
    }

    #[inline(always)]
    fn read_u32(&mut self) -> Result<u32, ParserError> {
        if self.len() >= 4 {
            let (bytes, rest) = self.split_at(4);
            *self = rest;
            return Ok(u32::from_be_bytes(bytes.try_into().unwrap()));
        }
        Err(eof("read_u32", 4, self.len()))
    }

    #[inline(always)]
    fn read_u64(&mut self) -> Result<u64, ParserError> {
        if self.len() >= 8 {
            let (bytes, rest) = self.split_at(8);
            *self = rest;
            return Ok(u64::from_be_bytes(bytes.try_into().unwrap()));
        }
        Err(eof("read_u64", 8, self.len()))
    }

    #[inline]
    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), ParserError> {
        if self.len() >= buffer.len() {
            let (head, tail) = self.split_at(buffer.len());
            buffer.copy_from_slice(head);
            *self = tail;
            return Ok(());
        }
        Err(eof("read_exact", buffer.len(), self.len()))
    }
}

#[cold]
#[inline(never)]
fn parse_nlri_list_known(
    mut input: &[u8],
    afi: Afi,
    add_path: bool,
) -> Result<Vec<NetworkPrefix>, ParserError> {
    let mut prefixes = Vec::with_capacity(input.len() / 4);
    while !input.is_empty() {
        prefixes.push(input.read_nlri_prefix(afi, add_path)?);
    }
    Ok(prefixes)
}

/// Parse a run of NLRI prefixes filling `input` exactly.
///
/// When `add_path` is `None` the peer's capability is unknown and the
/// layout is chosen heuristically: a leading zero byte reads as the high
/// byte of a path identifier (a /0 prefix announcement is implausible),
/// so the add-path layout is attempted first in that case. Whichever
/// layout consumes the buffer exactly wins.
pub fn parse_nlri_list(
    input: &[u8],
    add_path: Option<bool>,
    afi: Afi,
) -> Result<Vec<NetworkPrefix>, ParserError> {
    match add_path {
        Some(add_path) => parse_nlri_list_known(input, afi, add_path),
        None => {
            let add_path_first = input.first() == Some(&0);
            parse_nlri_list_known(input, afi, add_path_first)
                .or_else(|_| parse_nlri_list_known(input, afi, !add_path_first))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_read_integers() {
        let mut data: &[u8] = &[0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03];
        assert_eq!(data.read_u8().unwrap(), 1);
        assert_eq!(data.read_u16().unwrap(), 2);
        assert_eq!(data.read_u32().unwrap(), 3);
        assert!(data.read_u8().is_err());
    }

    #[test]
    fn test_truncated_reads() {
        let mut data: &[u8] = &[0x01];
        let err = data.read_u32().unwrap_err();
        assert!(matches!(
            err,
            ParserError::Truncated {
                expected: 4,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_read_nlri_prefix() {
        let mut data: &[u8] = &[24, 10, 0, 0];
        let prefix = data.read_nlri_prefix(Afi::Ipv4, false).unwrap();
        assert_eq!(prefix, NetworkPrefix::from_str("10.0.0.0/24").unwrap());
        assert!(data.is_empty());
    }

    #[test]
    fn test_read_nlri_prefix_invalid_length() {
        let mut data: &[u8] = &[44, 10, 0, 0, 0, 0, 0];
        assert!(matches!(
            data.read_nlri_prefix(Afi::Ipv4, false),
            Err(ParserError::InvalidField(_))
        ));
    }

    #[test]
    fn test_parse_nlri_list_add_path_fallback() {
        // path-id 7 + /24 prefix; the plain layout cannot consume this
        // buffer exactly, so the heuristic lands on add-path
        let data = [0u8, 0, 0, 7, 24, 10, 0, 0];
        let prefixes = parse_nlri_list(&data, None, Afi::Ipv4).unwrap();
        assert_eq!(prefixes.len(), 1);
        assert_eq!(prefixes[0].path_id, 7);
        assert_eq!(prefixes[0].to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_parse_nlri_list_known_layout() {
        let data = [24, 10, 0, 0, 16, 192, 168];
        let prefixes = parse_nlri_list(&data, Some(false), Afi::Ipv4).unwrap();
        assert_eq!(prefixes.len(), 2);
        assert_eq!(prefixes[1].to_string(), "192.168.0.0/16");
    }
}
