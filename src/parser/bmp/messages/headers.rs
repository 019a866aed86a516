use num_enum::TryFromPrimitive;
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};

use crate::error::ParserError;
use crate::models::AsnLength;
use crate::parser::ReadUtils;

/// Size of the fixed BMP common header on the wire.
pub const BMP_COMMON_HEADER_LEN: usize = 5;

/// BMP message types (RFC 7854 section 4.1).
///
/// ```text
///    *  Type = 0: Route Monitoring
///    *  Type = 1: Statistics Report
///    *  Type = 2: Peer Down Notification
///    *  Type = 3: Peer Up Notification
///    *  Type = 4: Initiation Message
///    *  Type = 5: Termination Message
///    *  Type = 6: Route Mirroring Message
/// ```
#[derive(Debug, PartialEq, Eq, Copy, Clone, TryFromPrimitive)]
#[repr(u8)]
pub enum BmpMsgType {
    RouteMonitoring = 0,
    StatisticsReport = 1,
    PeerDownNotification = 2,
    PeerUpNotification = 3,
    InitiationMessage = 4,
    TerminationMessage = 5,
    RouteMirroring = 6,
}

impl BmpMsgType {
    /// Types whose body opens with a per-peer header.
    pub const fn has_per_peer_header(&self) -> bool {
        !matches!(
            self,
            BmpMsgType::InitiationMessage | BmpMsgType::TerminationMessage
        )
    }
}

/// BMP common header: version, total message length, message type.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct BmpCommonHeader {
    pub version: u8,
    pub msg_len: u32,
    pub msg_type: BmpMsgType,
}

/// Parse the five-byte common header. Version and type violations and a
/// length that cannot hold the header itself are fatal to the session.
pub fn parse_bmp_common_header(data: &mut &[u8]) -> Result<BmpCommonHeader, ParserError> {
    let version = data.read_u8()?;
    if version != 3 {
        // has to be 3 per rfc7854
        return Err(ParserError::Protocol(format!(
            "BMP version {} not supported",
            version
        )));
    }

    let msg_len = data.read_u32()?;
    if (msg_len as usize) < BMP_COMMON_HEADER_LEN {
        return Err(ParserError::Protocol(format!(
            "BMP message length {} shorter than its header",
            msg_len
        )));
    }

    let msg_type = data.read_u8()?;
    let msg_type = BmpMsgType::try_from(msg_type).map_err(|_| {
        ParserError::Protocol(format!("BMP message type {} out of range", msg_type))
    })?;

    Ok(BmpCommonHeader {
        version,
        msg_len,
        msg_type,
    })
}

/// Peer type in the per-peer header.
#[derive(Debug, PartialEq, Eq, Copy, Clone, TryFromPrimitive, Serialize)]
#[repr(u8)]
pub enum BmpPeerType {
    Global = 0,
    RdInstance = 1,
    Local = 2,
}

/// BMP per-peer header (RFC 7854 section 4.2), prepended to route
/// monitoring, statistics, peer up/down and mirroring messages.
#[derive(Debug, PartialEq, Clone)]
pub struct BmpPerPeerHeader {
    pub peer_type: BmpPeerType,
    pub peer_flags: u8,
    pub peer_distinguisher: u64,
    pub peer_ip: IpAddr,
    pub peer_asn: u32,
    pub peer_bgp_id: Ipv4Addr,
    /// Seconds + microseconds from the router clock.
    pub timestamp: f64,
}

const PEER_FLAG_IPV6: u8 = 0x80;
const PEER_FLAG_POST_POLICY: u8 = 0x40;
const PEER_FLAG_AS2: u8 = 0x20;

impl BmpPerPeerHeader {
    pub const fn is_post_policy(&self) -> bool {
        self.peer_flags & PEER_FLAG_POST_POLICY != 0
    }

    pub const fn asn_len(&self) -> AsnLength {
        if self.peer_flags & PEER_FLAG_AS2 != 0 {
            AsnLength::Bits16
        } else {
            AsnLength::Bits32
        }
    }
}

pub fn parse_per_peer_header(data: &mut &[u8]) -> Result<BmpPerPeerHeader, ParserError> {
    let peer_type = data.read_u8()?;
    let peer_type = BmpPeerType::try_from(peer_type).map_err(|_| {
        ParserError::Protocol(format!("BMP peer type {} out of range", peer_type))
    })?;

    let peer_flags = data.read_u8()?;
    let peer_distinguisher = data.read_u64()?;

    // the address field is always 16 bytes; v4 peers left-pad with zeros
    let peer_ip: IpAddr = if peer_flags & PEER_FLAG_IPV6 != 0 {
        data.read_ipv6_address()?.into()
    } else {
        data.advance(12)?;
        data.read_ipv4_address()?.into()
    };

    let peer_asn: u32 = if peer_flags & PEER_FLAG_AS2 != 0 {
        data.advance(2)?;
        data.read_u16()? as u32
    } else {
        data.read_u32()?
    };

    let peer_bgp_id = data.read_ipv4_address()?;

    let t_sec = data.read_u32()?;
    let t_usec = data.read_u32()?;
    let timestamp = t_sec as f64 + (t_usec as f64) / 1_000_000.0;

    Ok(BmpPerPeerHeader {
        peer_type,
        peer_flags,
        peer_distinguisher,
        peer_ip,
        peer_asn,
        peer_bgp_id,
        timestamp,
    })
}
