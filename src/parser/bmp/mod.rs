/*!
BMP message framing (RFC 7854).

A message is a five-byte common header, a per-peer header for the
peer-scoped types, and a type-specific body. [`parse_bmp_message`]
decodes one standalone message; the session layer performs the same
dispatch statefully so route monitoring can use each peer's negotiated
capabilities.
*/
use crate::error::ParserError;
use crate::parser::bmp::messages::*;
use crate::parser::ReadUtils;

pub mod messages;

/// One fully parsed BMP message.
#[derive(Debug, PartialEq, Clone)]
pub struct BmpMessage {
    pub common_header: BmpCommonHeader,
    pub per_peer_header: Option<BmpPerPeerHeader>,
    pub message_body: BmpMessageBody,
}

#[derive(Debug, PartialEq, Clone)]
pub enum BmpMessageBody {
    RouteMonitoring(RouteMonitoring),
    StatsReport(StatsReport),
    PeerDownNotification(PeerDownNotification),
    PeerUpNotification(PeerUpNotification),
    InitiationMessage(InitiationMessage),
    TerminationMessage(TerminationMessage),
    RouteMirroring(RouteMirroring),
}

/// Parse one BMP message, common header included, advancing `data` past
/// it. Route monitoring is decoded without peer capability context; the
/// session layer supplies that when it owns the peer table.
pub fn parse_bmp_message(data: &mut &[u8]) -> Result<BmpMessage, ParserError> {
    let common_header = parse_bmp_common_header(data)?;
    let body_len = common_header.msg_len as usize - BMP_COMMON_HEADER_LEN;
    if data.remaining() < body_len {
        return Err(ParserError::Protocol(format!(
            "BMP message declares {} body bytes, {} available",
            body_len,
            data.remaining()
        )));
    }
    let mut body = data.split_to(body_len)?;

    let per_peer_header = match common_header.msg_type.has_per_peer_header() {
        true => Some(parse_per_peer_header(&mut body)?),
        false => None,
    };

    let message_body =
        parse_bmp_message_body(common_header.msg_type, per_peer_header.as_ref(), &mut body)?;

    Ok(BmpMessage {
        common_header,
        per_peer_header,
        message_body,
    })
}

/// Parse a message body whose common and per-peer headers are already
/// off the wire.
pub fn parse_bmp_message_body(
    msg_type: BmpMsgType,
    peer: Option<&BmpPerPeerHeader>,
    body: &mut &[u8],
) -> Result<BmpMessageBody, ParserError> {
    let require_peer = || {
        peer.ok_or_else(|| {
            ParserError::Protocol("peer-scoped BMP message without per-peer header".to_string())
        })
    };

    Ok(match msg_type {
        BmpMsgType::RouteMonitoring => BmpMessageBody::RouteMonitoring(parse_route_monitoring(
            body,
            require_peer()?,
            None,
        )?),
        BmpMsgType::StatisticsReport => BmpMessageBody::StatsReport(parse_stats_report(body)?),
        BmpMsgType::PeerDownNotification => {
            BmpMessageBody::PeerDownNotification(parse_peer_down_notification(body)?)
        }
        BmpMsgType::PeerUpNotification => {
            BmpMessageBody::PeerUpNotification(parse_peer_up_notification(body, require_peer()?)?)
        }
        BmpMsgType::InitiationMessage => {
            BmpMessageBody::InitiationMessage(parse_initiation_message(body)?)
        }
        BmpMsgType::TerminationMessage => {
            BmpMessageBody::TerminationMessage(parse_termination_message(body)?)
        }
        BmpMsgType::RouteMirroring => BmpMessageBody::RouteMirroring(parse_route_mirroring(body)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    fn frame(msg_type: u8, body: &[u8]) -> Vec<u8> {
        let mut data = vec![3u8];
        data.extend_from_slice(&((5 + body.len()) as u32).to_be_bytes());
        data.push(msg_type);
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_initiation_frame() {
        let mut body = BytesMut::new();
        body.put_u16(2); // sysName
        body.put_u16(3);
        body.put_slice(b"rtr");

        let data = frame(4, &body.freeze());
        let mut input = data.as_slice();
        let msg = parse_bmp_message(&mut input).unwrap();
        assert!(input.is_empty());
        assert!(msg.per_peer_header.is_none());
        let BmpMessageBody::InitiationMessage(init) = msg.message_body else {
            panic!("wrong body");
        };
        assert_eq!(init.sys_name(), Some("rtr"));
    }

    #[test]
    fn test_body_longer_than_buffer() {
        let data = [3u8, 0, 0, 0, 100, 0, 1, 2];
        let mut input = data.as_slice();
        assert!(matches!(
            parse_bmp_message(&mut input),
            Err(ParserError::Protocol(_))
        ));
    }

    #[test]
    fn test_two_frames_back_to_back() {
        let first = frame(4, &[]);
        let second = frame(5, &[]);
        let mut data = first.clone();
        data.extend_from_slice(&second);

        let mut input = data.as_slice();
        let msg1 = parse_bmp_message(&mut input).unwrap();
        let msg2 = parse_bmp_message(&mut input).unwrap();
        assert!(matches!(
            msg1.message_body,
            BmpMessageBody::InitiationMessage(_)
        ));
        assert!(matches!(
            msg2.message_body,
            BmpMessageBody::TerminationMessage(_)
        ));
        assert!(input.is_empty());
    }
}
