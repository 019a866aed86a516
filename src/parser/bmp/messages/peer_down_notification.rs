use num_enum::FromPrimitive;

use crate::error::ParserError;
use crate::parser::bgp::messages::{parse_bgp_notification_message, BgpNotificationMessage};
use crate::parser::ReadUtils;

/// Why the router reported the peer down (RFC 7854 section 4.9).
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive)]
#[repr(u8)]
pub enum PeerDownReason {
    #[num_enum(default)]
    Unknown = 0,
    LocalNotification = 1,
    LocalFsmEvent = 2,
    RemoteNotification = 3,
    RemoteNoNotification = 4,
    PeerDeConfigured = 5,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PeerDownNotification {
    pub reason: PeerDownReason,
    /// The enclosed NOTIFICATION PDU, for reasons 1 and 3.
    pub notification: Option<BgpNotificationMessage>,
    /// FSM event code for reason 2.
    pub fsm_event: Option<u16>,
}

pub fn parse_peer_down_notification(
    data: &mut &[u8],
) -> Result<PeerDownNotification, ParserError> {
    let reason = PeerDownReason::from(data.read_u8()?);

    let mut notification = None;
    let mut fsm_event = None;
    match reason {
        PeerDownReason::LocalNotification | PeerDownReason::RemoteNotification => {
            if data.remaining() > 19 {
                // strip the BGP header of the enclosed NOTIFICATION
                data.advance(19)?;
                notification = Some(parse_bgp_notification_message(data)?);
            }
        }
        PeerDownReason::LocalFsmEvent => {
            fsm_event = Some(data.read_u16()?);
        }
        _ => {}
    }

    Ok(PeerDownNotification {
        reason,
        notification,
        fsm_event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fsm_event() {
        let mut data: &[u8] = &[2, 0, 24];
        let msg = parse_peer_down_notification(&mut data).unwrap();
        assert_eq!(msg.reason, PeerDownReason::LocalFsmEvent);
        assert_eq!(msg.fsm_event, Some(24));
        assert_eq!(msg.notification, None);
    }

    #[test]
    fn test_remote_notification() {
        let mut data = vec![3u8];
        data.extend_from_slice(&[0xff; 16]);
        data.extend_from_slice(&23u16.to_be_bytes());
        data.push(3); // NOTIFICATION
        data.push(6); // cease
        data.push(2); // administrative shutdown

        let mut input = data.as_slice();
        let msg = parse_peer_down_notification(&mut input).unwrap();
        assert_eq!(msg.reason, PeerDownReason::RemoteNotification);
        let notification = msg.notification.unwrap();
        assert_eq!(notification.error_code, 6);
        assert_eq!(notification.error_subcode, 2);
    }

    #[test]
    fn test_deconfigured() {
        let mut data: &[u8] = &[5];
        let msg = parse_peer_down_notification(&mut data).unwrap();
        assert_eq!(msg.reason, PeerDownReason::PeerDeConfigured);
    }
}
