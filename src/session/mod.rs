/*!
Per-router session state.

A [`Session`] is the decoder context for one BMP TCP connection: the
initiation/ready/closed lifecycle, the table of monitored peers with
their negotiated capabilities, and the translation of each frame into
output records. Sessions share nothing; every connection gets its own.
*/
pub mod supervisor;

use log::{debug, info, warn};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

use crate::error::ParserError;
use crate::models::PeerCapabilities;
use crate::parser::bgp::messages::BgpMessage;
use crate::parser::bmp::messages::*;
use crate::records::{self, Record};

/// Lifecycle of one BMP session.
///
/// | state        | entered by           | allowed next               |
/// |--------------|----------------------|----------------------------|
/// | InitExpected | connection accept    | Initiation, Termination    |
/// | Ready        | Initiation           | peer + routing messages    |
/// | Closed       | Termination or error | nothing, terminal          |
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SessionState {
    InitExpected,
    Ready,
    Closed,
}

/// What uniquely identifies a monitored peer within a session.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct PeerKey {
    pub distinguisher: u64,
    pub addr: IpAddr,
    pub asn: u32,
    pub bgp_id: Ipv4Addr,
}

impl PeerKey {
    pub fn from_header(header: &BmpPerPeerHeader) -> PeerKey {
        PeerKey {
            distinguisher: header.peer_distinguisher,
            addr: header.peer_ip,
            asn: header.peer_asn,
            bgp_id: header.peer_bgp_id,
        }
    }
}

/// One monitored peer as observed through Peer Up.
#[derive(Debug, Clone)]
pub struct Peer {
    pub capabilities: PeerCapabilities,
    /// Last per-peer header seen, used for synthetic peer-down records.
    pub header: BmpPerPeerHeader,
    /// Messages decoded for this peer, for log correlation only.
    pub sequence: u64,
}

/// Decoder context for one router connection.
pub struct Session {
    router: String,
    state: SessionState,
    peers: HashMap<PeerKey, Peer>,
    decode_errors: u64,
}

impl Session {
    pub fn new(router: impl Into<String>) -> Session {
        Session {
            router: router.into(),
            state: SessionState::InitExpected,
            peers: HashMap::new(),
            decode_errors: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// UPDATEs dropped on decode errors since the session opened.
    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }

    /// Process one BMP frame body (common header already consumed) and
    /// return the records it produced.
    ///
    /// Errors returned from here are fatal to the session; recoverable
    /// decode failures are swallowed, logged and counted.
    pub fn process_message(
        &mut self,
        msg_type: BmpMsgType,
        mut body: &[u8],
    ) -> Result<Vec<Record>, ParserError> {
        match self.state {
            SessionState::Closed => {
                return Err(ParserError::Protocol(
                    "message on a closed session".to_string(),
                ))
            }
            SessionState::InitExpected
                if !matches!(
                    msg_type,
                    BmpMsgType::InitiationMessage | BmpMsgType::TerminationMessage
                ) =>
            {
                return Err(ParserError::Protocol(format!(
                    "{:?} before initiation",
                    msg_type
                )));
            }
            _ => {}
        }

        match msg_type {
            BmpMsgType::InitiationMessage => {
                let init = parse_initiation_message(&mut body)?;
                info!(
                    "session {}: initiation from {} ({})",
                    self.router,
                    init.sys_name().unwrap_or("<unnamed>"),
                    init.sys_descr().unwrap_or("")
                );
                self.state = SessionState::Ready;
                Ok(Vec::new())
            }
            BmpMsgType::TerminationMessage => {
                let term = parse_termination_message(&mut body)?;
                info!(
                    "session {}: termination, reason {:?}",
                    self.router, term.reason
                );
                self.state = SessionState::Closed;
                Ok(self.drain_peers())
            }
            BmpMsgType::PeerUpNotification => {
                let header = parse_per_peer_header(&mut body)?;
                let peer_up = parse_peer_up_notification(&mut body, &header)?;
                let key = PeerKey::from_header(&header);
                let capabilities = peer_up.negotiated_capabilities();
                debug!(
                    "session {}: peer up {} AS{} ({} families)",
                    self.router,
                    header.peer_ip,
                    header.peer_asn,
                    capabilities.families.len()
                );
                // repeat Peer Up refreshes the capability set
                self.peers.insert(
                    key,
                    Peer {
                        capabilities,
                        header: header.clone(),
                        sequence: 0,
                    },
                );
                Ok(vec![records::peer_up_record(&header, &peer_up)])
            }
            BmpMsgType::PeerDownNotification => {
                let header = parse_per_peer_header(&mut body)?;
                let peer_down = parse_peer_down_notification(&mut body)?;
                self.peers.remove(&PeerKey::from_header(&header));
                debug!(
                    "session {}: peer down {} ({:?})",
                    self.router, header.peer_ip, peer_down.reason
                );
                Ok(vec![records::peer_down_record(&header, &peer_down)])
            }
            BmpMsgType::RouteMonitoring => {
                let header = parse_per_peer_header(&mut body)?;
                let key = PeerKey::from_header(&header);
                let caps = match self.peers.get_mut(&key) {
                    Some(peer) => {
                        peer.sequence += 1;
                        Some(peer.capabilities.clone())
                    }
                    None => None,
                };

                match parse_route_monitoring(&mut body, &header, caps.as_ref()) {
                    Ok(monitoring) => {
                        if monitoring.is_end_of_rib() {
                            debug!(
                                "session {}: end of RIB from {}",
                                self.router, header.peer_ip
                            );
                            return Ok(Vec::new());
                        }
                        match &monitoring.bgp_message {
                            BgpMessage::Update(update) => {
                                Ok(records::records_from_update(&header, update))
                            }
                            _ => {
                                debug!(
                                    "session {}: non-update BGP message in route monitoring",
                                    self.router
                                );
                                Ok(Vec::new())
                            }
                        }
                    }
                    // a broken UPDATE is dropped whole; the session lives on
                    Err(e) if !e.is_fatal_to_session() => {
                        warn!(
                            "session {}: dropping update from {}: {}",
                            self.router, header.peer_ip, e
                        );
                        self.decode_errors += 1;
                        Ok(Vec::new())
                    }
                    Err(e) => Err(e),
                }
            }
            BmpMsgType::StatisticsReport => {
                let header = parse_per_peer_header(&mut body)?;
                let report = parse_stats_report(&mut body)?;
                debug!(
                    "session {}: statistics from {}: {} counters",
                    self.router,
                    header.peer_ip,
                    report.counters.len()
                );
                Ok(Vec::new())
            }
            BmpMsgType::RouteMirroring => {
                let header = parse_per_peer_header(&mut body)?;
                let mirroring = parse_route_mirroring(&mut body)?;
                debug!(
                    "session {}: mirroring from {}: {} PDUs",
                    self.router,
                    header.peer_ip,
                    mirroring.mirrored_pdus.len()
                );
                Ok(Vec::new())
            }
        }
    }

    /// Close the session and emit a synthetic peer-down for every peer
    /// still on the table. Idempotent.
    pub fn close(&mut self) -> Vec<Record> {
        self.state = SessionState::Closed;
        self.drain_peers()
    }

    fn drain_peers(&mut self) -> Vec<Record> {
        self.peers
            .drain()
            .map(|(_, peer)| records::session_closed_record(&peer.header))
            .collect()
    }
}
