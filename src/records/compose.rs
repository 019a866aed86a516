//! Mapping parsed BMP/BGP objects onto output records.
//!
//! One UPDATE fans out into one record per announced or withdrawn
//! entity; the path attributes shared by the UPDATE are stamped onto
//! each of them.

use crate::models::{
    Attributes, EvpnRoute, LsNlri, LsNlriType, MpNlri, MpRoutes, NetworkPrefix,
};
use crate::parser::bgp::messages::BgpUpdateMessage;
use crate::parser::bmp::messages::{BmpPerPeerHeader, PeerDownNotification, PeerUpNotification};

use super::{
    EvpnRecord, L3VpnRecord, LsLinkRecord, LsNodeRecord, LsPrefixRecord, LsSrv6SidRecord,
    PeerAction, PeerHeader, PeerStateChange, Record, RouteAction, SharedAttributes,
    UnicastPrefixRecord, UnknownAttribute,
};

/// Collapse the attribute set of one UPDATE into the fields every record
/// of that UPDATE carries.
pub fn shared_attributes(attrs: &Attributes) -> SharedAttributes {
    let as_path = attrs.as_path();
    SharedAttributes {
        origin: attrs.origin(),
        as_path: as_path.map(|p| p.to_asn_vec()).unwrap_or_default(),
        origin_asn: as_path.and_then(|p| p.origin_asn()),
        nexthop: attrs.next_hop(),
        med: attrs.med(),
        local_pref: attrs.local_pref(),
        communities: attrs.communities().unwrap_or_default().to_vec(),
        ext_communities: attrs.extended_communities().unwrap_or_default().to_vec(),
        large_communities: attrs.large_communities().unwrap_or_default().to_vec(),
        unknown: attrs
            .unknown()
            .into_iter()
            .map(|raw| UnknownAttribute {
                type_code: raw.type_code,
                value: hex::encode(&raw.bytes),
            })
            .collect(),
    }
}

/// Records for one Peer Up notification.
pub fn peer_up_record(peer: &BmpPerPeerHeader, notification: &PeerUpNotification) -> Record {
    let caps = notification.negotiated_capabilities();
    Record::PeerStateChange(PeerStateChange {
        action: PeerAction::Up,
        peer: PeerHeader::from_bmp(peer),
        local_ip: Some(notification.local_addr),
        local_port: Some(notification.local_port),
        remote_port: Some(notification.remote_port),
        afi_safi: caps.families,
        reason: None,
    })
}

/// Record for one Peer Down notification.
pub fn peer_down_record(peer: &BmpPerPeerHeader, notification: &PeerDownNotification) -> Record {
    Record::PeerStateChange(PeerStateChange {
        action: PeerAction::Down,
        peer: PeerHeader::from_bmp(peer),
        local_ip: None,
        local_port: None,
        remote_port: None,
        afi_safi: Vec::new(),
        reason: Some(format!("{:?}", notification.reason)),
    })
}

/// Synthetic peer-down emitted when a session closes under a peer that
/// never said goodbye.
pub fn session_closed_record(peer: &BmpPerPeerHeader) -> Record {
    Record::PeerStateChange(PeerStateChange {
        action: PeerAction::Down,
        peer: PeerHeader::from_bmp(peer),
        local_ip: None,
        local_port: None,
        remote_port: None,
        afi_safi: Vec::new(),
        reason: Some("session-closed".to_string()),
    })
}

/// Fan one decoded UPDATE out into per-entity records.
pub fn records_from_update(peer: &BmpPerPeerHeader, update: &BgpUpdateMessage) -> Vec<Record> {
    let header = PeerHeader::from_bmp(peer);
    let attrs = shared_attributes(&update.attributes);
    let mut records = Vec::new();

    for prefix in &update.announced_prefixes {
        records.push(unicast_record(
            &header,
            attrs.clone(),
            *prefix,
            RouteAction::Add,
        ));
    }
    for prefix in &update.withdrawn_prefixes {
        records.push(unicast_record(
            &header,
            attrs.clone(),
            *prefix,
            RouteAction::Del,
        ));
    }

    if let Some(nlri) = update.attributes.reach_nlri() {
        records_from_mp_nlri(&header, &attrs, update, nlri, RouteAction::Add, &mut records);
    }
    if let Some(nlri) = update.attributes.unreach_nlri() {
        records_from_mp_nlri(&header, &attrs, update, nlri, RouteAction::Del, &mut records);
    }

    records
}

fn unicast_record(
    header: &PeerHeader,
    attrs: SharedAttributes,
    prefix: NetworkPrefix,
    action: RouteAction,
) -> Record {
    Record::UnicastPrefix(UnicastPrefixRecord {
        action,
        peer: header.clone(),
        prefix,
        prefix_len: prefix.prefix.prefix_len(),
        path_id: prefix.path_id,
        labels: Vec::new(),
        attrs,
    })
}

fn records_from_mp_nlri(
    header: &PeerHeader,
    attrs: &SharedAttributes,
    update: &BgpUpdateMessage,
    nlri: &MpNlri,
    action: RouteAction,
    records: &mut Vec<Record>,
) {
    // the multiprotocol next hop outranks attribute 3 when present
    let mut attrs = attrs.clone();
    if let Some(next_hop) = &nlri.next_hop {
        attrs.nexthop = Some(next_hop.addr());
    }

    match &nlri.routes {
        MpRoutes::Unicast(prefixes) => {
            for prefix in prefixes {
                records.push(unicast_record(header, attrs.clone(), *prefix, action));
            }
        }
        MpRoutes::LabeledUnicast(prefixes) => {
            for labeled in prefixes {
                records.push(Record::UnicastPrefix(UnicastPrefixRecord {
                    action,
                    peer: header.clone(),
                    prefix: labeled.prefix,
                    prefix_len: labeled.prefix.prefix.prefix_len(),
                    path_id: labeled.prefix.path_id,
                    labels: labeled.labels.clone(),
                    attrs: attrs.clone(),
                }));
            }
        }
        MpRoutes::Vpn(prefixes) => {
            for vpn in prefixes {
                records.push(Record::L3Vpn(L3VpnRecord {
                    action,
                    peer: header.clone(),
                    rd: vpn.rd,
                    prefix: vpn.prefix,
                    prefix_len: vpn.prefix.prefix.prefix_len(),
                    path_id: vpn.prefix.path_id,
                    labels: vpn.labels.clone(),
                    attrs: attrs.clone(),
                }));
            }
        }
        MpRoutes::Evpn(routes) => {
            for route in routes {
                records.push(evpn_record(header, attrs.clone(), route, action));
            }
        }
        MpRoutes::LinkState(nlris) => {
            for ls in nlris {
                records.push(ls_record(header, update, ls, action));
            }
        }
    }
}

fn evpn_record(
    header: &PeerHeader,
    attrs: SharedAttributes,
    route: &EvpnRoute,
    action: RouteAction,
) -> Record {
    let mut record = EvpnRecord {
        action,
        peer: header.clone(),
        route_type: route.route_type(),
        rd: *route.rd(),
        esi: route.esi().copied(),
        eth_tag: None,
        mac: None,
        ip: None,
        prefix: None,
        prefix_len: None,
        gateway: None,
        originator: None,
        labels: Vec::new(),
        attrs,
    };

    match route {
        EvpnRoute::EthernetAutoDiscovery(r) => {
            record.eth_tag = Some(r.eth_tag);
            record.labels = r.labels.clone();
        }
        EvpnRoute::MacIpAdvertisement(r) => {
            record.eth_tag = Some(r.eth_tag);
            record.mac = Some(r.mac);
            record.ip = r.ip;
            record.labels = r.labels.clone();
        }
        EvpnRoute::InclusiveMulticastEthernetTag(r) => {
            record.eth_tag = Some(r.eth_tag);
            record.originator = Some(r.originator);
        }
        EvpnRoute::EthernetSegment(r) => {
            record.originator = Some(r.originator);
        }
        EvpnRoute::IpPrefix(r) => {
            record.eth_tag = Some(r.eth_tag);
            record.prefix = Some(r.prefix);
            record.prefix_len = Some(r.prefix_len);
            record.gateway = r.gateway;
            record.labels = r.labels.clone();
        }
    }

    Record::Evpn(record)
}

fn ls_record(
    header: &PeerHeader,
    update: &BgpUpdateMessage,
    nlri: &LsNlri,
    action: RouteAction,
) -> Record {
    let attr = update.attributes.link_state().cloned();

    match nlri.nlri_type {
        LsNlriType::Link => Record::LsLink(LsLinkRecord {
            action,
            peer: header.clone(),
            protocol_id: nlri.protocol_id,
            identifier: nlri.identifier,
            local_node: nlri.local_node.clone(),
            remote_node: nlri.remote_node.clone().unwrap_or_default(),
            link: nlri.link.clone().unwrap_or_default(),
            attr,
        }),
        LsNlriType::Ipv4Prefix | LsNlriType::Ipv6Prefix => Record::LsPrefix(LsPrefixRecord {
            action,
            peer: header.clone(),
            nlri_type: nlri.nlri_type,
            protocol_id: nlri.protocol_id,
            identifier: nlri.identifier,
            local_node: nlri.local_node.clone(),
            prefix: nlri.prefix.clone().unwrap_or_default(),
            attr,
        }),
        LsNlriType::Srv6Sid => Record::LsSrv6Sid(LsSrv6SidRecord {
            action,
            peer: header.clone(),
            protocol_id: nlri.protocol_id,
            identifier: nlri.identifier,
            local_node: nlri.local_node.clone(),
            sid: nlri.srv6_sid.clone().unwrap_or_default(),
            attr,
        }),
        _ => Record::LsNode(LsNodeRecord {
            action,
            peer: header.clone(),
            protocol_id: nlri.protocol_id,
            identifier: nlri.identifier,
            node: nlri.local_node.clone(),
            attr,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AsnLength, Attributes};
    use crate::parser::bgp::messages::parse_bgp_update_message;
    use crate::parser::bmp::messages::BmpPeerType;
    use crate::records::Topic;

    fn test_peer() -> BmpPerPeerHeader {
        BmpPerPeerHeader {
            peer_type: BmpPeerType::Global,
            peer_flags: 0,
            peer_distinguisher: 0,
            peer_ip: "192.168.80.103".parse().unwrap(),
            peer_asn: 5070,
            peer_bgp_id: "192.168.8.8".parse().unwrap(),
            timestamp: 1583459419.0,
        }
    }

    #[test]
    fn test_unicast_update_fanout() {
        let mut body = vec![0u8, 0];
        let attrs: Vec<u8> = vec![
            0x40, 0x01, 0x01, 0x00, // ORIGIN IGP
            0x50, 0x02, 0x00, 0x06, 0x02, 0x01, 0x00, 0x00, 0xfd, 0xe9, // AS_PATH [65001]
            0x40, 0x03, 0x04, 0xc0, 0x00, 0x02, 0x01, // NEXT_HOP
        ];
        body.extend_from_slice(&(attrs.len() as u16).to_be_bytes());
        body.extend_from_slice(&attrs);
        body.extend_from_slice(&[24, 10, 0, 0]);

        let update = parse_bgp_update_message(&body, AsnLength::Bits32, None).unwrap();
        let records = records_from_update(&test_peer(), &update);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].topic(), Topic::UnicastPrefix);
        let Record::UnicastPrefix(record) = &records[0] else {
            panic!("wrong record");
        };
        assert_eq!(record.action, RouteAction::Add);
        assert_eq!(record.prefix.to_string(), "10.0.0.0/24");
        assert_eq!(record.attrs.as_path, vec![65001]);
        assert_eq!(record.attrs.nexthop, Some("192.0.2.1".parse().unwrap()));
        assert_eq!(record.peer.peer_asn, 5070);
    }

    #[test]
    fn test_withdraw_fanout() {
        let mut body = Vec::new();
        body.extend_from_slice(&4u16.to_be_bytes());
        body.extend_from_slice(&[24, 10, 0, 0]);
        body.extend_from_slice(&0u16.to_be_bytes());

        let update = parse_bgp_update_message(&body, AsnLength::Bits32, None).unwrap();
        let records = records_from_update(&test_peer(), &update);
        let Record::UnicastPrefix(record) = &records[0] else {
            panic!("wrong record");
        };
        assert_eq!(record.action, RouteAction::Del);
    }

    #[test]
    fn test_end_of_rib_produces_nothing() {
        let update = BgpUpdateMessage {
            withdrawn_prefixes: vec![],
            attributes: Attributes::default(),
            announced_prefixes: vec![],
        };
        assert!(records_from_update(&test_peer(), &update).is_empty());
    }
}
