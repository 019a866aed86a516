use crate::models::evpn::EvpnRoute;
use crate::models::label::MplsLabel;
use crate::models::linkstate::LsNlri;
use crate::models::network::{Afi, NetworkPrefix, NextHopAddress, Safi};
use crate::models::rd::RouteDistinguisher;
use serde::Serialize;

/// A labeled unicast prefix (RFC 8277).
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct LabeledPrefix {
    pub prefix: NetworkPrefix,
    pub labels: Vec<MplsLabel>,
}

/// An L3VPN prefix: label stack + route distinguisher + prefix (RFC 4364).
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct VpnPrefix {
    pub rd: RouteDistinguisher,
    pub labels: Vec<MplsLabel>,
    pub prefix: NetworkPrefix,
}

/// Family-specific routes carried by one MP_REACH/MP_UNREACH attribute.
///
/// The address families share the attribute envelope but differ entirely
/// in body; downstream consumers pattern-match on the variant.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(untagged)]
pub enum MpRoutes {
    Unicast(Vec<NetworkPrefix>),
    LabeledUnicast(Vec<LabeledPrefix>),
    Vpn(Vec<VpnPrefix>),
    Evpn(Vec<EvpnRoute>),
    LinkState(Vec<LsNlri>),
}

/// A decoded MP_REACH_NLRI or MP_UNREACH_NLRI attribute body.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct MpNlri {
    pub afi: Afi,
    pub safi: Safi,
    /// Present only on the reachable side.
    pub next_hop: Option<NextHopAddress>,
    pub routes: MpRoutes,
}

impl MpNlri {
    pub fn is_empty(&self) -> bool {
        match &self.routes {
            MpRoutes::Unicast(v) => v.is_empty(),
            MpRoutes::LabeledUnicast(v) => v.is_empty(),
            MpRoutes::Vpn(v) => v.is_empty(),
            MpRoutes::Evpn(v) => v.is_empty(),
            MpRoutes::LinkState(v) => v.is_empty(),
        }
    }
}
