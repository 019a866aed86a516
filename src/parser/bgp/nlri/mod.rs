//! Family-specific NLRI body decoders dispatched by AFI/SAFI.

pub mod evpn;
pub mod linkstate;
pub mod vpn;
