//! Typed data model for everything the collector decodes.

pub mod attributes;
pub mod capabilities;
pub mod community;
pub mod evpn;
pub mod label;
pub mod linkstate;
pub mod network;
pub mod nlri;
pub mod rd;

use serde::Serializer;

pub use attributes::*;
pub use capabilities::*;
pub use community::*;
pub use evpn::*;
pub use label::*;
pub use linkstate::*;
pub use network::*;
pub use nlri::*;
pub use rd::*;

/// Serialize raw byte fields as lowercase hex strings.
pub(crate) fn serialize_hex<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(hex::encode(bytes).as_str())
}

pub(crate) fn serialize_opt_hex<S>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match bytes {
        Some(b) => serialize_hex(b, serializer),
        None => serializer.serialize_none(),
    }
}
