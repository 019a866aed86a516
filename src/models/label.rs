use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// One entry of an MPLS label stack (RFC 3032).
///
/// Three wire bytes: 20 bits of label value, 3 experimental bits, and the
/// bottom-of-stack flag. The caller iterates a stack until `bottom` is set.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct MplsLabel {
    pub value: u32,
    pub exp: u8,
    pub bottom: bool,
}

impl MplsLabel {
    /// Sentinel carried by VPN withdrawals in place of a real label
    /// (compatibility value 0x800000).
    pub const WITHDRAWN: MplsLabel = MplsLabel {
        value: 0x80000,
        exp: 0,
        bottom: false,
    };
}

impl Display for MplsLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Records carry only the 20-bit label value; exp and bottom-of-stack are
/// wire-level detail.
impl Serialize for MplsLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.value)
    }
}
