use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

/// Errors raised while decoding wire bytes.
///
/// Every decode failure in the crate maps to one of these kinds; the
/// enclosing layer decides whether the failure is fatal to an NLRI, to an
/// UPDATE, or to the whole session.
#[derive(Debug)]
pub enum ParserError {
    /// A declared length exceeds the bytes actually available.
    Truncated {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    /// A field value violates a semantic constraint (e.g. RD type > 2).
    InvalidField(String),
    /// AFI/SAFI combination or route type outside the recognized set.
    UnsupportedFamily { afi: u16, safi: u8 },
    /// BMP/BGP framing violation: bad version, message type out of range,
    /// or a frame length that cannot hold its own header.
    Protocol(String),
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserError::Truncated {
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "truncated input while reading {}: expected {} bytes, found {}",
                    name, expected, found
                )
            }
            ParserError::InvalidField(msg) => write!(f, "invalid field: {}", msg),
            ParserError::UnsupportedFamily { afi, safi } => {
                write!(f, "unsupported address family: afi {} safi {}", afi, safi)
            }
            ParserError::Protocol(msg) => write!(f, "protocol violation: {}", msg),
        }
    }
}

impl Error for ParserError {}

impl ParserError {
    /// True when the error must tear down the enclosing BMP session rather
    /// than just the current NLRI or UPDATE.
    pub const fn is_fatal_to_session(&self) -> bool {
        matches!(self, ParserError::Protocol(_))
    }
}

impl From<ipnet::PrefixLenError> for ParserError {
    fn from(_: ipnet::PrefixLenError) -> Self {
        ParserError::InvalidField("prefix length out of range".to_string())
    }
}

/// Errors raised by the publishing side: broker connectivity, topic
/// provisioning, and produce failures.
#[derive(Debug)]
pub enum PublisherError {
    /// The configured broker address failed validation.
    InvalidAddress(String),
    /// Connection, metadata, or produce request failed.
    Transport(String),
    /// A topic did not become available before the provisioning deadline.
    TopicUnavailable(String),
}

impl Display for PublisherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PublisherError::InvalidAddress(msg) => write!(f, "invalid broker address: {}", msg),
            PublisherError::Transport(msg) => write!(f, "broker transport error: {}", msg),
            PublisherError::TopicUnavailable(topic) => {
                write!(f, "topic {} not available before deadline", topic)
            }
        }
    }
}

impl Error for PublisherError {}

impl From<kafka::Error> for PublisherError {
    fn from(e: kafka::Error) -> Self {
        PublisherError::Transport(e.to_string())
    }
}

impl From<io::Error> for PublisherError {
    fn from(e: io::Error) -> Self {
        PublisherError::Transport(e.to_string())
    }
}
