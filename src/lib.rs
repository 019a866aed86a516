/*!
Passive BMP (RFC 7854) telemetry collector.

The crate accepts raw BMP byte streams from routers, decodes the BGP UPDATE
messages they carry — IPv4/IPv6 unicast, labeled unicast, L3VPN, EVPN and
BGP-LS families — and emits self-describing JSON records onto a set of
Kafka topics keyed for downstream partitioning.

The pipeline, bottom up:

- [`parser`] — wire decoding: fixed-format primitives (route
  distinguishers, labels, ESIs, MAC addresses), a generic TLV walker,
  the BGP UPDATE/OPEN parsers and the BMP message framing.
- [`session`] — one state machine per router connection: initiation,
  per-peer demultiplexing, route monitoring, termination. The supervisor
  spawns one task per inbound stream; sessions never share state.
- [`records`] — the eight typed output streams and their deterministic
  routing keys.
- [`publisher`] — the shared Kafka producer: bounded handoff, topic
  provisioning and delivery bookkeeping.

The collector is receive-only. It never speaks BGP or BMP back to the
router, holds no RIB, and keeps no state across restarts.
*/

pub mod error;
pub mod models;
pub mod parser;
pub mod publisher;
pub mod records;
pub mod session;

pub use crate::error::{ParserError, PublisherError};
pub use crate::records::{Record, Topic};
