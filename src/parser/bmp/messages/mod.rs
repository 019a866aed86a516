pub mod headers;
pub mod initiation_message;
pub mod peer_down_notification;
pub mod peer_up_notification;
pub mod route_mirroring;
pub mod route_monitoring;
pub mod stats_report;
pub mod termination_message;

pub use headers::*;
pub use initiation_message::*;
pub use peer_down_notification::*;
pub use peer_up_notification::*;
pub use route_mirroring::*;
pub use route_monitoring::*;
pub use stats_report::*;
pub use termination_message::*;
