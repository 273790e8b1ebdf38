//! Reference signaling relay for meshroom rooms.
//!
//! Tracks room membership, announces joins and departures, and forwards
//! peer envelopes between members over one WebSocket per member.

mod relay_config;
mod room;
mod signaling;

pub use relay_config::*;
pub use room::*;
pub use signaling::*;
