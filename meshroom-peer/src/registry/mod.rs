mod peer_entry;
mod peer_registry;

pub use peer_entry::*;
pub use peer_registry::*;
