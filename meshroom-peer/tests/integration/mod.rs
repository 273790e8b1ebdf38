//! Integration tests for meshroom-peer.
//!
//! Sessions run against mock transports and connections:
//! - `presence_tests` - joining, identity assignment and room membership
//! - `negotiation_tests` - offer/answer/candidate exchange
//! - `lifecycle_tests` - teardown, failures, timeouts and rendering
//! - `chat_tests` - chat lines between peers
//!
//! `webrtc_tests` swaps the mock connections for real ones.

pub mod chat_tests;
pub mod negotiation_tests;
pub mod presence_tests;
pub mod webrtc_tests;

use tracing::Level;

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}
